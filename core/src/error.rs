//! Error types for the minesweeper client.
//!
//! # Design
//! Transport failures and undecodable bodies get their own variants instead
//! of collapsing to `null`. Non-2xx statuses are not errors here: the API
//! reports failures as JSON envelopes, which decode like any other body.
//! Callers that want the old null-on-failure shape use
//! `RequestBuilder::execute_or_null`.

use thiserror::Error;

/// Errors returned by `RequestBuilder` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The connect or total timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other transport-level failure (TLS, protocol, invalid URL).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Decode(String),

    /// Params could not be encoded into a query string or body.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A settings map or environment value could not be applied.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl From<serde_urlencoded::ser::Error> for ApiError {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => ApiError::Timeout,
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                ApiError::Connection(err.to_string())
            }
            ureq::Error::Io(io_err) => match io_err.kind() {
                std::io::ErrorKind::TimedOut => ApiError::Timeout,
                std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::NotConnected => ApiError::Connection(io_err.to_string()),
                _ => ApiError::Transport(io_err.to_string()),
            },
            other => ApiError::Transport(other.to_string()),
        }
    }
}
