//! The network seam.
//!
//! # Design
//! `RequestBuilder` only ever hands a compiled `HttpRequest` to a `Transport`
//! and gets an `HttpResponse` back. `UreqTransport` is the blocking default;
//! tests substitute a recording fake. Transport options (timeouts, TLS
//! verification, user agent) are a per-instance `TransportConfig`, fixed when
//! the agent is built.

use std::time::Duration;

use tracing::debug;
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Version reported in the default user agent.
pub const SDK_VERSION: &str = "1.0.0";

/// Executes one compiled request.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Peer certificate verification. Off by default.
    pub verify_tls: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("MINESWEEPER-RUST-SDK-{SDK_VERSION}"),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
            verify_tls: false,
        }
    }
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    config: TransportConfig,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .user_agent(config.user_agent.as_str())
            .timeout_connect(Some(config.connect_timeout))
            .timeout_global(Some(config.timeout))
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(!config.verify_tls)
                    .build(),
            )
            .build()
            .new_agent();
        Self { agent, config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let body = request.body.as_deref().map(str::as_bytes);

        let result = match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), &request.headers).call(),
            (HttpMethod::Delete, None) => {
                with_headers(self.agent.delete(url), &request.headers).call()
            }
            (HttpMethod::Delete, Some(body)) => with_headers(self.agent.delete(url), &request.headers)
                .force_send_body()
                .send(body),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), &request.headers).send(body)
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(url), &request.headers).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), &request.headers).send(body)
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), &request.headers).send_empty(),
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string()?;
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
