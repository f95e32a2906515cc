//! Fluent client for the minesweeper REST API.
//!
//! # Overview
//! Chained calls on a `RequestBuilder` collect path segments, an optional
//! action, params and a verb override; `execute` compiles them into a single
//! `HttpRequest`, hands it to a `Transport`, decodes the JSON body and
//! clears the pending state for the next request.
//!
//! # Design
//! - `ClientConfig` (long-lived) and `RequestState` (per request) are separate
//!   values; `execute` takes the state by value so nothing leaks between
//!   requests.
//! - `build_request` is pure and can be asserted on without a server.
//! - `Transport` is the only I/O seam. `UreqTransport` is the blocking default.
//! - Failures are typed `ApiError`s; `execute_or_null` keeps the older
//!   null-on-failure shape for callers that want it.

pub mod client;
pub mod config;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod http;
pub mod state;
pub mod transport;

pub use client::{predefined_action, RequestBuilder};
pub use config::{ClientConfig, ContentType, Settings};
pub use envelope::{make_error, DebugEnvelope, ErrorDetail, ErrorEnvelope};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use state::{Params, RequestState};
pub use transport::{Transport, TransportConfig, UreqTransport, SDK_VERSION};
