//! Fluent request builder for the minesweeper API.
//!
//! # Design
//! `RequestBuilder` owns two things with different lifetimes: a persistent
//! `ClientConfig` plus header list, and a `RequestState` scratch buffer that
//! chained calls fill in. `execute` moves the state out with `mem::take`
//! before compiling, so the builder is back to empty whether the round trip
//! succeeds or fails. Compilation (`build_request`) is pure; only the
//! `Transport` touches the network.
//!
//! ```no_run
//! use minesweeper_core::{HttpMethod, RequestBuilder, Settings};
//! use serde_json::json;
//!
//! let mut api = RequestBuilder::new(Settings::default().url("https://api.example.com").version("1"));
//! let board = api
//!     .ns("games")
//!     .with_id(42)
//!     .with_params(json!({ "row": 3, "col": 5 }))
//!     .execute(HttpMethod::Put, None, serde_json::Value::Null)?;
//! # Ok::<(), minesweeper_core::ApiError>(())
//! ```

use std::fmt::Display;
use std::mem;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, Settings};
use crate::encoding;
use crate::envelope::DebugEnvelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::state::{Params, RequestState};
use crate::transport::{Transport, UreqTransport};

/// Action names that map straight to a verb instead of a path segment.
pub fn predefined_action(action: &str) -> Option<HttpMethod> {
    match action.to_ascii_lowercase().as_str() {
        "get" => Some(HttpMethod::Get),
        "new" => Some(HttpMethod::Post),
        "update" => Some(HttpMethod::Put),
        "destroy" => Some(HttpMethod::Delete),
        _ => None,
    }
}

#[derive(Debug)]
pub struct RequestBuilder<T = UreqTransport> {
    config: ClientConfig,
    headers: Vec<(String, String)>,
    transport: T,
    debug: bool,
    state: RequestState,
}

impl RequestBuilder<UreqTransport> {
    /// Builder over the default blocking transport.
    pub fn new(settings: Settings) -> Self {
        Self::with_transport(settings, UreqTransport::default())
    }
}

impl<T: Transport> RequestBuilder<T> {
    pub fn with_transport(settings: Settings, transport: T) -> Self {
        let mut builder = Self {
            config: ClientConfig::default(),
            headers: Vec::new(),
            transport,
            debug: false,
            state: RequestState::default(),
        };
        builder.configure(settings);
        builder
    }

    /// Overwrite the config fields present in `settings`.
    ///
    /// Every call appends an `Accept-Language` entry for the resulting
    /// language; earlier entries are kept.
    pub fn configure(&mut self, settings: Settings) -> &ClientConfig {
        self.config.apply(settings);
        self.headers
            .push(("Accept-Language".to_string(), self.config.language.clone()));
        &self.config
    }

    /// `configure` from a settings map such as `{"url": ..., "version": 1}`.
    pub fn configure_from_value(&mut self, settings: Value) -> Result<&ClientConfig, ApiError> {
        let settings = Settings::from_value(settings)?;
        Ok(self.configure(settings))
    }

    /// Wrap results in a `DebugEnvelope` until turned off again.
    pub fn set_debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    /// Append a lower-cased path segment.
    pub fn ns(&mut self, segment: impl AsRef<str>) -> &mut Self {
        self.state.namespaces.push(segment.as_ref().to_lowercase());
        self
    }

    /// Append an identifier segment verbatim.
    pub fn with_id(&mut self, id: impl Display) -> &mut Self {
        self.state.namespaces.push(id.to_string());
        self
    }

    pub fn with_action(&mut self, action: impl Into<String>) -> &mut Self {
        self.state.action = Some(action.into());
        self
    }

    /// Force the verb for the next request. Anything other than
    /// GET/POST/PUT/DELETE (any case) leaves the current override untouched.
    pub fn with_method(&mut self, verb: &str) -> &mut Self {
        match HttpMethod::parse(verb) {
            Some(method) => self.state.method_overwrite = Some(method),
            None => debug!(verb, "ignoring unsupported method override"),
        }
        self
    }

    /// Merge a JSON object into the pending params.
    pub fn with_params(&mut self, params: Value) -> &mut Self {
        if let Some(params) = into_params(params) {
            self.state.merge_params(params);
        }
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Drop everything chained since the last request.
    pub fn reset(&mut self) {
        self.state = RequestState::default();
    }

    /// Compile `state` into a request without sending it.
    pub fn build_request(
        &self,
        state: &RequestState,
        verb: HttpMethod,
        raw_url: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let method = state.method_overwrite.unwrap_or(verb);
        let path = match raw_url {
            Some(raw) => raw.to_string(),
            None => state.path(),
        };
        let mut url = compile_url(&self.config, &path);

        let body = if method == HttpMethod::Get {
            let query = encoding::to_query(&state.params)?;
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
            None
        } else {
            Some(encoding::to_body(&state.params, self.config.content_type)?)
        };

        let mut headers = self.headers.clone();
        headers.push((
            "Content-Type".to_string(),
            self.config.content_type.mime().to_string(),
        ));

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Decode a raw response. An empty body decodes to `null`.
    pub fn parse_response(&self, response: &HttpResponse) -> Result<Value, ApiError> {
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send everything chained so far and return the decoded body.
    ///
    /// `extra_params` (a JSON object, or `null` for none) is merged first.
    /// The pending state is cleared before this returns, on success or error.
    pub fn execute(
        &mut self,
        verb: HttpMethod,
        raw_url: Option<&str>,
        extra_params: Value,
    ) -> Result<Value, ApiError> {
        let (request, params, outcome) = self.dispatch(verb, raw_url, extra_params)?;
        let decoded = outcome?;
        if !self.debug {
            return Ok(decoded);
        }
        debug_envelope(request, params, decoded)
    }

    /// `execute` with every failure collapsed to `null`.
    ///
    /// In debug mode a failed round trip still yields the envelope, with
    /// `response` set to `null`.
    pub fn execute_or_null(
        &mut self,
        verb: HttpMethod,
        raw_url: Option<&str>,
        extra_params: Value,
    ) -> Value {
        let (request, params, outcome) = match self.dispatch(verb, raw_url, extra_params) {
            Ok(dispatched) => dispatched,
            Err(err) => {
                debug!(error = %err, "request could not be compiled, returning null");
                return Value::Null;
            }
        };
        let decoded = outcome.unwrap_or_else(|err| {
            debug!(error = %err, "request failed, returning null");
            Value::Null
        });
        if !self.debug {
            return decoded;
        }
        debug_envelope(request, params, decoded).unwrap_or(Value::Null)
    }

    /// Take the pending state, compile it and send it. The outer error is a
    /// compile failure; the inner one covers transport and decoding.
    fn dispatch(
        &mut self,
        verb: HttpMethod,
        raw_url: Option<&str>,
        extra_params: Value,
    ) -> Result<(HttpRequest, Params, Result<Value, ApiError>), ApiError> {
        let mut state = mem::take(&mut self.state);
        if let Some(extra) = into_params(extra_params) {
            state.merge_params(extra);
        }

        let request = self.build_request(&state, verb, raw_url)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let outcome = self
            .transport
            .send(&request)
            .and_then(|response| self.parse_response(&response));
        Ok((request, state.params, outcome))
    }

    /// Run a named action. `get`, `new`, `update` and `destroy` pick the
    /// verb; any other name becomes the trailing path segment of a GET.
    pub fn call(&mut self, action: &str, params: Value) -> Result<Value, ApiError> {
        match predefined_action(action) {
            Some(verb) => self.execute(verb, None, params),
            None => {
                self.state.action = Some(action.to_string());
                self.execute(HttpMethod::Get, None, params)
            }
        }
    }

    pub fn get(&mut self) -> Result<Value, ApiError> {
        self.call("get", Value::Null)
    }

    pub fn create(&mut self, params: Value) -> Result<Value, ApiError> {
        self.call("new", params)
    }

    pub fn update(&mut self, params: Value) -> Result<Value, ApiError> {
        self.call("update", params)
    }

    pub fn destroy(&mut self) -> Result<Value, ApiError> {
        self.call("destroy", Value::Null)
    }
}

fn debug_envelope(
    request: HttpRequest,
    params: Params,
    response: Value,
) -> Result<Value, ApiError> {
    let envelope = DebugEnvelope {
        params,
        url: request.url,
        postdata: request.body.unwrap_or_default(),
        method: request.method.to_string(),
        response,
    };
    Ok(serde_json::to_value(envelope)?)
}

/// `url` + `/v<version>` + `path`, with exactly one `/` at each join.
fn compile_url(config: &ClientConfig, path: &str) -> String {
    let mut url = config.url.trim_end_matches('/').to_string();
    if let Some(version) = config.version.as_deref().filter(|v| !v.is_empty()) {
        url.push_str("/v");
        url.push_str(version);
    }
    if !path.is_empty() {
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
    }
    url
}

fn into_params(value: Value) -> Option<Params> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warn!(value = %other, "params must be a JSON object, ignoring");
            None
        }
    }
}
