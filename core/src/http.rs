//! HTTP request/response values exchanged with a `Transport`.
//!
//! # Design
//! The builder compiles chained calls into an `HttpRequest` without touching
//! the network; a `Transport` turns it into an `HttpResponse`. Keeping both
//! sides as plain owned data means request compilation can be asserted on
//! directly in tests, with no server involved.

use std::fmt;

/// The four verbs the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Case-insensitive lookup. Returns `None` for anything outside the
    /// permitted four (`PATCH`, `HEAD`, padded names, typos...).
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully compiled request: absolute URL (query string included for GET),
/// ordered header list and optional encoded body.
///
/// `method` is always the effective verb, so PUT and DELETE reach the wire
/// as themselves even though they carry a body like POST does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// All values of a header, in order, matched case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// A raw response as returned by a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
