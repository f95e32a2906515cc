//! Per-request accumulator.
//!
//! A `RequestState` lives from the first chained call until `execute`, which
//! moves it out of the builder and leaves a fresh default in its place. Nothing
//! in here outlives a single request.

use serde_json::{Map, Value};

use crate::http::HttpMethod;

pub type Params = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestState {
    /// Path segments in call order.
    pub namespaces: Vec<String>,
    /// Final path segment naming an operation, e.g. `reveal`.
    pub action: Option<String>,
    pub params: Params,
    /// Takes precedence over the verb `execute` was called with.
    pub method_overwrite: Option<HttpMethod>,
}

impl RequestState {
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
            && self.action.is_none()
            && self.params.is_empty()
            && self.method_overwrite.is_none()
    }

    /// Last write wins; keys already present keep their position.
    pub fn merge_params(&mut self, params: Params) {
        for (key, value) in params {
            self.params.insert(key, value);
        }
    }

    /// `/ns1/ns2/.../action`, or `""` when nothing was chained.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in self.namespaces.iter().chain(self.action.iter()) {
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}
