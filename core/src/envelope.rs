//! Wrapper objects that share the API's JSON shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::Params;

/// Returned by `execute` in place of the decoded body when debug mode is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugEnvelope {
    pub params: Params,
    pub url: String,
    /// Encoded request body; empty for GET.
    pub postdata: String,
    pub method: String,
    pub response: Value,
}

/// `{"success": false, "error": {...}}`, the API's failure shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub status: u16,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "userMessage")]
    pub user_message: String,
}

/// Build a local validation error without a round trip. Never called by
/// `execute` itself.
pub fn make_error(message: impl Into<String>, code: u16) -> ErrorEnvelope {
    ErrorEnvelope {
        success: false,
        error: ErrorDetail {
            status: code,
            kind: "Bad Request".to_string(),
            user_message: message.into(),
        },
    }
}

impl Default for ErrorEnvelope {
    fn default() -> Self {
        make_error("Invalid request", 400)
    }
}
