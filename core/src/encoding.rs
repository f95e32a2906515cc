//! Param encoders for query strings and request bodies.
//!
//! Nested objects and arrays are flattened into bracketed keys
//! (`filter[size]=9`, `ids[0]=1`) before being handed to `serde_urlencoded`,
//! which is the shape most form-parsing servers expect.

use serde_json::{Number, Value};

use crate::config::ContentType;
use crate::error::ApiError;
use crate::state::Params;

/// `a=1&b=two`. Empty params give an empty string.
pub fn to_query(params: &Params) -> Result<String, ApiError> {
    let pairs = flatten(params);
    Ok(serde_urlencoded::to_string(&pairs)?)
}

/// Encode params as a request body in the configured content type.
pub fn to_body(params: &Params, content_type: ContentType) -> Result<String, ApiError> {
    match content_type {
        ContentType::Json => Ok(serde_json::to_string(params)?),
        ContentType::Form => to_query(params),
    }
}

/// Flatten params into ordered `(key, value)` pairs.
///
/// `null` entries are dropped and booleans become `1`/`0`.
pub fn flatten(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_value(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_value(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => pairs.push((key, number_to_param(n))),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_value(pairs, format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (child, item) in map {
                push_value(pairs, format!("{key}[{child}]"), item);
            }
        }
    }
}

/// Integral floats are sent without a fraction (`1.0` -> `1`).
fn number_to_param(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}
