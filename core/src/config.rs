//! Long-lived client configuration.
//!
//! `ClientConfig` is set once at construction and amended only through
//! `RequestBuilder::configure`; it never takes part in the per-request reset.
//! `Settings` is its partial form: every field optional, unknown keys ignored
//! when deserialized from a map.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_LANGUAGE: &str = "en-En";

/// Request body encoding, which also selects the `Content-Type` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Form,
    #[default]
    Json,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Form => "application/x-www-form-urlencoded",
            ContentType::Json => "application/json",
        }
    }
}

impl FromStr for ContentType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" => Ok(ContentType::Form),
            "json" => Ok(ContentType::Json),
            other => Err(ApiError::InvalidSettings(format!(
                "unknown content_type {other:?} (expected \"form\" or \"json\")"
            ))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Form => f.write_str("form"),
            ContentType::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    /// Prefix for every compiled URL.
    pub url: String,
    /// When set, adds a `v<version>` path segment after `url`.
    pub version: Option<String>,
    /// Value of the `Accept-Language` header appended on each `configure`.
    pub language: String,
    pub content_type: ContentType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            version: None,
            language: DEFAULT_LANGUAGE.to_string(),
            content_type: ContentType::Json,
        }
    }
}

impl ClientConfig {
    /// Overwrite the fields present in `settings`, leave the rest alone.
    pub fn apply(&mut self, settings: Settings) {
        if let Some(url) = settings.url {
            self.url = url;
        }
        if let Some(version) = settings.version {
            self.version = Some(version);
        }
        if let Some(language) = settings.language {
            self.language = language;
        }
        if let Some(content_type) = settings.content_type {
            self.content_type = content_type;
        }
    }
}

/// Partial `ClientConfig`. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub url: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: Option<String>,
    pub language: Option<String>,
    pub content_type: Option<ContentType>,
}

impl Settings {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Parse a settings map. Keys other than `url`, `version`, `language`
    /// and `content_type` are ignored.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::InvalidSettings(e.to_string()))
    }

    /// Read `MINESWEEPER_URL`, `MINESWEEPER_VERSION`, `MINESWEEPER_LANGUAGE`
    /// and `MINESWEEPER_CONTENT_TYPE`. Unset or empty variables stay `None`.
    pub fn from_env() -> Result<Self, ApiError> {
        let content_type = match read_env("MINESWEEPER_CONTENT_TYPE") {
            Some(raw) => Some(raw.parse()?),
            None => None,
        };
        Ok(Self {
            url: read_env("MINESWEEPER_URL"),
            version: read_env("MINESWEEPER_VERSION"),
            language: read_env("MINESWEEPER_LANGUAGE"),
            content_type,
        })
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Versions show up as both `"1"` and `1` in settings maps.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "version must be a string or number, got {other}"
        ))),
    }
}
