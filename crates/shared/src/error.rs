use serde::{Deserialize, Serialize};

/// Body returned by the gallery backend on non-2xx responses.
///
/// Only `detail` is meaningful to clients; every other field is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Parses a raw response body, tolerating empty or non-JSON payloads.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Returns the server-provided detail, falling back to `fallback` when it
    /// is absent or blank.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.detail.as_deref().map(str::trim) {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => fallback.to_string(),
        }
    }
}
