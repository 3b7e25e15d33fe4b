//! The API error envelope.
//!
//! Any payload carrying a top-level `error` key is a failure, whatever the
//! HTTP status. Validation failures ride in `context.failures`, keyed by the
//! offending field path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ "error": { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: DomainError,
}

impl ErrorEnvelope {
    /// Extract the envelope from a payload, if it is one.
    ///
    /// Returns `None` for anything without an object-valued `error` key.
    /// A malformed `error` object still counts as an error; missing fields
    /// fall back to empty strings.
    pub fn detect(payload: &Value) -> Option<DomainError> {
        let error = payload.as_object()?.get("error")?;
        if !error.is_object() {
            return None;
        }
        Some(
            serde_json::from_value(error.clone()).unwrap_or_else(|_| DomainError {
                code: String::new(),
                message: error.to_string(),
                exceptions: None,
                context: None,
            }),
        )
    }
}

/// A structured failure reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    /// Server-side stack traces, present in debug deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct ValidationContext {
    failures: BTreeMap<String, FieldFailure>,
}

impl DomainError {
    /// Field failures from a validation context, keyed by field path.
    ///
    /// Empty when the context is absent or has another shape.
    pub fn validation_failures(&self) -> BTreeMap<String, FieldFailure> {
        self.context
            .clone()
            .and_then(|ctx| serde_json::from_value::<ValidationContext>(ctx).ok())
            .map(|ctx| ctx.failures)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}
