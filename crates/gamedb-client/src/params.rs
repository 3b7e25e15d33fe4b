//! Query-string parameters.
//!
//! Serialization rules: `true` becomes a bare key, `false` and `null` are
//! dropped, numbers are written in base 10, strings verbatim, and objects or
//! arrays as compact JSON.

use gamedb_core::{Filter, Projection};
use reqwest::Url;
use serde_json::Value;

/// Ordered request parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Add the projection as `p`, unless it is empty.
    #[must_use]
    pub fn projection(self, projection: Option<&Projection>) -> Self {
        match projection.filter(|p| !p.is_empty()) {
            Some(p) => {
                let value = serde_json::to_value(p).unwrap_or_default();
                self.set("p", value)
            }
            None => self,
        }
    }

    /// Add the query document as `q`.
    #[must_use]
    pub fn filter(self, filter: Option<&Filter>) -> Self {
        match filter {
            Some(f) => self.set("q", f.to_value()),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialized pairs; `None` marks a presence-only flag.
    pub fn pairs(&self) -> Vec<(&str, Option<String>)> {
        self.0
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null | Value::Bool(false) => return None,
                    Value::Bool(true) => None,
                    Value::Number(n) => Some(n.to_string()),
                    Value::String(s) => Some(s.clone()),
                    Value::Array(_) | Value::Object(_) => Some(value.to_string()),
                };
                Some((key.as_str(), rendered))
            })
            .collect()
    }

    /// Append the parameters to `url`'s query string.
    pub fn apply(&self, url: &mut Url) {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            match value {
                Some(v) => query.append_pair(key, &v),
                None => query.append_key_only(key),
            };
        }
    }
}
