//! Projection maps and query documents.
//!
//! Both are pass-through directives for the API: the client builds and
//! serializes them but never validates or evaluates them. They travel as the
//! `p` and `q` query parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Field inclusion/exclusion map shaping the server's response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection(BTreeMap<String, bool>);

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection returning only `fields`.
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(|f| (f.into(), true)).collect())
    }

    /// Projection returning everything except `fields`.
    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(|f| (f.into(), false)).collect())
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, included: bool) -> Self {
        self.0.insert(field.into(), included);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<bool> {
        self.0.get(field).copied()
    }
}

/// Comparison operator of a single field condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Op {
    const fn key(self) -> Option<&'static str> {
        match self {
            Self::Eq => None,
            Self::Gt => Some("$gt"),
            Self::Gte => Some("$gte"),
            Self::Lt => Some("$lt"),
            Self::Lte => Some("$lte"),
            Self::In => Some("$in"),
        }
    }
}

/// A query document: a small filter-expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Field { field: String, op: Op, value: Value },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// Pre-built document passed through untouched.
    Raw(Value),
}

impl Filter {
    fn field(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self::Field {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Op::Eq, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Op::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Op::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Op::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Op::Lte, value)
    }

    pub fn one_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::field(field, Op::In, Value::Array(values))
    }

    pub fn all(filters: Vec<Self>) -> Self {
        Self::And(filters)
    }

    pub fn any(filters: Vec<Self>) -> Self {
        Self::Or(filters)
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut filters) => {
                filters.push(other);
                Self::And(filters)
            }
            first => Self::And(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut filters) => {
                filters.push(other);
                Self::Or(filters)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// The JSON document sent to the server.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Field { field, op, value } => {
                let condition = op.key().map_or_else(
                    || value.clone(),
                    |key| {
                        let mut inner = Map::new();
                        inner.insert(key.to_string(), value.clone());
                        Value::Object(inner)
                    },
                );
                let mut doc = Map::new();
                doc.insert(field.clone(), condition);
                Value::Object(doc)
            }
            Self::And(filters) => compose("$and", filters),
            Self::Or(filters) => compose("$or", filters),
            Self::Raw(value) => value.clone(),
        }
    }
}

fn compose(key: &str, filters: &[Filter]) -> Value {
    let mut doc = Map::new();
    doc.insert(
        key.to_string(),
        Value::Array(filters.iter().map(Filter::to_value).collect()),
    );
    Value::Object(doc)
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projection_serializes_as_flat_map() {
        let p = Projection::include(["id", "name"]).with("crafting", false);
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"crafting": false, "id": true, "name": true})
        );
        assert_eq!(p.get("crafting"), Some(false));
        assert!(!p.is_empty());
        assert!(Projection::new().is_empty());
    }

    #[test]
    fn projection_exclude() {
        let p = Projection::exclude(["assets"]);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"assets":false}"#);
    }

    #[test]
    fn equality_is_a_bare_field() {
        assert_eq!(Filter::eq("name", "Rathalos").to_value(), json!({"name": "Rathalos"}));
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(Filter::gt("rarity", 5).to_value(), json!({"rarity": {"$gt": 5}}));
        assert_eq!(Filter::gte("rarity", 5).to_value(), json!({"rarity": {"$gte": 5}}));
        assert_eq!(Filter::lt("rarity", 5).to_value(), json!({"rarity": {"$lt": 5}}));
        assert_eq!(Filter::lte("rarity", 5).to_value(), json!({"rarity": {"$lte": 5}}));
        assert_eq!(
            Filter::one_of("type", ["bow", "lance"]).to_value(),
            json!({"type": {"$in": ["bow", "lance"]}})
        );
    }

    #[test]
    fn composition_flattens_chains() {
        let f = Filter::eq("type", "bow")
            .and(Filter::gte("rarity", 6))
            .and(Filter::lt("rarity", 9));
        assert_eq!(
            f.to_value(),
            json!({"$and": [
                {"type": "bow"},
                {"rarity": {"$gte": 6}},
                {"rarity": {"$lt": 9}},
            ]})
        );
    }

    #[test]
    fn nested_or_inside_and() {
        let f = Filter::all(vec![
            Filter::any(vec![Filter::eq("rank", "high"), Filter::eq("rank", "master")]),
            Filter::eq("type", "head"),
        ]);
        assert_eq!(
            serde_json::to_value(&f).unwrap(),
            json!({"$and": [
                {"$or": [{"rank": "high"}, {"rank": "master"}]},
                {"type": "head"},
            ]})
        );
    }

    #[test]
    fn raw_documents_pass_through() {
        let doc = json!({"name": {"$like": "Rath%"}});
        assert_eq!(Filter::from(doc.clone()).to_value(), doc);
    }
}
