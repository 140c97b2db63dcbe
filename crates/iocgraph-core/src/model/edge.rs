//! Edge descriptors.
//!
//! A [`RawEdge`] is whatever the upstream canvas stored for a connection;
//! several encodings are in circulation, so the payload is kept as an
//! untyped JSON value and only interpreted by [`crate::resolve`]. An
//! [`Edge`] is the normalized result: two identifiers and an optional label.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Directed, normalized relation between two indicator identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(rename = "fromId")]
    pub from: String,
    #[serde(rename = "toId")]
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} -[{label}]-> {}", self.from, self.to),
            None => write!(f, "{} -> {}", self.from, self.to),
        }
    }
}

/// An edge exactly as the upstream source encoded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEdge(pub Value);

impl RawEdge {
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawEdge {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&Edge> for RawEdge {
    fn from(edge: &Edge) -> Self {
        let mut map = serde_json::Map::new();
        map.insert("fromNode".into(), Value::String(edge.from.clone()));
        map.insert("toNode".into(), Value::String(edge.to.clone()));
        if let Some(label) = &edge.label {
            map.insert("label".into(), Value::String(label.clone()));
        }
        Self(Value::Object(map))
    }
}
