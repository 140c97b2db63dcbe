//! Edge endpoint resolution.
//!
//! Upstream canvases encode connections in more than one way:
//!
//! ```text
//! {"fromNode": "a", "toNode": "b"}            canvas files
//! {"from": {"node": "a"}, "to": {"node": "b"}} nested endpoints
//! {"source": "a", "target": "b"}              generic graph exports
//! {"from": "a", "to": "b"}                    flat endpoints
//! ```
//!
//! Rather than special-casing each shape, an [`EndpointResolver`] holds an
//! ordered chain of [`FieldPath`]s per endpoint and returns the first one
//! that yields a usable identifier. The chain is configurable through the
//! `[edges]` table (see [`crate::config::EdgeConfig`]).

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::GraphError;
use crate::model::{Edge, RawEdge};

pub const DEFAULT_FROM_FIELDS: &[&str] = &["fromNode", "from.node", "from.id", "source", "from"];
pub const DEFAULT_TO_FIELDS: &[&str] = &["toNode", "to.node", "to.id", "target", "to"];
pub const DEFAULT_LABEL_FIELDS: &[&str] = &["label"];

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

/// A dot-separated path into a JSON object, e.g. `from.node`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidFieldPath`] for an empty path or an
    /// empty segment (`"from..node"`).
    pub fn parse(path: &str) -> Result<Self, GraphError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(GraphError::InvalidFieldPath(path.to_string()));
        }
        Ok(Self { segments })
    }

    /// Look up the path and coerce the value to an identifier string.
    ///
    /// Strings are used as-is (blank strings do not count), numbers are
    /// rendered in decimal. Anything else fails.
    #[must_use]
    pub fn extract(&self, value: &Value) -> Option<String> {
        let mut cursor = value;
        for segment in &self.segments {
            cursor = cursor.as_object()?.get(segment)?;
        }
        match cursor {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl TryFrom<String> for FieldPath {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

fn parse_chain(paths: &[&str]) -> Vec<FieldPath> {
    paths
        .iter()
        .filter_map(|p| FieldPath::parse(p).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// EndpointResolver
// ---------------------------------------------------------------------------

/// Ordered extractor chains for the source, target and label of an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    pub from: Vec<FieldPath>,
    pub to: Vec<FieldPath>,
    pub label: Vec<FieldPath>,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self {
            from: parse_chain(DEFAULT_FROM_FIELDS),
            to: parse_chain(DEFAULT_TO_FIELDS),
            label: parse_chain(DEFAULT_LABEL_FIELDS),
        }
    }
}

impl EndpointResolver {
    pub const fn new(from: Vec<FieldPath>, to: Vec<FieldPath>, label: Vec<FieldPath>) -> Self {
        Self { from, to, label }
    }

    /// Resolve one raw edge into a normalized [`Edge`].
    ///
    /// Returns `None` when the payload is not an object or either endpoint
    /// cannot be resolved by any extractor in its chain.
    #[must_use]
    pub fn resolve(&self, raw: &RawEdge) -> Option<Edge> {
        let value = raw.as_value();
        if !value.is_object() {
            return None;
        }
        let from = first_match(&self.from, value)?;
        let to = first_match(&self.to, value)?;
        let label = first_match(&self.label, value);
        Some(Edge { from, to, label })
    }
}

fn first_match(chain: &[FieldPath], value: &Value) -> Option<String> {
    chain.iter().find_map(|path| path.extract(value))
}

// ---------------------------------------------------------------------------
// Batch resolution
// ---------------------------------------------------------------------------

/// Outcome of resolving a whole raw edge collection against a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEdges {
    /// Edges whose endpoints both name a known record, in input order.
    /// Parallel edges are preserved.
    pub valid: Vec<Edge>,
    /// Raw edges discarded because an endpoint was unresolvable or unknown.
    pub dropped: usize,
}

/// Resolve every raw edge and keep the ones whose endpoints satisfy
/// `is_known`.
pub fn resolve_edges<'a, I, F>(raw: I, resolver: &EndpointResolver, is_known: F) -> ResolvedEdges
where
    I: IntoIterator<Item = &'a RawEdge>,
    F: Fn(&str) -> bool,
{
    let mut out = ResolvedEdges::default();
    for (position, edge) in raw.into_iter().enumerate() {
        match resolver.resolve(edge) {
            Some(e) if is_known(&e.from) && is_known(&e.to) => out.valid.push(e),
            Some(e) => {
                trace!(position, from = %e.from, to = %e.to, "dropping edge with unknown endpoint");
                out.dropped += 1;
            }
            None => {
                trace!(position, "dropping edge with unresolvable endpoint");
                out.dropped += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawEdge {
        RawEdge(v)
    }

    #[test]
    fn resolves_canvas_encoding() {
        let r = EndpointResolver::default();
        let e = r
            .resolve(&raw(json!({"fromNode": "a", "toNode": "b", "label": "beacons"})))
            .expect("edge");
        assert_eq!(e, Edge::new("a", "b").with_label("beacons"));
    }

    #[test]
    fn resolves_nested_and_generic_encodings() {
        let r = EndpointResolver::default();
        assert_eq!(
            r.resolve(&raw(json!({"from": {"node": "a"}, "to": {"node": "b"}}))),
            Some(Edge::new("a", "b"))
        );
        assert_eq!(
            r.resolve(&raw(json!({"from": {"id": "a"}, "to": {"id": "b"}}))),
            Some(Edge::new("a", "b"))
        );
        assert_eq!(
            r.resolve(&raw(json!({"source": "a", "target": "b"}))),
            Some(Edge::new("a", "b"))
        );
        assert_eq!(
            r.resolve(&raw(json!({"from": "a", "to": "b"}))),
            Some(Edge::new("a", "b"))
        );
    }

    #[test]
    fn earlier_extractor_wins() {
        let r = EndpointResolver::default();
        let e = r
            .resolve(&raw(json!({"fromNode": "a", "source": "z", "toNode": "b"})))
            .expect("edge");
        assert_eq!(e.from, "a");
    }

    #[test]
    fn mixed_encodings_per_endpoint() {
        let r = EndpointResolver::default();
        let e = r
            .resolve(&raw(json!({"fromNode": "a", "target": "b"})))
            .expect("edge");
        assert_eq!(e, Edge::new("a", "b"));
    }

    #[test]
    fn unresolvable_shapes_yield_none() {
        let r = EndpointResolver::default();
        assert!(r.resolve(&raw(json!(null))).is_none());
        assert!(r.resolve(&raw(json!("a->b"))).is_none());
        assert!(r.resolve(&raw(json!({"fromNode": "a"}))).is_none());
        assert!(r.resolve(&raw(json!({"fromNode": "", "toNode": "b"}))).is_none());
        assert!(r.resolve(&raw(json!({"from": ["a"], "to": "b"}))).is_none());
    }

    #[test]
    fn numeric_ids_are_rendered() {
        let r = EndpointResolver::default();
        assert_eq!(
            r.resolve(&raw(json!({"source": 1, "target": 2}))),
            Some(Edge::new("1", "2"))
        );
    }

    #[test]
    fn field_path_rejects_empty_segments() {
        assert!(FieldPath::parse("from..node").is_err());
        assert!(FieldPath::parse("").is_err());
        assert_eq!(
            FieldPath::parse("from.node").expect("path").to_string(),
            "from.node"
        );
    }

    #[test]
    fn batch_resolution_counts_drops_and_keeps_multiplicity() {
        let edges = vec![
            raw(json!({"fromNode": "a", "toNode": "b"})),
            raw(json!({"fromNode": "a", "toNode": "b"})),
            raw(json!({"fromNode": "a", "toNode": "ghost"})),
            raw(json!(42)),
        ];
        let known = ["a", "b"];
        let out = resolve_edges(&edges, &EndpointResolver::default(), |id| known.contains(&id));
        assert_eq!(out.valid.len(), 2);
        assert_eq!(out.dropped, 2);
    }
}
