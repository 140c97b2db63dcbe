//! Indicator indexing and multiplicity-preserving adjacency.
//!
//! Identifiers are mapped to dense positions in input order so that every
//! later pass (root discovery, layering, orphan recovery) is deterministic
//! for a given snapshot.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::collections::HashMap;

use crate::error::GraphError;
use crate::model::{Edge, IndicatorRecord};

// ---------------------------------------------------------------------------
// IndicatorIndex
// ---------------------------------------------------------------------------

/// Identifier → position map over a borrowed record slice.
#[derive(Debug)]
pub struct IndicatorIndex<'a> {
    records: &'a [IndicatorRecord],
    positions: HashMap<&'a str, usize>,
}

impl<'a> IndicatorIndex<'a> {
    /// Index `records`, validating that identifiers are non-empty and
    /// unique.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyIdentifier`] or
    /// [`GraphError::DuplicateIdentifier`]; both indicate a defect in the
    /// extraction layer and are not papered over.
    pub fn build(records: &'a [IndicatorRecord]) -> Result<Self, GraphError> {
        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.id.is_empty() {
                return Err(GraphError::EmptyIdentifier { position });
            }
            if let Some(first) = positions.insert(record.id.as_str(), position) {
                return Err(GraphError::DuplicateIdentifier {
                    id: record.id.clone(),
                    first,
                    second: position,
                });
            }
        }
        Ok(Self { records, positions })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Record at `position`. Positions come from this index, so they are
    /// always in bounds.
    pub fn record(&self, position: usize) -> &'a IndicatorRecord {
        &self.records[position]
    }

    pub fn id(&self, position: usize) -> &'a str {
        &self.records[position].id
    }

    pub const fn records(&self) -> &'a [IndicatorRecord] {
        self.records
    }
}

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Incoming/outgoing adjacency lists keyed by index position.
///
/// Lists keep one entry per edge: two edges between the same ordered pair
/// show up twice. Labels stay on the edge list (see
/// [`LayeredGraph::label_of`](super::layers::LayeredGraph::label_of)).
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    pub outgoing: Vec<Vec<usize>>,
    pub incoming: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Build adjacency for `index` from already-validated edges. Edges with
    /// an endpoint outside the index are skipped.
    pub fn build(index: &IndicatorIndex<'_>, edges: &[Edge]) -> Self {
        let n = index.len();
        let mut adj = Self {
            outgoing: vec![Vec::new(); n],
            incoming: vec![Vec::new(); n],
        };
        for edge in edges {
            let (Some(from), Some(to)) = (index.position(&edge.from), index.position(&edge.to))
            else {
                continue;
            };
            adj.outgoing[from].push(to);
            adj.incoming[to].push(from);
        }
        adj
    }

    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    pub fn has_edges(&self, position: usize) -> bool {
        !self.outgoing[position].is_empty() || !self.incoming[position].is_empty()
    }

    pub fn is_root(&self, position: usize) -> bool {
        self.incoming[position].is_empty()
    }
}
