//! Snapshot loading.
//!
//! A snapshot is the unit of work for one extraction call: the records the
//! extraction layer managed to parse, every raw edge found on the canvas,
//! and optionally how many raw nodes there were before parsing. The engine
//! never assumes two snapshots describe the same canvas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{IndicatorRecord, RawEdge};
use crate::error::GraphError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub records: Vec<IndicatorRecord>,
    pub edges: Vec<RawEdge>,
    /// Number of raw canvas nodes before indicator extraction. Defaults to
    /// the record count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_nodes: Option<usize>,
}

impl Snapshot {
    pub const fn new(records: Vec<IndicatorRecord>, edges: Vec<RawEdge>) -> Self {
        Self {
            records,
            edges,
            total_nodes: None,
        }
    }

    /// Parse a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingCollection`] when `records` or `edges`
    /// is absent or `null`, and [`GraphError::Snapshot`] for any other
    /// malformed input.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse a snapshot from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// See [`Snapshot::from_json`].
    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        for field in ["records", "edges"] {
            match value.get(field) {
                None | Some(Value::Null) => return Err(GraphError::MissingCollection(field)),
                Some(_) => {}
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Raw node count for diagnostics.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.total_nodes.unwrap_or(self.records.len())
    }
}
