//! Graph-level analysis of indicator snapshots.
//!
//! ## Submodules
//!
//! - [`index`]: identifier positions and multiplicity-preserving adjacency.
//! - [`layers`]: maximum-depth layered placement (roots, depth
//!   relaxation, orphan recovery, isolated records).
//! - [`hierarchy`]: role-aware parent/child grouping and directional-error
//!   detection.
//! - [`cycles`]: cyclic-component reporting and back-edge classification.
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use iocgraph_core::graph::analyze;
//! use iocgraph_core::model::Snapshot;
//! use iocgraph_core::resolve::EndpointResolver;
//!
//! let snapshot = Snapshot::from_json(&text)?;
//! let analysis = analyze(&snapshot, &EndpointResolver::default())?;
//! println!("layers={} groups={}",
//!     analysis.layers.layers.len(), analysis.hierarchy.group_count());
//! ```

pub mod cycles;
pub mod hierarchy;
pub mod index;
pub mod layers;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::GraphError;
use crate::model::Snapshot;
use crate::resolve::EndpointResolver;

pub use hierarchy::{Hierarchy, HierarchyChild, ParentChildGroup, build_hierarchy};
pub use layers::{GraphStatus, Layer, LayerDiagnostics, LayerEntry, LayeredGraph, extract_layers};

/// Both views of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub layers: LayeredGraph,
    pub hierarchy: Hierarchy,
}

/// Run the layering pass, then feed its valid edges to the hierarchy
/// builder.
///
/// # Errors
///
/// Propagates the contract violations of [`extract_layers`].
#[instrument(skip_all)]
pub fn analyze(snapshot: &Snapshot, resolver: &EndpointResolver) -> Result<Analysis, GraphError> {
    let layers = extract_layers(snapshot, resolver)?;
    let hierarchy = build_hierarchy(&snapshot.records, &layers.edges)?;
    Ok(Analysis { layers, hierarchy })
}
