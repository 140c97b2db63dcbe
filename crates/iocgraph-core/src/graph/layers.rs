//! Layered placement of indicator graphs.
//!
//! # Overview
//!
//! Every indicator that takes part in at least one valid edge is assigned to
//! a horizontal layer equal to its **maximum** distance from a root. The
//! result feeds a left-to-right (or top-down) drawing in the presentation
//! layer.
//!
//! ## Pipeline
//!
//! ```text
//! Snapshot { records, raw edges }
//!        ↓  IndicatorIndex::build            (ids → positions, contract checks)
//!        ↓  resolve_edges                    (endpoint chains, drop unknowns)
//!        ↓  Adjacency::build                 (multiplicity-preserving lists)
//!        ↓  roots                            (edge-bearing, no incoming edge)
//!        ↓  max-depth relaxation             (FIFO queue, depths may rise)
//!        ↓  orphan recovery                  (rootless components, BFS depth)
//!        ↓  layer assembly                   (dense 0..=max_depth)
//! LayeredGraph { layers, edges, isolated, diagnostics }
//! ```
//!
//! ## Depth revision
//!
//! A plain BFS fixes a node's depth on first arrival, which yields the
//! shortest distance. Here a node dequeued at a larger depth than the one
//! recorded has its depth raised and is expanded again, so the raise reaches
//! its descendants. Edges that close a cycle (see
//! [`super::cycles::back_edges`]) are excluded from the relaxation; the
//! remaining subgraph is acyclic, depths are bounded by the node count, and
//! the queue drains. Work is O(V·E) in the worst case.
//!
//! ## Orphan components
//!
//! A component where every node has an incoming edge (a pure cycle) has no
//! root. Each still-unassigned, edge-bearing node seeds a fresh BFS at depth
//! 0 that only assigns nodes nobody has assigned yet. Depths inside such
//! components are first-arrival depths, not maxima.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::cycles::{back_edges, find_cycles};
use super::index::{Adjacency, IndicatorIndex};
use crate::error::GraphError;
use crate::model::{Edge, IndicatorRecord, Snapshot};
use crate::resolve::{EndpointResolver, resolve_edges};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Whether the snapshot contained anything to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStatus {
    Found,
    /// No indicator records at all.
    Empty,
}

/// One placed indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub id: String,
    pub depth: usize,
    pub record: IndicatorRecord,
}

/// All indicators sharing one depth, in input order.
///
/// Layers are dense: a depth with no members is still present, with no
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub depth: usize,
    pub entries: Vec<LayerEntry>,
}

impl Layer {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }
}

/// Counters describing one extraction call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDiagnostics {
    /// Raw canvas nodes before indicator extraction.
    pub total_nodes: usize,
    /// Raw edges as supplied, valid or not.
    pub total_edges: usize,
    pub indicator_count: usize,
    pub valid_connection_count: usize,
    pub dropped_edge_count: usize,
    /// Records with at least one edge and no incoming edge. Edge-less
    /// records also lack incoming edges but are counted in
    /// `isolated_count` instead, never here.
    pub root_count: usize,
    /// Fresh BFS seeds needed for rootless components.
    pub orphan_seed_count: usize,
    pub isolated_count: usize,
    /// Strongly connected components whose depths are approximate.
    pub cyclic_components: Vec<Vec<String>>,
    /// BLAKE3 digest of record ids and valid edges, stable across calls on
    /// the same snapshot.
    pub fingerprint: String,
}

/// Output of [`extract_layers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayeredGraph {
    pub status: GraphStatus,
    pub layers: Vec<Layer>,
    /// Every valid edge, parallel edges included, in input order.
    pub edges: Vec<Edge>,
    /// Records with no valid edge at all, in input order.
    #[serde(rename = "isolatedNodes")]
    pub isolated: Vec<IndicatorRecord>,
    pub diagnostics: LayerDiagnostics,
}

impl LayeredGraph {
    pub fn is_found(&self) -> bool {
        self.status == GraphStatus::Found
    }

    /// Deepest populated layer, or `None` when nothing was layered.
    pub fn max_depth(&self) -> Option<usize> {
        self.layers.len().checked_sub(1)
    }

    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.layers
            .iter()
            .flat_map(|layer| &layer.entries)
            .find(|entry| entry.id == id)
            .map(|entry| entry.depth)
    }

    /// Label of the last valid `from → to` edge carrying one.
    pub fn label_of(&self, from: &str, to: &str) -> Option<&str> {
        self.edges
            .iter()
            .rev()
            .filter(|e| e.from == from && e.to == to)
            .find_map(|e| e.label.as_deref())
    }

    /// Identifiers of every layered record, layer by layer.
    pub fn layered_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().flat_map(Layer::ids)
    }
}

// ---------------------------------------------------------------------------
// Depth assignment
// ---------------------------------------------------------------------------

/// Per-position depths produced by the root pass and orphan recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthAssignment {
    /// `None` for positions without edges.
    pub depths: Vec<Option<usize>>,
    pub roots: Vec<usize>,
    pub orphan_seeds: Vec<usize>,
}

/// Assign a depth to every edge-bearing position of `adjacency`.
pub fn assign_depths(adjacency: &Adjacency) -> DepthAssignment {
    let n = adjacency.node_count();
    let roots: Vec<usize> = (0..n)
        .filter(|&p| adjacency.has_edges(p) && adjacency.is_root(p))
        .collect();

    let mut depths: Vec<Option<usize>> = vec![None; n];
    relax_from_roots(adjacency, &roots, &mut depths);
    let orphan_seeds = recover_orphans(adjacency, &mut depths);

    DepthAssignment {
        depths,
        roots,
        orphan_seeds,
    }
}

/// FIFO relaxation that keeps the maximum depth seen for each node.
fn relax_from_roots(adjacency: &Adjacency, roots: &[usize], depths: &mut [Option<usize>]) {
    let back: HashSet<(usize, usize)> = back_edges(adjacency, roots);
    let mut queue: VecDeque<(usize, usize)> = roots.iter().map(|&r| (r, 0)).collect();

    while let Some((node, depth)) = queue.pop_front() {
        if depths[node].is_some_and(|seen| seen >= depth) {
            continue;
        }
        depths[node] = Some(depth);
        for &next in &adjacency.outgoing[node] {
            if !back.contains(&(node, next)) {
                queue.push_back((next, depth + 1));
            }
        }
    }
}

/// Seed a BFS from every unassigned, edge-bearing node. Returns the seeds.
fn recover_orphans(adjacency: &Adjacency, depths: &mut [Option<usize>]) -> Vec<usize> {
    let n = adjacency.node_count();
    let mut seeds = Vec::new();

    for seed in 0..n {
        if depths[seed].is_some() || !adjacency.has_edges(seed) {
            continue;
        }
        seeds.push(seed);

        let mut visited = vec![false; n];
        visited[seed] = true;
        let mut queue: VecDeque<(usize, usize)> = VecDeque::from([(seed, 0)]);

        while let Some((node, depth)) = queue.pop_front() {
            if depths[node].is_none() {
                depths[node] = Some(depth);
            }
            for &next in &adjacency.outgoing[node] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back((next, depth + 1));
                }
            }
        }
    }

    seeds
}

/// Group assigned positions into dense layers `0..=max_depth`.
fn assemble_layers(index: &IndicatorIndex<'_>, depths: &[Option<usize>]) -> Vec<Layer> {
    let Some(max_depth) = depths.iter().flatten().copied().max() else {
        return Vec::new();
    };

    let mut layers: Vec<Layer> = (0..=max_depth)
        .map(|depth| Layer {
            depth,
            entries: Vec::new(),
        })
        .collect();

    for (position, depth) in depths.iter().enumerate() {
        if let Some(depth) = *depth {
            let record = index.record(position);
            layers[depth].entries.push(LayerEntry {
                id: record.id.clone(),
                depth,
                record: record.clone(),
            });
        }
    }

    layers
}

fn fingerprint(index: &IndicatorIndex<'_>, edges: &[Edge]) -> String {
    let mut hasher = blake3::Hasher::new();
    for record in index.records() {
        hasher.update(record.id.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    for edge in edges {
        hasher.update(edge.from.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.to.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.label.as_deref().unwrap_or_default().as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Lay out one snapshot.
///
/// # Errors
///
/// Returns a [`GraphError`] only for contract violations in the record set
/// (empty or duplicate identifiers). Unresolvable edges, cycles and empty
/// input are reported through [`LayerDiagnostics`] and [`GraphStatus`].
#[instrument(skip_all, fields(records = snapshot.records.len(), edges = snapshot.edges.len()))]
pub fn extract_layers(
    snapshot: &Snapshot,
    resolver: &EndpointResolver,
) -> Result<LayeredGraph, GraphError> {
    let index = IndicatorIndex::build(&snapshot.records)?;
    let resolved = resolve_edges(&snapshot.edges, resolver, |id| index.contains(id));
    let adjacency = Adjacency::build(&index, &resolved.valid);

    let assignment = assign_depths(&adjacency);
    let layers = assemble_layers(&index, &assignment.depths);

    let isolated: Vec<IndicatorRecord> = (0..index.len())
        .filter(|&p| !adjacency.has_edges(p))
        .map(|p| index.record(p).clone())
        .collect();

    let cyclic_components = find_cycles(&index, &adjacency);
    if !cyclic_components.is_empty() {
        warn!(
            components = cyclic_components.len(),
            "indicator graph contains cycles; depths inside them are approximate"
        );
    }

    let diagnostics = LayerDiagnostics {
        total_nodes: snapshot.total_nodes(),
        total_edges: snapshot.edges.len(),
        indicator_count: index.len(),
        valid_connection_count: resolved.valid.len(),
        dropped_edge_count: resolved.dropped,
        root_count: assignment.roots.len(),
        orphan_seed_count: assignment.orphan_seeds.len(),
        isolated_count: isolated.len(),
        cyclic_components,
        fingerprint: fingerprint(&index, &resolved.valid),
    };

    let status = if index.is_empty() {
        GraphStatus::Empty
    } else {
        GraphStatus::Found
    };

    debug!(
        ?status,
        layers = layers.len(),
        roots = diagnostics.root_count,
        orphan_seeds = diagnostics.orphan_seed_count,
        isolated = diagnostics.isolated_count,
        dropped = diagnostics.dropped_edge_count,
        "layering complete"
    );

    Ok(LayeredGraph {
        status,
        layers,
        edges: resolved.valid,
        isolated,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawEdge;

    fn snapshot(ids: &[&str], edges: &[(&str, &str)]) -> Snapshot {
        Snapshot::new(
            ids.iter().map(|id| IndicatorRecord::new(*id, "IP")).collect(),
            edges
                .iter()
                .map(|(a, b)| RawEdge::from(&Edge::new(*a, *b)))
                .collect(),
        )
    }

    fn layer_ids(g: &LayeredGraph) -> Vec<Vec<&str>> {
        g.layers.iter().map(|l| l.ids().collect()).collect()
    }

    fn run(ids: &[&str], edges: &[(&str, &str)]) -> LayeredGraph {
        extract_layers(&snapshot(ids, edges), &EndpointResolver::default()).expect("layers")
    }

    #[test]
    fn linear_chain_one_node_per_layer() {
        let g = run(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert_eq!(layer_ids(&g), vec![vec!["a"], vec!["b"], vec!["c"]]);
        assert_eq!(g.diagnostics.root_count, 1);
        assert_eq!(g.max_depth(), Some(2));
    }

    #[test]
    fn diamond_takes_longest_path() {
        let g = run(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        assert_eq!(g.depth_of("d"), Some(2));
        assert_eq!(layer_ids(&g), vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn raised_depth_propagates_to_descendants() {
        // a → b → d → f and a → c → e → d: d must sit at 3, f at 4.
        let g = run(
            &["a", "b", "c", "d", "e", "f"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "e"), ("e", "d"), ("d", "f")],
        );
        assert_eq!(g.depth_of("d"), Some(3));
        assert_eq!(g.depth_of("f"), Some(4));
    }

    #[test]
    fn shortcut_edge_does_not_pull_node_up() {
        let g = run(&["a", "b", "c"], &[("a", "c"), ("a", "b"), ("b", "c")]);
        assert_eq!(g.depth_of("c"), Some(2));
    }

    #[test]
    fn pure_cycle_is_recovered() {
        let g = run(&["x", "y"], &[("x", "y"), ("y", "x")]);
        assert_eq!(g.diagnostics.root_count, 0);
        assert_eq!(g.diagnostics.orphan_seed_count, 1);
        assert_eq!(layer_ids(&g), vec![vec!["x"], vec!["y"]]);
        assert_eq!(
            g.diagnostics.cyclic_components,
            vec![vec!["x".to_string(), "y".to_string()]]
        );
    }

    #[test]
    fn cycle_reachable_from_root_terminates() {
        // r → a → b → a
        let g = run(&["r", "a", "b"], &[("r", "a"), ("a", "b"), ("b", "a")]);
        assert_eq!(layer_ids(&g), vec![vec!["r"], vec!["a"], vec!["b"]]);
        assert_eq!(g.diagnostics.orphan_seed_count, 0);
    }

    #[test]
    fn self_loop_only_node_is_layered_not_isolated() {
        let g = run(&["s"], &[("s", "s")]);
        assert_eq!(layer_ids(&g), vec![vec!["s"]]);
        assert!(g.isolated.is_empty());
    }

    #[test]
    fn isolated_nodes_never_layered() {
        let g = run(&["a", "b", "lonely"], &[("a", "b")]);
        assert_eq!(g.isolated.len(), 1);
        assert_eq!(g.isolated[0].id, "lonely");
        assert!(g.layered_ids().all(|id| id != "lonely"));
        assert_eq!(g.diagnostics.isolated_count, 1);
        // "lonely" has no incoming edge but is not a root.
        assert_eq!(g.diagnostics.root_count, 1);
    }

    #[test]
    fn no_valid_edges_means_all_isolated_and_no_layers() {
        let g = run(&["a", "b"], &[("a", "ghost")]);
        assert!(g.layers.is_empty());
        assert_eq!(g.isolated.len(), 2);
        assert_eq!(g.diagnostics.dropped_edge_count, 1);
        assert_eq!(g.max_depth(), None);
        assert!(g.is_found());
    }

    #[test]
    fn empty_snapshot_reports_empty_status() {
        let g = run(&[], &[("a", "b")]);
        assert_eq!(g.status, GraphStatus::Empty);
        assert!(g.layers.is_empty());
        assert_eq!(g.diagnostics.total_edges, 1);
        assert_eq!(g.diagnostics.valid_connection_count, 0);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let g = run(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert_eq!(g.edges.len(), 2);
        assert_eq!(g.diagnostics.valid_connection_count, 2);
        assert_eq!(layer_ids(&g), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn orphan_recovery_does_not_overwrite_rooted_depths() {
        // Rooted chain r → m, plus rootless loop x ⇄ y that also points at m.
        let g = run(
            &["r", "m", "x", "y"],
            &[("r", "m"), ("x", "y"), ("y", "x"), ("y", "m")],
        );
        // m is reached from y, so it has an incoming edge from the loop; the
        // root pass still gives it depth 1 and recovery leaves it alone.
        assert_eq!(g.depth_of("m"), Some(1));
        assert_eq!(g.depth_of("x"), Some(0));
        assert_eq!(g.depth_of("y"), Some(1));
    }

    #[test]
    fn label_lookup_uses_last_labelled_edge() {
        let snap = Snapshot::new(
            vec![IndicatorRecord::new("a", "IP"), IndicatorRecord::new("b", "IP")],
            vec![
                RawEdge::from(&Edge::new("a", "b").with_label("one")),
                RawEdge::from(&Edge::new("a", "b").with_label("two")),
            ],
        );
        let g = extract_layers(&snap, &EndpointResolver::default()).expect("layers");
        assert_eq!(g.label_of("a", "b"), Some("two"));
        assert_eq!(g.label_of("b", "a"), None);
    }

    #[test]
    fn fingerprint_is_stable_and_edge_sensitive() {
        let a = run(&["a", "b"], &[("a", "b")]);
        let b = run(&["a", "b"], &[("a", "b")]);
        let c = run(&["a", "b"], &[("b", "a")]);
        assert_eq!(a.diagnostics.fingerprint, b.diagnostics.fingerprint);
        assert_ne!(a.diagnostics.fingerprint, c.diagnostics.fingerprint);
        assert!(a.diagnostics.fingerprint.starts_with("blake3:"));
    }

    #[test]
    fn duplicate_ids_fail_fast() {
        let err = extract_layers(&snapshot(&["a", "a"], &[]), &EndpointResolver::default())
            .expect_err("duplicate ids");
        assert!(matches!(err, GraphError::DuplicateIdentifier { .. }));
    }
}
