//! Cycle detection over the indicator adjacency.
//!
//! # Edge Direction
//!
//! Edges run `from → to` exactly as drawn on the canvas. A cyclic component
//! is a strongly connected component with more than one member, or a single
//! member carrying a self-loop.
//!
//! Depths assigned inside a cyclic component are an approximation (the
//! maximum simple-path depth is not tractable in general), so the layering
//! pass reports these components alongside its layers.
//!
//! [`back_edges`] is the other half: a DFS from the roots that marks every
//! edge closing a cycle, so the depth relaxation can run on an acyclic
//! subgraph and always terminate.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::index::{Adjacency, IndicatorIndex};

/// Find every cyclic component.
///
/// Each entry is a sorted list of identifiers; the list of components is
/// itself sorted.
#[must_use]
pub fn find_cycles(index: &IndicatorIndex<'_>, adjacency: &Adjacency) -> Vec<Vec<String>> {
    let graph = to_digraph(adjacency);
    let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|node| graph.find_edge(*node, *node).is_some())
        })
        .map(|component| {
            let mut ids: Vec<String> = component
                .into_iter()
                .map(|idx| index.id(idx.index()).to_string())
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

/// Mirror the adjacency into a petgraph `DiGraph` whose node indices equal
/// index positions.
fn to_digraph(adjacency: &Adjacency) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(adjacency.node_count(), adjacency.edge_count());
    for _ in 0..adjacency.node_count() {
        graph.add_node(());
    }
    for (from, targets) in adjacency.outgoing.iter().enumerate() {
        for &to in targets {
            graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
        }
    }
    graph
}

// ---------------------------------------------------------------------------
// Back edges
// ---------------------------------------------------------------------------

/// DFS colors for back-edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// Currently on the DFS stack.
    Gray,
    /// Fully processed.
    Black,
}

/// Classify `(from, to)` pairs that close a cycle when walking depth-first
/// from `roots` in order.
///
/// Parallel edges share a classification. Nodes not reachable from any
/// root are never visited, so edges among them are not reported.
#[must_use]
pub fn back_edges(adjacency: &Adjacency, roots: &[usize]) -> HashSet<(usize, usize)> {
    let mut color = vec![Color::White; adjacency.node_count()];
    let mut back = HashSet::new();

    for &root in roots {
        if color[root] != Color::White {
            continue;
        }
        // Iterative DFS: (node, next outgoing slot to inspect).
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        color[root] = Color::Gray;

        while let Some(frame) = stack.last_mut() {
            let (node, slot) = *frame;
            if let Some(&next) = adjacency.outgoing[node].get(slot) {
                frame.1 += 1;
                match color[next] {
                    Color::White => {
                        color[next] = Color::Gray;
                        stack.push((next, 0));
                    }
                    Color::Gray => {
                        back.insert((node, next));
                    }
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                stack.pop();
            }
        }
    }

    back
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, IndicatorRecord};

    fn setup(ids: &[&str], edges: &[(&str, &str)]) -> (Vec<IndicatorRecord>, Vec<Edge>) {
        let recs = ids.iter().map(|id| IndicatorRecord::new(*id, "IP")).collect();
        let edges = edges.iter().map(|(a, b)| Edge::new(*a, *b)).collect();
        (recs, edges)
    }

    #[test]
    fn acyclic_graph_has_no_cycles_or_back_edges() {
        let (recs, edges) = setup(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        let index = IndicatorIndex::build(&recs).expect("index");
        let adj = Adjacency::build(&index, &edges);
        assert!(find_cycles(&index, &adj).is_empty());
        assert!(back_edges(&adj, &[0]).is_empty());
    }

    #[test]
    fn reports_two_node_cycle_and_self_loop() {
        let (recs, edges) = setup(&["x", "y", "s", "t"], &[("x", "y"), ("y", "x"), ("s", "s"), ("s", "t")]);
        let index = IndicatorIndex::build(&recs).expect("index");
        let adj = Adjacency::build(&index, &edges);
        assert_eq!(
            find_cycles(&index, &adj),
            vec![vec!["s".to_string()], vec!["x".to_string(), "y".to_string()]]
        );
    }

    #[test]
    fn back_edge_closes_reachable_loop() {
        // r → a → b → a
        let (recs, edges) = setup(&["r", "a", "b"], &[("r", "a"), ("a", "b"), ("b", "a")]);
        let index = IndicatorIndex::build(&recs).expect("index");
        let adj = Adjacency::build(&index, &edges);
        let back = back_edges(&adj, &[0]);
        assert_eq!(back, HashSet::from([(2, 1)]));
    }

    #[test]
    fn cross_edges_are_not_back_edges() {
        // r → a, r → b, b → a (a already finished when b reaches it)
        let (recs, edges) = setup(&["r", "a", "b"], &[("r", "a"), ("r", "b"), ("b", "a")]);
        let index = IndicatorIndex::build(&recs).expect("index");
        let adj = Adjacency::build(&index, &edges);
        assert!(back_edges(&adj, &[0]).is_empty());
    }

    #[test]
    fn deep_chain_does_not_exhaust_the_stack() {
        let ids: Vec<String> = (0..100_000).map(|i| format!("n{i}")).collect();
        let recs: Vec<IndicatorRecord> = ids.iter().map(|id| IndicatorRecord::new(id.as_str(), "IP")).collect();
        let edges: Vec<Edge> = ids.windows(2).map(|w| Edge::new(w[0].as_str(), w[1].as_str())).collect();
        let index = IndicatorIndex::build(&recs).expect("index");
        let adj = Adjacency::build(&index, &edges);
        assert!(find_cycles(&index, &adj).is_empty());
        assert!(back_edges(&adj, &[0]).is_empty());
    }
}
