//! Parent/child grouping of indicators.
//!
//! The extraction layer tags every record with an advisory role. This
//! module turns the edge set into nested groups that honor those roles:
//!
//! - Which records head a top-level group?
//! - Which records nest under them, and how deep?
//! - Which parent-role records are pointed at by a child-role record?
//!
//! # Terminology
//!
//! - **Root parent**: a record with at least one outgoing edge that is
//!   either parent-role or has no incoming edge. A parent-role record with
//!   outgoing edges is always a root; incoming edges never nest it.
//! - **Leaf**: a nested child with no outgoing edge.
//! - **Directional error**: a parent-role record with an incoming edge from a
//!   child-role record. Only the child → parent direction is checked;
//!   parent → parent edges are left alone.
//!
//! # Cycle prevention
//!
//! Descent tracks the records on the current path. A target already on the
//! path is skipped, so a record never nests inside itself, while the same
//! record may still appear in independent branches.
//!
//! # Ordering
//!
//! Children at every level and the top-level groups are ordered by
//! [`crate::timestamp::sort_by_time`]: oldest first, ties and unparsable
//! times in input order, unparsable after parsable.

#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::index::IndicatorIndex;
use crate::error::GraphError;
use crate::model::{Edge, IndicatorRecord};
use crate::timestamp::sort_by_time;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One entry under a group's parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyChild {
    Leaf(IndicatorRecord),
    Group(ParentChildGroup),
}

impl HierarchyChild {
    /// The record this entry stands for: the leaf itself or the nested
    /// group's parent.
    pub fn record(&self) -> &IndicatorRecord {
        match self {
            Self::Leaf(record) => record,
            Self::Group(group) => &group.parent,
        }
    }

    pub fn as_group(&self) -> Option<&ParentChildGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }
}

/// A parent record and its ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentChildGroup {
    pub parent: IndicatorRecord,
    pub children: Vec<HierarchyChild>,
}

impl ParentChildGroup {
    /// Identifiers of every nested record, depth-first, excluding the
    /// group's own parent.
    pub fn descendant_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self.children.iter()];
        while let Some(level) = stack.last_mut() {
            let Some(child) = level.next() else {
                stack.pop();
                continue;
            };
            out.push(child.record().id.as_str());
            if let HierarchyChild::Group(group) = child {
                stack.push(group.children.iter());
            }
        }
        out
    }

    /// Number of nested levels below this group's parent (0 for a group
    /// with only leaves or no children).
    pub fn nesting_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Self, usize)> = vec![(self, 0)];
        while let Some((group, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(
                group
                    .children
                    .iter()
                    .filter_map(HierarchyChild::as_group)
                    .map(|g| (g, depth + 1)),
            );
        }
        deepest
    }
}

// Nesting can be as deep as the longest child chain; unlink it level by
// level instead of recursing through the derived drop.
impl Drop for ParentChildGroup {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let HierarchyChild::Group(mut group) = child {
                pending.append(&mut group.children);
            }
        }
    }
}

/// Output of [`build_hierarchy`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    pub groups: Vec<ParentChildGroup>,
    pub directional_errors: Vec<IndicatorRecord>,
}

impl Hierarchy {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn has_directional_errors(&self) -> bool {
        !self.directional_errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Role graph
// ---------------------------------------------------------------------------

/// Set-semantics adjacency: parallel edges collapse, insertion order kept.
struct RoleGraph<'a> {
    index: IndicatorIndex<'a>,
    outgoing: Vec<Vec<usize>>,
    incoming_from: Vec<Vec<usize>>,
}

/// One open group during descent.
struct Frame {
    position: usize,
    /// Next slot of `outgoing[position]` to inspect.
    next: usize,
    children: Vec<HierarchyChild>,
}

impl Frame {
    fn open(position: usize) -> Self {
        Self {
            position,
            next: 0,
            children: Vec::new(),
        }
    }
}

impl<'a> RoleGraph<'a> {
    fn build(records: &'a [IndicatorRecord], edges: &[Edge]) -> Result<Self, GraphError> {
        let index = IndicatorIndex::build(records)?;
        let n = index.len();
        let mut outgoing = vec![Vec::new(); n];
        let mut incoming_from = vec![Vec::new(); n];
        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(edges.len());

        for edge in edges {
            let (Some(from), Some(to)) = (index.position(&edge.from), index.position(&edge.to))
            else {
                continue;
            };
            if seen.insert((from, to)) {
                outgoing[from].push(to);
                incoming_from[to].push(from);
            }
        }

        Ok(Self {
            index,
            outgoing,
            incoming_from,
        })
    }

    fn record(&self, position: usize) -> &'a IndicatorRecord {
        self.index.record(position)
    }

    fn has_incoming(&self, position: usize) -> bool {
        !self.incoming_from[position].is_empty()
    }

    fn is_root_parent(&self, position: usize) -> bool {
        !self.outgoing[position].is_empty()
            && (self.record(position).is_parent() || !self.has_incoming(position))
    }

    /// Build the nested group headed by `root` with an explicit frame stack.
    ///
    /// `path` holds exactly the positions of the open frames.
    fn descend(&self, root: usize) -> ParentChildGroup {
        let mut path = HashSet::from([root]);
        let mut stack = vec![Frame::open(root)];
        let mut finished = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(&target) = self.outgoing[frame.position].get(frame.next) {
                frame.next += 1;
                if path.contains(&target) {
                    continue;
                }
                let record = self.record(target);
                if record.is_parent() {
                    continue;
                }
                if self.outgoing[target].is_empty() {
                    frame.children.push(HierarchyChild::Leaf(record.clone()));
                } else {
                    path.insert(target);
                    stack.push(Frame::open(target));
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            path.remove(&done.position);
            let group = self.close(done);
            match stack.last_mut() {
                Some(parent) => parent.children.push(HierarchyChild::Group(group)),
                None => finished = Some(group),
            }
        }

        finished.unwrap_or_else(|| ParentChildGroup {
            parent: self.record(root).clone(),
            children: Vec::new(),
        })
    }

    fn close(&self, frame: Frame) -> ParentChildGroup {
        let mut children = frame.children;
        sort_by_time(&mut children, |c| c.record().time.as_deref());
        ParentChildGroup {
            parent: self.record(frame.position).clone(),
            children,
        }
    }

    fn directional_errors(&self) -> Vec<IndicatorRecord> {
        let mut flagged: Vec<IndicatorRecord> = (0..self.index.len())
            .filter(|&p| self.record(p).is_parent())
            .filter(|&p| {
                self.incoming_from[p]
                    .iter()
                    .any(|&src| !self.record(src).is_parent())
            })
            .map(|p| self.record(p).clone())
            .collect();
        sort_by_time(&mut flagged, |r| r.time.as_deref());
        flagged
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Build role-aware parent/child groups from normalized edges.
///
/// Edges naming an unknown identifier are ignored.
///
/// # Errors
///
/// Returns [`GraphError::EmptyIdentifier`] or
/// [`GraphError::DuplicateIdentifier`] when the record set breaks the
/// unique-id contract.
#[instrument(skip_all, fields(records = records.len(), edges = edges.len()))]
pub fn build_hierarchy(
    records: &[IndicatorRecord],
    edges: &[Edge],
) -> Result<Hierarchy, GraphError> {
    let graph = RoleGraph::build(records, edges)?;

    let mut groups: Vec<ParentChildGroup> = (0..graph.index.len())
        .filter(|&p| graph.is_root_parent(p))
        .map(|p| graph.descend(p))
        .collect();
    sort_by_time(&mut groups, |g| g.parent.time.as_deref());

    let directional_errors = graph.directional_errors();

    debug!(
        groups = groups.len(),
        directional_errors = directional_errors.len(),
        "hierarchy built"
    );

    Ok(Hierarchy {
        groups,
        directional_errors,
    })
}
