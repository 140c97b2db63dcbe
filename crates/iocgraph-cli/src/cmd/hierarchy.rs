//! `iocg hierarchy`: role-aware parent/child groups.
//!
//! Each group is drawn as an ASCII tree headed by its root parent. Parent
//! records pointed at by a child record are listed afterwards as
//! directional errors.

use std::io::{self, Write};

use iocgraph_core::graph::index::IndicatorIndex;
use iocgraph_core::graph::{Hierarchy, HierarchyChild, ParentChildGroup, build_hierarchy};
use iocgraph_core::resolve::resolve_edges;

use super::{RunContext, SnapshotArgs, graph_failure, read_snapshot, record_label};
use crate::output::{pretty_section, render_mode};

pub fn run_hierarchy(args: &SnapshotArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.snapshot, ctx.output)?;
    let index =
        IndicatorIndex::build(&snapshot.records).map_err(|e| graph_failure(ctx.output, e))?;
    let edges = resolve_edges(&snapshot.edges, &ctx.config.resolver(), |id| {
        index.contains(id)
    });

    let hierarchy = build_hierarchy(&snapshot.records, &edges.valid)
        .map_err(|e| graph_failure(ctx.output, e))?;
    let reduced = ctx.reduced(args);

    render_mode(
        ctx.output,
        &hierarchy,
        |h, w| write_hierarchy_text(h, w),
        |h, w| write_hierarchy_pretty(h, reduced, w),
    )
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Tab-separated rows: `group <id>`, `child <level> <parent> <id>`,
/// `directional_error <id>`.
pub fn write_hierarchy_text(h: &Hierarchy, w: &mut dyn Write) -> io::Result<()> {
    for group in &h.groups {
        writeln!(w, "group\t{}", group.parent.id)?;
        write_children_text(group, w)?;
    }
    for record in &h.directional_errors {
        writeln!(w, "directional_error\t{}", record.id)?;
    }
    Ok(())
}

fn write_children_text(group: &ParentChildGroup, w: &mut dyn Write) -> io::Result<()> {
    // (remaining siblings, their parent, their level)
    let mut stack = vec![(group.children.iter(), group, 1usize)];
    while let Some((siblings, parent, level)) = stack.last_mut() {
        let (parent, level) = (*parent, *level);
        let Some(child) = siblings.next() else {
            stack.pop();
            continue;
        };
        writeln!(w, "child\t{level}\t{}\t{}", parent.parent.id, child.record().id)?;
        if let HierarchyChild::Group(nested) = child {
            stack.push((nested.children.iter(), nested, level + 1));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pretty
// ---------------------------------------------------------------------------

pub fn write_hierarchy_pretty(h: &Hierarchy, reduced: bool, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Groups")?;
    if h.groups.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for group in &h.groups {
        writeln!(w, "{}", record_label(&group.parent, reduced))?;
        write_tree_nodes(&group.children, reduced, w)?;
    }

    if h.has_directional_errors() {
        writeln!(w)?;
        pretty_section(w, "Directional errors (child → parent)")?;
        for record in &h.directional_errors {
            writeln!(w, "  ⚠ {}", record_label(record, reduced))?;
        }
    }
    Ok(())
}

fn write_tree_nodes(children: &[HierarchyChild], reduced: bool, w: &mut dyn Write) -> io::Result<()> {
    let mut prefix = String::new();
    // (remaining siblings, prefix length for their rows)
    let mut stack = vec![(children.iter(), 0usize)];
    while let Some((siblings, prefix_len)) = stack.last_mut() {
        let base = *prefix_len;
        let Some(child) = siblings.next() else {
            stack.pop();
            continue;
        };
        let is_last = siblings.len() == 0;
        prefix.truncate(base);
        let connector = if is_last { "└── " } else { "├── " };
        writeln!(w, "{prefix}{connector}{}", record_label(child.record(), reduced))?;

        if let HierarchyChild::Group(nested) = child {
            prefix.push_str(if is_last { "    " } else { "│   " });
            stack.push((nested.children.iter(), prefix.len()));
        }
    }
    Ok(())
}
