//! `iocg layers`: layered placement of a snapshot.
//!
//! Prints every layer (depth 0 holds the roots), the valid edge list, the
//! isolated records, and the extraction diagnostics.

use std::io::{self, Write};

use iocgraph_core::graph::{LayeredGraph, extract_layers};

use super::{RunContext, SnapshotArgs, graph_failure, read_snapshot, record_label};
use crate::output::{pretty_kv, pretty_section, render_mode};

pub fn run_layers(args: &SnapshotArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.snapshot, ctx.output)?;
    let layered = extract_layers(&snapshot, &ctx.config.resolver())
        .map_err(|e| graph_failure(ctx.output, e))?;
    let reduced = ctx.reduced(args);

    render_mode(
        ctx.output,
        &layered,
        |g, w| write_layers_text(g, w),
        |g, w| write_layers_pretty(g, reduced, w),
    )
}

/// Tab-separated rows: `layer`, `edge`, `isolated`, then `stat` lines.
pub fn write_layers_text(g: &LayeredGraph, w: &mut dyn Write) -> io::Result<()> {
    for layer in &g.layers {
        for entry in &layer.entries {
            writeln!(
                w,
                "layer\t{}\t{}\t{}\t{}",
                layer.depth,
                entry.id,
                entry.record.ioc_type,
                entry.record.display_value()
            )?;
        }
    }
    for edge in &g.edges {
        writeln!(
            w,
            "edge\t{}\t{}\t{}",
            edge.from,
            edge.to,
            edge.label.as_deref().unwrap_or("")
        )?;
    }
    for record in &g.isolated {
        writeln!(
            w,
            "isolated\t{}\t{}\t{}",
            record.id,
            record.ioc_type,
            record.display_value()
        )?;
    }
    let d = &g.diagnostics;
    writeln!(w, "stat\tindicators\t{}", d.indicator_count)?;
    writeln!(w, "stat\tvalid_connections\t{}", d.valid_connection_count)?;
    writeln!(w, "stat\tdropped_edges\t{}", d.dropped_edge_count)?;
    writeln!(w, "stat\troots\t{}", d.root_count)?;
    Ok(())
}

pub fn write_layers_pretty(g: &LayeredGraph, reduced: bool, w: &mut dyn Write) -> io::Result<()> {
    if !g.is_found() {
        writeln!(w, "graph not found: snapshot contains no indicator records")?;
        return Ok(());
    }

    pretty_section(w, "Layers")?;
    if g.layers.is_empty() {
        writeln!(w, "  (no connected indicators)")?;
    }
    for layer in &g.layers {
        writeln!(w, "depth {} ({})", layer.depth, layer.entries.len())?;
        for entry in &layer.entries {
            writeln!(w, "  {}", record_label(&entry.record, reduced))?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Edges")?;
    if g.edges.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for edge in &g.edges {
        writeln!(w, "  {edge}")?;
    }

    if !g.isolated.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Isolated")?;
        for record in &g.isolated {
            writeln!(w, "  {}", record_label(record, reduced))?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Diagnostics")?;
    let d = &g.diagnostics;
    pretty_kv(w, "Total nodes", d.total_nodes.to_string())?;
    pretty_kv(w, "Total edges", d.total_edges.to_string())?;
    pretty_kv(w, "Indicators", d.indicator_count.to_string())?;
    pretty_kv(w, "Valid connections", d.valid_connection_count.to_string())?;
    pretty_kv(w, "Dropped edges", d.dropped_edge_count.to_string())?;
    pretty_kv(w, "Roots", d.root_count.to_string())?;
    if d.orphan_seed_count > 0 {
        pretty_kv(w, "Orphan seeds", d.orphan_seed_count.to_string())?;
    }
    for component in &d.cyclic_components {
        pretty_kv(w, "Cycle", component.join(" ⇄ "))?;
    }
    Ok(())
}
