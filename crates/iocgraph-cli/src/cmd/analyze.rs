//! `iocg analyze`: layers and hierarchy in one pass.

use std::io::{self, Write};

use iocgraph_core::graph::{Analysis, analyze};

use super::hierarchy::{write_hierarchy_pretty, write_hierarchy_text};
use super::layers::{write_layers_pretty, write_layers_text};
use super::{RunContext, SnapshotArgs, graph_failure, read_snapshot};
use crate::output::{pretty_rule, render_mode};

pub fn run_analyze(args: &SnapshotArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.snapshot, ctx.output)?;
    let analysis =
        analyze(&snapshot, &ctx.config.resolver()).map_err(|e| graph_failure(ctx.output, e))?;
    let reduced = ctx.reduced(args);

    render_mode(
        ctx.output,
        &analysis,
        |a, w| write_analysis_text(a, w),
        |a, w| write_analysis_pretty(a, reduced, w),
    )
}

fn write_analysis_text(a: &Analysis, w: &mut dyn Write) -> io::Result<()> {
    write_layers_text(&a.layers, w)?;
    write_hierarchy_text(&a.hierarchy, w)
}

fn write_analysis_pretty(a: &Analysis, reduced: bool, w: &mut dyn Write) -> io::Result<()> {
    write_layers_pretty(&a.layers, reduced, w)?;
    if !a.layers.is_found() {
        return Ok(());
    }
    writeln!(w)?;
    pretty_rule(w)?;
    writeln!(w)?;
    write_hierarchy_pretty(&a.hierarchy, reduced, w)
}
