//! Command handlers.
//!
//! Every handler receives a [`RunContext`] (output mode plus effective
//! configuration) and one snapshot argument.

pub mod analyze;
pub mod hierarchy;
pub mod layers;

use std::fmt::Write as FmtWrite;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use tracing::debug;

use iocgraph_core::config::Config;
use iocgraph_core::{GraphError, IndicatorRecord, Snapshot};

use crate::output::{CliError, OutputMode, render_error};

/// Shared arguments for commands that read one snapshot.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Snapshot JSON file (`{"records": [...], "edges": [...]}`), or `-` for stdin.
    pub snapshot: PathBuf,

    /// Render only type and value per record.
    #[arg(long)]
    pub reduced: bool,
}

/// Per-invocation settings resolved in `main`.
#[derive(Debug)]
pub struct RunContext {
    pub output: OutputMode,
    pub config: Config,
}

impl RunContext {
    pub const fn reduced(&self, args: &SnapshotArgs) -> bool {
        args.reduced || self.config.view.reduced
    }
}

/// Read and parse a snapshot, rendering contract violations in the
/// selected output mode before returning them.
pub fn read_snapshot(path: &Path, output: OutputMode) -> anyhow::Result<Snapshot> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read snapshot from stdin")?;
        buf
    } else {
        match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                let msg = format!("cannot read snapshot {}: {e}", path.display());
                render_error(output, &CliError::new(&msg))?;
                anyhow::bail!("{msg}");
            }
        }
    };

    let snapshot = Snapshot::from_json(&text).map_err(|e| graph_failure(output, e))?;
    debug!(
        records = snapshot.records.len(),
        edges = snapshot.edges.len(),
        path = %path.display(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Render a [`GraphError`] and convert it for propagation.
pub fn graph_failure(output: OutputMode, err: GraphError) -> anyhow::Error {
    // Rendering is best-effort; the original error is what propagates.
    render_error(output, &CliError::from(&err)).ok();
    anyhow::Error::new(err)
}

/// One-line description of a record.
pub fn record_label(record: &IndicatorRecord, reduced: bool) -> String {
    if reduced {
        return format!("{}: {}", record.ioc_type, record.display_value());
    }
    let mut label = format!("{} [{}] {}", record.id, record.ioc_type, record.display_value());
    if let Some(time) = &record.time {
        let _ = write!(label, " @ {time}");
    }
    let _ = write!(label, " ({})", record.role());
    label
}
