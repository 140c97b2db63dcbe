#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use iocgraph_core::ErrorCode;
use iocgraph_core::config::load_config;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "iocg: layered and hierarchical views of indicator graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (overrides $IOCGRAPH_CONFIG and the user config).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Place indicators into maximum-depth layers",
        long_about = "Place every connected indicator at the length of the longest path \
                      reaching it from a root, and list isolated indicators separately.",
        after_help = "EXAMPLES:\n    # Layer a snapshot file\n    iocg layers snapshot.json\n\n    # Read from stdin, machine-readable\n    cat snapshot.json | iocg layers - --format json"
    )]
    Layers(cmd::SnapshotArgs),

    #[command(
        about = "Group indicators under their parent records",
        long_about = "Build nested parent/child groups from role flags and report parent \
                      records that a child record points at.",
        after_help = "EXAMPLES:\n    # Show groups as trees\n    iocg hierarchy snapshot.json\n\n    # Type and value only\n    iocg hierarchy snapshot.json --reduced"
    )]
    Hierarchy(cmd::SnapshotArgs),

    #[command(
        about = "Run layering and grouping together",
        after_help = "EXAMPLES:\n    # Both views as one JSON document\n    iocg analyze snapshot.json --json"
    )]
    Analyze(cmd::SnapshotArgs),
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_env("IOCG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "iocgraph=debug,info"
        } else {
            "iocgraph=info,warn"
        })
    });

    let format = env::var("IOCG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let output = cli.output_mode();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let code = ErrorCode::ConfigParseError;
            let err = CliError {
                message: format!("{e:#}"),
                suggestion: code.hint().map(str::to_string),
                error_code: Some(code.code().to_string()),
            };
            render_error(output, &err)?;
            anyhow::bail!("{}", err.message);
        }
    };

    init_tracing(cli.verbose || config.view.debug);
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?output, "output mode resolved");

    let ctx = cmd::RunContext { output, config };

    match cli.command {
        Commands::Layers(ref args) => cmd::layers::run_layers(args, &ctx),
        Commands::Hierarchy(ref args) => cmd::hierarchy::run_hierarchy(args, &ctx),
        Commands::Analyze(ref args) => cmd::analyze::run_analyze(args, &ctx),
    }
}
