//! Trace Symbolizer CLI
//!
//! Converts raw numeric addresses in execution traces into human-readable
//! symbolic names, using a resolver seeded from a memory snapshot.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_symbolizer::commands::{
    execute_inspect, execute_symbolize, OnExisting, SymbolizeArgs,
};
use trace_symbolizer::resolver::TraceStyle;
use trace_symbolizer::utils::config::DEFAULT_MAX_LINES;

/// Trace Symbolizer - batch symbolization of execution traces
#[derive(Parser, Debug)]
#[command(name = "trace-symbolizer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Symbolize a trace file or a directory of trace files
    Symbolize {
        /// Input trace file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Snapshot manifest to resolve against
        #[arg(short = 'c', long = "crash-dump")]
        crash_dump: PathBuf,

        /// Output trace file or directory (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip a number of lines at the start of each file
        #[arg(short, long, default_value_t = 0)]
        skip: u64,

        /// Stop after this many symbolized lines per file (0 = unbounded)
        #[arg(short, long, default_value_t = DEFAULT_MAX_LINES)]
        max: u64,

        /// Trace style
        #[arg(long, value_enum, default_value_t = TraceStyle::FullSymbol)]
        style: TraceStyle,

        /// Overwrite existing output files
        #[arg(long)]
        overwrite: bool,

        /// Policy for existing outputs when --overwrite is off
        #[arg(long, value_enum, default_value_t = OnExisting::Skip)]
        on_existing: OnExisting,

        /// Include line numbers in the output
        #[arg(long)]
        line_numbers: bool,
    },

    /// Summarize a snapshot manifest without symbolizing anything
    Inspect {
        /// Snapshot manifest to load
        #[arg(short = 'c', long = "crash-dump")]
        crash_dump: PathBuf,

        /// List every module
        #[arg(long)]
        modules: bool,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging; diagnostics go to stderr so stdout stays clean for
    // console-sink trace output.
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Symbolize {
            input,
            crash_dump,
            output,
            skip,
            max,
            style,
            overwrite,
            on_existing,
            line_numbers,
        } => {
            let args = SymbolizeArgs {
                input,
                snapshot: crash_dump,
                output,
                skip,
                max,
                style,
                overwrite,
                on_existing,
                line_numbers,
            };

            // Per-line failures are counted, not fatal: any completed run
            // exits 0. Configuration and resolver-init errors propagate.
            execute_symbolize(args)?;
        }

        Commands::Inspect {
            crash_dump,
            modules,
        } => {
            execute_inspect(&crash_dump, modules)?;
        }
    }

    Ok(())
}
