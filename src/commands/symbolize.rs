//! Symbolize command implementation.
//!
//! The symbolize command:
//! 1. Validates the input/output/snapshot combination
//! 2. Initializes the snapshot resolver and wraps it in the cache
//! 3. Plans one job per input file, deriving every output path up front
//! 4. Drives the per-file processor sequentially under the overwrite policy
//! 5. Reports run-wide stats

use crate::output::{generated_name, is_generated, OutputTarget};
use crate::processor::{process_file, FileStats, ProcessConfig};
use crate::resolver::{SnapshotResolver, SymbolCache, TraceStyle};
use crate::utils::error::ProcessError;
use crate::utils::humanize::{HumanCount, HumanDuration};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What to do when a job's output file already exists and `--overwrite`
/// is off. Both behaviors exist in the wild; the flag makes the choice
/// explicit instead of baking one in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnExisting {
    /// Skip that job and continue with the rest of the batch.
    Skip,
    /// Terminate the remaining job list.
    Abort,
}

/// Arguments for the symbolize command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct SymbolizeArgs {
    /// Input trace file, or a directory of them
    pub input: PathBuf,

    /// Snapshot manifest the resolver is seeded from
    pub snapshot: PathBuf,

    /// Output file or directory; None writes to stdout
    pub output: Option<PathBuf>,

    /// Lines to ignore from the start of each file
    pub skip: u64,

    /// Ceiling on symbolized lines per file (0 = unbounded)
    pub max: u64,

    /// Rendering style for the whole run
    pub style: TraceStyle,

    /// Replace existing output files
    pub overwrite: bool,

    /// Policy when an output exists and overwrite is off
    pub on_existing: OnExisting,

    /// Prefix output lines with `l<index>: `
    pub line_numbers: bool,
}

/// Run-wide counters, folded from each file's stats and read once at the
/// end for reporting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub lines_symbolized: u64,
    pub lines_failed_parse: u64,
    pub lines_failed_resolve: u64,
    pub files_processed: u64,
    pub files_skipped: u64,
}

impl RunStats {
    pub fn lines_failed(&self) -> u64 {
        self.lines_failed_parse + self.lines_failed_resolve
    }

    fn absorb(&mut self, file: &FileStats) {
        self.lines_symbolized += file.lines_symbolized;
        self.lines_failed_parse += file.lines_failed_parse;
        self.lines_failed_resolve += file.lines_failed_resolve;
    }
}

/// One unit of batch work: an input trace and where its output goes.
/// Immutable once planned.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileJob {
    input: PathBuf,
    target: OutputTarget,
}

/// Validate the argument combination before any processing starts
///
/// **Public** - called by execute_symbolize, and callable early for
/// fail-fast CLI behavior
///
/// # Errors
/// * Input or snapshot path missing
/// * Directory input combined with a non-directory output
pub fn validate_args(args: &SymbolizeArgs) -> Result<()> {
    if !args.input.exists() {
        bail!("input {} does not exist", args.input.display());
    }

    if !args.snapshot.is_file() {
        bail!("snapshot {} is not a file", args.snapshot.display());
    }

    if args.input.is_dir() {
        // A directory of inputs fans out to one output per file, so the
        // output can only be a directory (or the console).
        if let Some(output) = &args.output {
            if !output.is_dir() {
                bail!(
                    "input {} is a directory, so the output must be a directory too \
                     (or omitted for stdout), got {}",
                    args.input.display(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

/// Execute the symbolize command
///
/// **Public** - main entry point called from main.rs
///
/// Returns the run stats on any completed run, including runs where
/// individual lines failed to resolve or the batch stopped early on a
/// file-level I/O error. Configuration and resolver-initialization
/// failures are the only error returns.
pub fn execute_symbolize(args: SymbolizeArgs) -> Result<RunStats> {
    validate_args(&args)?;

    let started = Instant::now();

    // Initialization failure is fatal before any file is touched.
    info!("loading snapshot {}", args.snapshot.display());
    let resolver = SnapshotResolver::load(&args.snapshot)
        .with_context(|| format!("failed to initialize resolver from {}", args.snapshot.display()))?;
    info!(
        "snapshot loaded: {} modules, {} symbols",
        resolver.module_count(),
        resolver.symbol_count()
    );
    let mut cache = SymbolCache::new(resolver);

    let jobs = plan_jobs(&args.input, args.output.as_deref())?;
    let total = jobs.len();

    let config = ProcessConfig {
        skip: args.skip,
        max: args.max,
        style: args.style,
        line_numbers: args.line_numbers,
    };

    let mut stats = RunStats::default();
    info!("starting to process {total} file(s)");
    for job in &jobs {
        // Overwrite policy, applied immediately before the job runs.
        if job.target.exists() && !args.overwrite {
            match args.on_existing {
                OnExisting::Skip => {
                    info!(
                        "output {} already exists, skipping {}",
                        job.target.path().unwrap_or(Path::new("")).display(),
                        job.input.display()
                    );
                    stats.files_skipped += 1;
                    continue;
                }
                OnExisting::Abort => {
                    warn!(
                        "output {} already exists, aborting the batch",
                        job.target.path().unwrap_or(Path::new("")).display()
                    );
                    break;
                }
            }
        }
        if args.overwrite && job.target.exists() {
            info!(
                "output {} will be overwritten",
                job.target.path().unwrap_or(Path::new("")).display()
            );
        }

        let outcome = job
            .target
            .open()
            .map_err(|source| ProcessError::CreateOutput {
                path: job.target.path().unwrap_or(Path::new("")).to_path_buf(),
                source,
            })
            .and_then(|mut sink| process_file(&mut cache, &job.input, sink.as_mut(), &config));

        // A file-level failure terminates the remaining job list; the run
        // still reports what it finished.
        match outcome {
            Ok(file_stats) => {
                stats.absorb(&file_stats);
                stats.files_processed += 1;
                info!(
                    "[{} / {}] {} done",
                    stats.files_processed,
                    total,
                    job.input.display()
                );
            }
            Err(err) => {
                error!("processing {} failed: {err}, stopping", job.input.display());
                break;
            }
        }
    }

    info!(
        "completed symbolization of {} addresses ({} failed) in {} across {} files",
        HumanCount(stats.lines_symbolized),
        HumanCount(stats.lines_failed()),
        HumanDuration(started.elapsed()),
        HumanCount(stats.files_processed)
    );
    if stats.files_skipped > 0 {
        info!("{} file(s) skipped over existing outputs", stats.files_skipped);
    }

    Ok(stats)
}

/// Build the job list: enumerate the inputs and derive every output target,
/// once, before anything is processed.
fn plan_jobs(input: &Path, output: Option<&Path>) -> Result<Vec<FileJob>> {
    let inputs = if input.is_dir() {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(input)
            .with_context(|| format!("failed to enumerate {}", input.display()))?
        {
            let path = entry
                .with_context(|| format!("failed to enumerate {}", input.display()))?
                .path();
            // Re-running against a directory that already holds prior
            // outputs must not reprocess them.
            if is_generated(&path) {
                info!("skipping generated file {}", path.display());
                continue;
            }
            if path.is_file() {
                entries.push(path);
            }
        }
        // Deterministic batch order (read_dir order is platform-defined).
        entries.sort();
        entries
    } else {
        vec![input.to_path_buf()]
    };

    let jobs = inputs
        .into_iter()
        .map(|input| {
            let target = match output {
                Some(out) if out.is_dir() => OutputTarget::File(out.join(generated_name(&input))),
                Some(out) => OutputTarget::File(out.to_path_buf()),
                None => OutputTarget::Console,
            };
            FileJob { input, target }
        })
        .collect();

    Ok(jobs)
}
