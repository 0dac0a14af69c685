//! Configuration and constants for the CLI.

/// Suffix appended to generated output traces.
///
/// Batch runs also use it to recognize (and skip) their own prior outputs
/// when the input directory doubles as the output directory.
pub const GENERATED_SUFFIX: &str = ".symbolized";

/// Default ceiling on symbolized lines per file. Zero means unbounded;
/// the default is high enough to be "everything" for any realistic trace.
pub const DEFAULT_MAX_LINES: u64 = 20_000_000;
