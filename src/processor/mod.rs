//! Per-file trace processing.
//!
//! Streams one input trace through the symbol cache and writes the
//! symbolized lines to the job's sink. The input is memory-mapped and
//! walked as a lazy line sequence; each file is scanned exactly once.

use crate::parser::{parse_address, TraceLines};
use crate::resolver::{SymbolCache, SymbolResolver, TraceStyle};
use crate::utils::error::ProcessError;
use crate::utils::humanize::HumanCount;
use log::{info, warn};
use memmap2::Mmap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Knobs for one file's processing pass. Fixed for the whole run.
#[derive(Debug, Clone, Copy)]
pub struct ProcessConfig {
    /// Lines to ignore from the start of the file.
    pub skip: u64,

    /// Ceiling on *symbolized* lines (not raw lines scanned). Zero means
    /// unbounded.
    pub max: u64,

    /// Rendering style passed to every resolution.
    pub style: TraceStyle,

    /// Prefix each output line with `l<index>: `.
    pub line_numbers: bool,
}

/// Counters for one file. The orchestrator folds these into the run totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub lines_symbolized: u64,
    pub lines_failed_parse: u64,
    pub lines_failed_resolve: u64,
}

impl FileStats {
    /// Total failed lines, parse and resolution alike.
    pub fn lines_failed(&self) -> u64 {
        self.lines_failed_parse + self.lines_failed_resolve
    }
}

/// Symbolize `input` into `sink`.
///
/// Per-line failures (unparsable line, unresolvable address) are logged,
/// counted, and skipped; they never fail the file. Errors opening or
/// mapping the input, or writing the sink, are fatal to the file and
/// surface as `ProcessError`.
pub fn process_file<R: SymbolResolver>(
    cache: &mut SymbolCache<R>,
    input: &Path,
    sink: &mut dyn Write,
    config: &ProcessConfig,
) -> Result<FileStats, ProcessError> {
    let mut stats = FileStats::default();

    let file = File::open(input).map_err(|source| ProcessError::OpenInput {
        path: input.to_path_buf(),
        source,
    })?;

    // A zero-length mapping is invalid; an empty trace is simply done.
    let length = file
        .metadata()
        .map_err(|source| ProcessError::OpenInput {
            path: input.to_path_buf(),
            source,
        })?
        .len();
    if length == 0 {
        return Ok(stats);
    }

    let mapping = unsafe { Mmap::map(&file) }.map_err(|source| ProcessError::MapInput {
        path: input.to_path_buf(),
        source,
    })?;

    let display_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    for (index, line) in TraceLines::new(&mapping) {
        if config.max > 0 && stats.lines_symbolized >= config.max {
            info!(
                "{display_name}: hit the maximum of {} symbolized lines, stopping",
                HumanCount(config.max)
            );
            break;
        }

        if index < config.skip {
            continue;
        }

        let text = String::from_utf8_lossy(line);
        let address = match parse_address(&text) {
            Some(address) => address,
            None => {
                warn!("{display_name}:{index}: no address literal in {text:?}, skipping");
                stats.lines_failed_parse += 1;
                continue;
            }
        };

        match cache.resolve(address, config.style) {
            Ok(symbol) => {
                if config.line_numbers {
                    write!(sink, "l{index}: ")?;
                }
                writeln!(sink, "{symbol}")?;
                stats.lines_symbolized += 1;
            }
            Err(error) => {
                warn!(
                    "{display_name}:{index}: symbolization of {address:#x} failed ({error}), \
                     skipping {text:?}"
                );
                stats.lines_failed_resolve += 1;
            }
        }
    }

    sink.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ResolveError;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    /// Resolver that answers `sym_<addr-hex>+0x0` for every even address
    /// and fails the odd ones.
    struct EvenResolver;

    impl SymbolResolver for EvenResolver {
        fn resolve(&mut self, address: u64, _style: TraceStyle) -> Result<String, ResolveError> {
            if address % 2 == 0 {
                Ok(format!("sym_{address:x}+0x0"))
            } else {
                Err(ResolveError::ModuleNotFound(address))
            }
        }
    }

    fn write_trace(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn config() -> ProcessConfig {
        ProcessConfig {
            skip: 0,
            max: 0,
            style: TraceStyle::FullSymbol,
            line_numbers: false,
        }
    }

    fn run(lines: &[&str], config: &ProcessConfig) -> (FileStats, String) {
        let trace = write_trace(lines);
        let mut cache = SymbolCache::new(EvenResolver);
        let mut sink = Vec::new();
        let stats = process_file(&mut cache, trace.path(), &mut sink, config).unwrap();
        (stats, String::from_utf8(sink).unwrap())
    }

    #[test]
    fn test_all_lines_symbolized() {
        let (stats, output) = run(&["0x10", "0x20"], &config());
        assert_eq!(stats.lines_symbolized, 2);
        assert_eq!(stats.lines_failed(), 0);
        assert_eq!(output, "sym_10+0x0\nsym_20+0x0\n");
    }

    #[test]
    fn test_failure_accounting_keeps_order() {
        // The middle line parses but fails resolution; output is exactly
        // the two resolved lines, in input order.
        let (stats, output) = run(&["0x10", "0x3", "0x20"], &config());
        assert_eq!(stats.lines_symbolized, 2);
        assert_eq!(stats.lines_failed(), 1);
        assert_eq!(stats.lines_failed_resolve, 1);
        assert_eq!(output, "sym_10+0x0\nsym_20+0x0\n");
    }

    #[test]
    fn test_unparsable_line_counts_separately() {
        let (stats, output) = run(&["0x10", "garbage", "0x20"], &config());
        assert_eq!(stats.lines_symbolized, 2);
        assert_eq!(stats.lines_failed_parse, 1);
        assert_eq!(stats.lines_failed_resolve, 0);
        assert_eq!(stats.lines_failed(), 1);
        assert_eq!(output, "sym_10+0x0\nsym_20+0x0\n");
    }

    #[test]
    fn test_skip_ignores_leading_lines() {
        let (stats, output) = run(&["0x10", "0x20", "0x30"], &ProcessConfig {
            skip: 2,
            ..config()
        });
        assert_eq!(stats.lines_symbolized, 1);
        assert_eq!(output, "sym_30+0x0\n");
    }

    #[test]
    fn test_max_bounds_symbolized_lines() {
        let (stats, output) = run(&["0x10", "0x20", "0x30"], &ProcessConfig {
            max: 2,
            ..config()
        });
        assert_eq!(stats.lines_symbolized, 2);
        assert_eq!(output, "sym_10+0x0\nsym_20+0x0\n");
    }

    #[test]
    fn test_max_counts_symbolized_not_scanned() {
        // Failed lines don't consume the budget.
        let (stats, _) = run(&["0x3", "0x10", "0x5", "0x20"], &ProcessConfig {
            max: 2,
            ..config()
        });
        assert_eq!(stats.lines_symbolized, 2);
        assert_eq!(stats.lines_failed_resolve, 2);
    }

    #[test]
    fn test_skip_max_window() {
        // N=5, skip=1, max=3 -> min(3, 5-1) = 3 symbolized, starting at
        // line index 1.
        let (stats, output) = run(&["0x10", "0x20", "0x30", "0x40", "0x50"], &ProcessConfig {
            skip: 1,
            max: 3,
            ..config()
        });
        assert_eq!(stats.lines_symbolized, 3);
        assert_eq!(output, "sym_20+0x0\nsym_30+0x0\nsym_40+0x0\n");
    }

    #[test]
    fn test_line_number_markers_use_raw_index() {
        let (_, output) = run(&["0x10", "0x20"], &ProcessConfig {
            skip: 1,
            line_numbers: true,
            ..config()
        });
        assert_eq!(output, "l1: sym_20+0x0\n");
    }

    #[test]
    fn test_empty_file_is_empty_stats() {
        let trace = NamedTempFile::new().unwrap();
        let mut cache = SymbolCache::new(EvenResolver);
        let mut sink = Vec::new();
        let stats = process_file(&mut cache, trace.path(), &mut sink, &config()).unwrap();
        assert_eq!(stats, FileStats::default());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let mut cache = SymbolCache::new(EvenResolver);
        let mut sink = Vec::new();
        let result = process_file(
            &mut cache,
            Path::new("/nonexistent/trace"),
            &mut sink,
            &config(),
        );
        assert!(matches!(result, Err(ProcessError::OpenInput { .. })));
    }
}
