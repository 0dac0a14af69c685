//! Output sinks for symbolized traces.
//!
//! A job writes either to its own output file or to the process-wide
//! console. Generated files carry a fixed suffix so batch re-runs can
//! recognize prior outputs.

use crate::utils::config::GENERATED_SUFFIX;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where one job's symbolized lines go. Derived once per job, before any
/// file is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Console,
}

impl OutputTarget {
    /// Open the sink for writing. File targets are created (truncating any
    /// existing content - the overwrite policy has already been applied by
    /// the time this runs); the console target locks stdout for the job.
    pub fn open(&self) -> io::Result<Box<dyn Write>> {
        match self {
            OutputTarget::File(path) => {
                let file = File::create(path)?;
                Ok(Box::new(BufWriter::new(file)))
            }
            OutputTarget::Console => Ok(Box::new(io::stdout().lock())),
        }
    }

    /// Whether the target already exists on disk. The console never does.
    pub fn exists(&self) -> bool {
        match self {
            OutputTarget::File(path) => path.exists(),
            OutputTarget::Console => false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputTarget::File(path) => Some(path),
            OutputTarget::Console => None,
        }
    }
}

/// Output file name generated for `input` inside an output directory:
/// the input's file name plus the generated suffix.
pub fn generated_name(input: &Path) -> String {
    let stem = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}{GENERATED_SUFFIX}")
}

/// Whether `path` names one of our own generated outputs.
pub fn is_generated(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(GENERATED_SUFFIX))
        .unwrap_or(false)
}
