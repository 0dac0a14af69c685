//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a snapshot manifest.
///
/// All of these are fatal to the run: a resolver that failed to initialize
/// must never answer queries.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid address literal {literal:?} in snapshot")]
    BadAddress { literal: String },

    #[error("module {0:?} has zero size")]
    EmptyModule(String),

    #[error("snapshot contains no modules")]
    NoModules,
}

/// A single address failed to resolve.
///
/// Recovered per line: the processor logs it, counts it, and moves on.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no module covers address {0:#x}")]
    ModuleNotFound(u64),
}

/// Errors that are fatal to one input file (and, per batch policy,
/// terminate the remaining job list).
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("could not open input {path}: {source}")]
    OpenInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not map input {path}: {source}")]
    MapInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not create output {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed writing output: {0}")]
    Write(#[from] std::io::Error),
}
