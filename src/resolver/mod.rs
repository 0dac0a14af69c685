//! Symbol resolution.
//!
//! This module defines the resolver capability consumed by the trace
//! pipeline, the memoizing cache wrapped around it, and the snapshot-backed
//! implementation that ships with the tool.

pub mod cache;
pub mod snapshot;

use crate::utils::error::ResolveError;
use clap::ValueEnum;

// Re-export main types
pub use cache::SymbolCache;
pub use snapshot::SnapshotResolver;

/// How resolved addresses are rendered. Fixed for an entire run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TraceStyle {
    /// `module+0xOFFSET`
    #[value(name = "modoff")]
    ModuleOffset,

    /// `module!symbol+0xOFFSET`, using the nearest known public symbol
    #[value(name = "fullsym")]
    FullSymbol,
}

/// The symbol-resolution capability.
///
/// Implementations hold exclusive state over the loaded snapshot (hence
/// `&mut self`); the pipeline issues one query at a time. The returned
/// string is the full `<symbol>+0x<offset-hex>` rendering for the requested
/// style.
pub trait SymbolResolver {
    fn resolve(&mut self, address: u64, style: TraceStyle) -> Result<String, ResolveError>;
}
