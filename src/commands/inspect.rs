//! Inspect command implementation.
//!
//! Loads a snapshot manifest and prints what the resolver would be working
//! with - a cheap way to sanity-check a snapshot before pointing a long
//! batch run at it.

use crate::resolver::SnapshotResolver;
use anyhow::{Context, Result};
use std::path::Path;

/// Execute the inspect command
///
/// **Public** - main entry point called from main.rs
pub fn execute_inspect(snapshot: &Path, show_modules: bool) -> Result<()> {
    let resolver = SnapshotResolver::load(snapshot)
        .with_context(|| format!("failed to load snapshot {}", snapshot.display()))?;

    println!("Snapshot: {}", snapshot.display());
    println!("  Modules: {}", resolver.module_count());
    println!("  Symbols: {}", resolver.symbol_count());
    if let Some((low, high)) = resolver.address_span() {
        println!("  Address space: {low:#x}..{high:#x}");
    }

    if show_modules {
        println!();
        for (name, base, size, symbols) in resolver.module_summaries() {
            println!("  {base:#018x} +{size:#010x}  {name} ({symbols} symbols)");
        }
    }

    Ok(())
}
