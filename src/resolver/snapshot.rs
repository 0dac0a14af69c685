//! Snapshot-backed symbol resolution.
//!
//! The snapshot manifest is a JSON description of the modules captured from
//! a process or kernel address space, each with its load range and
//! (optionally) its public symbols:
//!
//! ```json
//! {
//!   "modules": [
//!     { "name": "ntoskrnl.exe",
//!       "base": "0xfffff80312800000",
//!       "size": "0xa8e000",
//!       "symbols": [ { "name": "NtCreateFile", "address": "0x3f2a10" } ] }
//!   ]
//! }
//! ```
//!
//! Addresses are hex strings (JSON numbers above 2^53 don't survive every
//! producer). Symbol addresses are offsets relative to their module's base.
//! Loading is strict: a manifest that doesn't parse cleanly never answers
//! queries.

use crate::resolver::{SymbolResolver, TraceStyle};
use crate::utils::error::{ResolveError, SnapshotError};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// On-disk manifest schema, addresses still raw strings.
#[derive(Debug, Deserialize)]
struct RawSnapshot {
    modules: Vec<RawModule>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    name: String,
    base: String,
    size: String,
    #[serde(default)]
    symbols: Vec<RawSymbol>,
}

#[derive(Debug, Deserialize)]
struct RawSymbol {
    name: String,
    address: String,
}

/// One loaded module: name, extent, and its symbols keyed by offset.
#[derive(Debug)]
struct Module {
    name: String,
    size: u64,
    /// offset from module base -> symbol name
    symbols: BTreeMap<u64, String>,
}

/// Symbol resolver seeded from a snapshot manifest.
///
/// Modules are keyed by base address in an ordered map so that locating the
/// module covering an address is a predecessor query.
#[derive(Debug)]
pub struct SnapshotResolver {
    modules: BTreeMap<u64, Module>,
}

impl SnapshotResolver {
    /// Load and validate a snapshot manifest.
    ///
    /// # Errors
    /// * `SnapshotError::Io` - manifest unreadable
    /// * `SnapshotError::Json` - not valid manifest JSON
    /// * `SnapshotError::BadAddress` - an address literal didn't parse
    /// * `SnapshotError::EmptyModule` - a module with zero size
    /// * `SnapshotError::NoModules` - nothing to resolve against
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let raw: RawSnapshot = serde_json::from_reader(BufReader::new(file))?;

        let mut modules = BTreeMap::new();
        for module in raw.modules {
            let base = parse_literal(&module.base)?;
            let size = parse_literal(&module.size)?;
            if size == 0 {
                return Err(SnapshotError::EmptyModule(module.name));
            }

            let mut symbols = BTreeMap::new();
            for symbol in module.symbols {
                let offset = parse_literal(&symbol.address)?;
                symbols.insert(offset, symbol.name);
            }

            debug!(
                "loaded module {} @ {:#x}..{:#x} ({} symbols)",
                module.name,
                base,
                base + size,
                symbols.len()
            );

            modules.insert(
                base,
                Module {
                    name: module.name,
                    size,
                    symbols,
                },
            );
        }

        if modules.is_empty() {
            return Err(SnapshotError::NoModules);
        }

        Ok(Self { modules })
    }

    /// The module whose `[base, base+size)` range covers `address`, if any.
    fn module_for(&self, address: u64) -> Option<(u64, &Module)> {
        // Largest base <= address, then a containment check against the
        // module's extent.
        let (&base, module) = self.modules.range(..=address).next_back()?;
        if address - base < module.size {
            Some((base, module))
        } else {
            None
        }
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.modules.values().map(|m| m.symbols.len()).sum()
    }

    /// `(name, base, size, symbol count)` per module, ordered by base.
    pub fn module_summaries(&self) -> impl Iterator<Item = (&str, u64, u64, usize)> {
        self.modules
            .iter()
            .map(|(&base, m)| (m.name.as_str(), base, m.size, m.symbols.len()))
    }

    /// Lowest and one-past-highest mapped address across all modules.
    pub fn address_span(&self) -> Option<(u64, u64)> {
        let first = self.modules.iter().next()?;
        let last = self.modules.iter().next_back()?;
        Some((*first.0, last.0 + last.1.size))
    }
}

impl SymbolResolver for SnapshotResolver {
    fn resolve(&mut self, address: u64, style: TraceStyle) -> Result<String, ResolveError> {
        let (base, module) = self
            .module_for(address)
            .ok_or(ResolveError::ModuleNotFound(address))?;
        let offset = address - base;

        match style {
            TraceStyle::ModuleOffset => Ok(format!("{}+{:#x}", module.name, offset)),
            TraceStyle::FullSymbol => {
                // Nearest symbol at or below the offset; modules without a
                // covering symbol degrade to the module+offset rendering.
                match module.symbols.range(..=offset).next_back() {
                    Some((&sym_offset, name)) => Ok(format!(
                        "{}!{}+{:#x}",
                        module.name,
                        name,
                        offset - sym_offset
                    )),
                    None => Ok(format!("{}+{:#x}", module.name, offset)),
                }
            }
        }
    }
}

/// Strict hex-literal parsing for manifest fields: optional `0x` marker,
/// nothing but hex digits after it.
fn parse_literal(literal: &str) -> Result<u64, SnapshotError> {
    let digits = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
        .unwrap_or(literal);

    u64::from_str_radix(digits, 16).map_err(|_| SnapshotError::BadAddress {
        literal: literal.to_string(),
    })
}
