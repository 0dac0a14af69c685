//! Memoizing wrapper around a [`SymbolResolver`].
//!
//! Resolving a symbol is the slow part of the pipeline, and traces tend to
//! contain far fewer *unique* addresses than lines, so memoizing successful
//! lookups is where the throughput comes from. Failed lookups are
//! deliberately not cached: failures are rare, and re-querying them is
//! cheap next to the hit-rate we get on the rest.

use crate::resolver::{SymbolResolver, TraceStyle};
use crate::utils::error::ResolveError;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Per-run address→symbol cache. Owns nothing beyond the map itself.
pub struct SymbolCache<R> {
    resolver: R,
    entries: HashMap<(u64, TraceStyle), String>,
}

impl<R: SymbolResolver> SymbolCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            entries: HashMap::new(),
        }
    }

    /// Resolve `address`, consulting the cache first.
    ///
    /// A prior successful resolution of the same `(address, style)` pair is
    /// returned without touching the underlying resolver, so for any address
    /// that resolves successfully the resolver is invoked at most once per
    /// run. A failed resolution leaves the cache untouched and is retried
    /// the next time the address comes up.
    pub fn resolve(&mut self, address: u64, style: TraceStyle) -> Result<&str, ResolveError> {
        match self.entries.entry((address, style)) {
            Entry::Occupied(hit) => Ok(hit.into_mut().as_str()),
            Entry::Vacant(slot) => {
                let symbol = self.resolver.resolve(address, style)?;
                Ok(slot.insert(symbol).as_str())
            }
        }
    }

    /// Number of distinct addresses resolved so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
