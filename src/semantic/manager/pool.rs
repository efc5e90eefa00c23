//! Shared symbol handles.
//!
//! Re-indexing an unchanged file hands back the handles already in the pool
//! instead of allocating new ones. A sweep drops handles nothing else holds.

use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

use crate::semantic::symbol_table::{Symbol, SymbolId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub created: u64,
    pub reused: u64,
    pub active: usize,
    pub reclaimed: u64,
    #[serde(skip)]
    pub last_cleanup: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct SymbolPool {
    entries: FxHashMap<SymbolId, Arc<Symbol>>,
    stats: PoolStats,
}

impl SymbolPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pooled handle for `symbol`, allocating one if the pool holds none or a
    /// different version.
    pub fn intern(&mut self, symbol: &Symbol) -> Arc<Symbol> {
        if let Some(existing) = self.entries.get(&symbol.id) {
            if **existing == *symbol {
                self.stats.reused += 1;
                return Arc::clone(existing);
            }
        }
        let handle = Arc::new(symbol.clone());
        self.entries.insert(symbol.id.clone(), Arc::clone(&handle));
        self.stats.created += 1;
        handle
    }

    /// Drop handles held only by the pool. Returns how many were reclaimed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, handle| Arc::strong_count(handle) > 1);
        let reclaimed = before - self.entries.len();
        self.stats.reclaimed += reclaimed as u64;
        self.stats.last_cleanup = Some(now);
        if reclaimed > 0 {
            debug!("[POOL] reclaimed {} symbol handle(s)", reclaimed);
        }
        reclaimed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.entries.len(),
            ..self.stats
        }
    }
}
