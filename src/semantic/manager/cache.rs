//! Time-to-live caches in front of graph queries.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

use crate::semantic::graphs::{Reference, ReferenceType};
use crate::semantic::symbol_table::{Symbol, SymbolId};

use super::patterns::RelationshipPattern;
use super::stats::ManagerStats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped for age or size
    pub evictions: u64,
    /// Entries dropped by graph mutations
    pub invalidations: u64,
    pub entries: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Insertion-ordered cache with a per-entry TTL and an entry cap.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: IndexMap<K, CacheEntry<V>>,
    ttl: Duration,
    max_entries: usize,
    stats: CacheStats,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Look up `key` as of `now`; an expired entry is evicted and misses.
    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.inserted_at) >= self.ttl,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };
        if expired {
            self.entries.shift_remove(key);
            self.stats.evictions += 1;
            self.stats.misses += 1;
            return None;
        }
        self.stats.hits += 1;
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.shift_remove(&key);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
        while self.entries.len() > self.max_entries {
            self.entries.shift_remove_index(0);
            self.stats.evictions += 1;
        }
    }

    /// Drop every entry whose key matches; returns how many were dropped.
    pub fn invalidate_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        let dropped = before - self.entries.len();
        self.stats.invalidations += dropped as u64;
        dropped
    }

    pub fn clear(&mut self) {
        self.stats.invalidations += self.entries.len() as u64;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }
}

/// Direction of a relationship query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Key of the relationship cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
    pub symbol: SymbolId,
    pub direction: Direction,
    pub filter: Option<ReferenceType>,
}

/// The manager's caches, one per query family.
#[derive(Debug, Clone)]
pub struct ManagerCaches {
    /// lowercase name → symbols
    pub by_name: TtlCache<String, Vec<Arc<Symbol>>>,
    /// lowercase FQN → symbol (misses are cached too)
    pub by_fqn: TtlCache<String, Option<Arc<Symbol>>>,
    pub by_file: TtlCache<SmolStr, Vec<Arc<Symbol>>>,
    pub relationships: TtlCache<RelationshipKey, Vec<Reference>>,
    pub patterns: TtlCache<String, Vec<RelationshipPattern>>,
    pub statistics: TtlCache<(), ManagerStats>,
}

impl ManagerCaches {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            by_name: TtlCache::new(ttl, max_entries),
            by_fqn: TtlCache::new(ttl, max_entries),
            by_file: TtlCache::new(ttl, max_entries),
            relationships: TtlCache::new(ttl, max_entries),
            patterns: TtlCache::new(ttl, max_entries),
            statistics: TtlCache::new(ttl, 1),
        }
    }

    /// Drop entries that a mutation touching `names`, `file` and `symbols` made stale.
    ///
    /// `names` are lowercase. Pattern and statistics entries summarise the whole
    /// graph and are always dropped.
    pub fn invalidate(&mut self, names: &[String], file: Option<&str>, symbols: &[SymbolId]) {
        self.by_name.invalidate_where(|key| names.contains(key));
        self.by_fqn.invalidate_where(|key| {
            let last = key.rsplit('.').next().unwrap_or(key);
            names.iter().any(|name| name == last || name == key)
        });
        if let Some(file) = file {
            self.by_file.invalidate_where(|key| key == file);
        }
        self.relationships.invalidate_where(|key| {
            symbols.contains(&key.symbol) || file.is_some_and(|file| key.symbol.file_uri() == file)
        });
        self.patterns.clear();
        self.statistics.clear();
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_fqn.clear();
        self.by_file.clear();
        self.relationships.clear();
        self.patterns.clear();
        self.statistics.clear();
    }

    /// Per-cache counters, in a stable order.
    pub fn report(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            ("name", self.by_name.stats()),
            ("fqn", self.by_fqn.stats()),
            ("file", self.by_file.stats()),
            ("relationship", self.relationships.stats()),
            ("pattern", self.patterns.stats()),
            ("statistics", self.statistics.stats()),
        ]
    }
}
