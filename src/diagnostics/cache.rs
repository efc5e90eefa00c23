//! Per-document cache of compile diagnostics.
//!
//! One entry per URI, valid for exactly one (version, content length) pair. A write
//! carrying an older version than the stored one belongs to a superseded request and
//! is dropped.

use indexmap::IndexMap;
use parking_lot::Mutex;
use smol_str::SmolStr;
use tracing::trace;

use super::types::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey<'a> {
    pub uri: &'a str,
    pub version: i32,
    pub content_len: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    version: i32,
    content_len: usize,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Writes dropped because a newer version was already cached
    pub superseded: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct DiagnosticCache {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: IndexMap<SmolStr, Entry>,
    stats: DiagnosticCacheStats,
}

impl DiagnosticCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CacheKey<'_>) -> Option<Vec<Diagnostic>> {
        let mut inner = self.inner.lock();
        let hit = inner
            .entries
            .get(key.uri)
            .filter(|entry| entry.version == key.version && entry.content_len == key.content_len)
            .map(|entry| entry.diagnostics.clone());
        match hit {
            Some(diagnostics) => {
                inner.stats.hits += 1;
                trace!("[DIAGNOSTICS] cache hit {}@{}", key.uri, key.version);
                Some(diagnostics)
            }
            None => {
                inner.stats.misses += 1;
                trace!("[DIAGNOSTICS] cache miss {}@{}", key.uri, key.version);
                None
            }
        }
    }

    /// Store diagnostics for a key. Returns `false` when a newer version is cached.
    pub fn insert(&self, key: CacheKey<'_>, diagnostics: Vec<Diagnostic>) -> bool {
        let mut inner = self.inner.lock();
        if inner
            .entries
            .get(key.uri)
            .is_some_and(|entry| entry.version > key.version)
        {
            inner.stats.superseded += 1;
            trace!("[DIAGNOSTICS] dropping superseded write {}@{}", key.uri, key.version);
            return false;
        }
        inner.entries.insert(
            SmolStr::new(key.uri),
            Entry {
                version: key.version,
                content_len: key.content_len,
                diagnostics,
            },
        );
        true
    }

    pub fn invalidate(&self, uri: &str) -> bool {
        self.inner.lock().entries.shift_remove(uri).is_some()
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> DiagnosticCacheStats {
        let inner = self.inner.lock();
        DiagnosticCacheStats {
            entries: inner.entries.len(),
            ..inner.stats
        }
    }
}
