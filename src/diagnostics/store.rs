//! Latest symbol table of every compiled document.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use smol_str::SmolStr;
use tracing::trace;

use crate::semantic::SymbolTable;

/// How much of a table has been computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnrichmentLevel {
    /// Symbols, scopes and raw references from collection
    Declarations,
    /// Type references resolved against the graph
    References,
}

#[derive(Debug, Clone)]
pub struct StoredTable {
    pub table: Arc<SymbolTable>,
    pub level: EnrichmentLevel,
    pub version: i32,
}

#[derive(Debug, Default)]
pub struct TableStore {
    tables: RwLock<IndexMap<SmolStr, StoredTable>>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly collected table. Returns `None` when a newer version is stored.
    pub fn insert(&self, table: SymbolTable, version: i32) -> Option<Arc<SymbolTable>> {
        let uri = SmolStr::new(table.file_uri());
        let mut tables = self.tables.write();
        if tables.get(&uri).is_some_and(|stored| stored.version > version) {
            trace!("[STORE] keeping newer table of {}", uri);
            return None;
        }
        let table = Arc::new(table);
        tables.insert(
            uri,
            StoredTable {
                table: table.clone(),
                level: EnrichmentLevel::Declarations,
                version,
            },
        );
        Some(table)
    }

    /// Replace a table with a more enriched one computed from `version`.
    ///
    /// Ignored if the stored table has moved to another version in the meantime.
    pub fn upgrade(&self, table: SymbolTable, version: i32, level: EnrichmentLevel) -> bool {
        let mut tables = self.tables.write();
        match tables.get_mut(table.file_uri()) {
            Some(stored) if stored.version == version && stored.level < level => {
                stored.table = Arc::new(table);
                stored.level = level;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, uri: &str) -> Option<StoredTable> {
        self.tables.read().get(uri).cloned()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.tables.read().contains_key(uri)
    }

    pub fn remove(&self, uri: &str) -> Option<StoredTable> {
        self.tables.write().shift_remove(uri)
    }

    pub fn uris(&self) -> Vec<SmolStr> {
        self.tables.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
