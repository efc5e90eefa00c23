//! Compact per-file structure kept instead of whole symbol tables.

use std::time::Instant;

use smol_str::SmolStr;

use crate::semantic::symbol_table::{ScopeKind, SymbolId, SymbolTable};

/// One scope of a file, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    pub name: SmolStr,
    pub scope_kind: ScopeKind,
    pub parent: Option<SmolStr>,
    /// Non-scope symbols declared directly in the scope
    pub symbols: Vec<SymbolId>,
    /// Names of the directly nested scopes
    pub children: Vec<SmolStr>,
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub uri: SmolStr,
    pub symbol_count: usize,
    pub scope_count: usize,
    pub last_updated: Instant,
    pub scopes: Vec<ScopeNode>,
}

impl FileMetadata {
    /// Summarise a table. Scope names are the block keys, unique within the file.
    pub fn from_table(table: &SymbolTable, now: Instant) -> Self {
        let mut scopes: Vec<ScopeNode> = Vec::new();
        let mut index_of = rustc_hash::FxHashMap::default();

        for block in table.scopes() {
            let Some(scope_kind) = block.scope_kind() else {
                continue;
            };
            index_of.insert(block.id.clone(), scopes.len());
            scopes.push(ScopeNode {
                name: block.key.name.clone(),
                scope_kind,
                parent: None,
                symbols: Vec::new(),
                children: Vec::new(),
            });
        }

        for block in table.scopes() {
            let Some(&own) = index_of.get(&block.id) else {
                continue;
            };
            let parent = table
                .ancestors(&block.id)
                .into_iter()
                .find_map(|ancestor| index_of.get(&ancestor.id).copied());
            if let Some(parent) = parent {
                let child_name = scopes[own].name.clone();
                scopes[own].parent = Some(scopes[parent].name.clone());
                scopes[parent].children.push(child_name);
            }
            scopes[own].symbols = table
                .children_of(&block.id)
                .into_iter()
                .filter(|child| !child.is_scope())
                .map(|child| child.id.clone())
                .collect();
        }

        Self {
            uri: SmolStr::new(table.file_uri()),
            symbol_count: table.symbols().filter(|symbol| !symbol.is_scope()).count(),
            scope_count: scopes.len(),
            last_updated: now,
            scopes,
        }
    }

    pub fn scope(&self, name: &str) -> Option<&ScopeNode> {
        self.scopes.iter().find(|scope| scope.name == name)
    }

    /// Symbols declared directly in the named scope.
    pub fn symbols_in_scope(&self, name: &str) -> &[SymbolId] {
        self.scope(name)
            .map(|scope| scope.symbols.as_slice())
            .unwrap_or_default()
    }

    /// Names of the scopes from the root down to `name`.
    pub fn scope_path(&self, name: &str) -> Vec<SmolStr> {
        let mut path = Vec::new();
        let mut current = self.scope(name);
        while let Some(scope) = current {
            if path.contains(&scope.name) {
                break;
            }
            path.push(scope.name.clone());
            current = scope.parent.as_deref().and_then(|parent| self.scope(parent));
        }
        path.reverse();
        path
    }
}
