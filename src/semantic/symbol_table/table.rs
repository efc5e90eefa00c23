use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

use super::references::{HierarchicalReference, TypeReference};
use super::symbol::{Symbol, SymbolDetails, SymbolId, SymbolKey};

/// Per-file container of symbols and name usages.
///
/// Symbols live in one insertion-ordered map keyed by id; the scope tree is expressed
/// through `parent_id` back-references and mirrored in a child index.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub(super) file_uri: SmolStr,
    /// All symbols of the file, in declaration order
    pub(super) symbols: IndexMap<SymbolId, Symbol>,
    /// Structural key -> id
    pub(super) by_key: FxHashMap<SymbolKey, SymbolId>,
    /// Lower-cased name -> ids of declarations; scope blocks are not indexed
    pub(super) by_name: FxHashMap<String, Vec<SymbolId>>,
    /// Parent id -> child ids, in insertion order
    pub(super) children: FxHashMap<SymbolId, Vec<SymbolId>>,
    pub(super) references: Vec<TypeReference>,
    pub(super) hierarchical_references: Vec<HierarchicalReference>,
}

impl SymbolTable {
    pub fn new(file_uri: impl Into<SmolStr>) -> Self {
        Self {
            file_uri: file_uri.into(),
            ..Self::default()
        }
    }

    pub fn file_uri(&self) -> &str {
        &self.file_uri
    }

    // ============================================================
    // Mutation
    // ============================================================

    /// Add a symbol, or replace the one with the same id.
    ///
    /// A parent id that is already set on the stored symbol is kept even if the
    /// incoming symbol carries a different (or no) parent.
    pub fn add_symbol(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = symbol.id.clone();

        if let Some(existing) = self.symbols.get(&id) {
            match (&existing.parent_id, &symbol.parent_id) {
                (Some(kept), incoming) if incoming.as_ref() != Some(kept) => {
                    trace!(
                        "[TABLE] keeping parent {} of {} (incoming {:?})",
                        kept, id, incoming
                    );
                    symbol.parent_id = Some(kept.clone());
                }
                (None, Some(parent)) => {
                    self.children
                        .entry(parent.clone())
                        .or_default()
                        .push(id.clone());
                }
                _ => {}
            }

            let old_name = existing.name.to_lowercase();
            let new_name = symbol.name.to_lowercase();
            if old_name != new_name {
                if let Some(ids) = self.by_name.get_mut(&old_name) {
                    ids.retain(|other| other != &id);
                }
                if !symbol.is_scope() {
                    self.by_name.entry(new_name).or_default().push(id.clone());
                }
            }
            if existing.key != symbol.key {
                self.by_key.remove(&existing.key);
                self.by_key.insert(symbol.key.clone(), id.clone());
            }

            self.symbols.insert(id.clone(), symbol);
            return id;
        }

        trace!("[TABLE] add {} {}", symbol.kind.tag(), id);
        self.by_key.insert(symbol.key.clone(), id.clone());
        if !symbol.is_scope() {
            self.by_name
                .entry(symbol.name.to_lowercase())
                .or_default()
                .push(id.clone());
        }
        if let Some(parent) = &symbol.parent_id {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(id.clone());
        }
        self.symbols.insert(id.clone(), symbol);
        id
    }

    /// An id for `key` that is not yet taken in this table.
    ///
    /// The plain key id when free, otherwise the id suffixed with `~2`, `~3`, ...
    pub fn allocate_id(&self, key: &SymbolKey) -> SymbolId {
        let base = key.to_id(&self.file_uri);
        if !self.symbols.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| SymbolId::new(format!("{base}~{n}")))
            .find(|candidate| !self.symbols.contains_key(candidate))
            .unwrap_or(base)
    }

    /// Edit the kind-specific payload of a symbol in place.
    pub fn update_details(&mut self, id: &SymbolId, f: impl FnOnce(&mut SymbolDetails)) -> bool {
        match self.symbols.get_mut(id) {
            Some(symbol) => {
                f(&mut symbol.details);
                true
            }
            None => false,
        }
    }

    pub fn add_type_reference(&mut self, reference: TypeReference) {
        self.references.push(reference);
    }

    pub fn add_hierarchical_reference(&mut self, reference: HierarchicalReference) {
        self.hierarchical_references.push(reference);
    }

    /// Set `resolved_symbol_id` on every reference (and chain step) for which
    /// `resolve` returns an id. Returns the number of references resolved.
    pub fn resolve_references(
        &mut self,
        mut resolve: impl FnMut(&TypeReference) -> Option<SymbolId>,
    ) -> usize {
        fn visit(
            reference: &mut TypeReference,
            resolve: &mut dyn FnMut(&TypeReference) -> Option<SymbolId>,
        ) -> usize {
            let mut count = 0;
            for node in &mut reference.chain_nodes {
                count += visit(node, resolve);
            }
            if reference.resolved_symbol_id.is_none() {
                if let Some(id) = resolve(reference) {
                    reference.resolved_symbol_id = Some(id);
                    count += 1;
                }
            }
            count
        }

        let mut count = 0;
        for reference in &mut self.references {
            count += visit(reference, &mut resolve);
        }
        count
    }

    // ============================================================
    // Accessors
    // ============================================================

    pub fn get(&self, id: &SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn contains(&self, id: &SymbolId) -> bool {
        self.symbols.contains_key(id)
    }

    pub fn find_by_key(&self, key: &SymbolKey) -> Option<&Symbol> {
        self.by_key.get(key).and_then(|id| self.symbols.get(id))
    }

    /// All symbols in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn references(&self) -> &[TypeReference] {
        &self.references
    }

    pub fn hierarchical_references(&self) -> &[HierarchicalReference] {
        &self.hierarchical_references
    }
}
