//! Multi-file symbol graph with typed, bidirectional edges.
//!
//! Stores every indexed symbol along with the edges between them. Enables:
//! - lookup by name (case-insensitive), by FQN and by file
//! - "Find References": given a target, the incoming edges
//! - "Find Dependencies": given a source, the outgoing edges
//!
//! File ingestion derives edges from the table's declarations (containment,
//! inheritance) and its recorded name usages. A usage whose target is not indexed
//! yet is parked by name and becomes an edge once a matching symbol is added.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::reference_type::{Reference, ReferenceType};
use crate::base::Location;
use crate::base::constants::is_builtin_type;
use crate::semantic::symbol_table::{
    ReferenceContext, Symbol, SymbolId, SymbolKind, SymbolTable, TypeReference,
};
use crate::semantic::types::GraphError;

/// An edge waiting for its target to be indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeferredReference {
    source: SymbolId,
    target_name: String,
    reference_type: ReferenceType,
    location: Location,
    file: Option<SmolStr>,
}

/// Counts describing the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub symbols: usize,
    pub edges: usize,
    pub files: usize,
    pub deferred: usize,
}

/// Cross-file symbol graph.
#[derive(Debug, Clone, Default)]
pub struct SymbolGraph {
    symbols: FxHashMap<SymbolId, Arc<Symbol>>,
    /// lowercase name → ids, scope blocks excluded
    by_name: FxHashMap<String, Vec<SymbolId>>,
    /// lowercase FQN → ids, first declaration first
    by_fqn: FxHashMap<String, Vec<SymbolId>>,
    /// file uri → ids in declaration order
    by_file: IndexMap<SmolStr, Vec<SymbolId>>,
    /// Forward index: source → edges leaving it
    outgoing: FxHashMap<SymbolId, Vec<Reference>>,
    /// Reverse index: target → edges arriving at it
    incoming: FxHashMap<SymbolId, Vec<Reference>>,
    /// lowercase target name → parked edges
    deferred: FxHashMap<String, Vec<DeferredReference>>,
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================================
    // Symbols
    // ============================================================

    /// Add a symbol, replacing an earlier version from the same file.
    ///
    /// Parked edges naming the symbol are materialised.
    pub fn add_symbol(&mut self, symbol: impl Into<Arc<Symbol>>) -> Result<(), GraphError> {
        let symbol = symbol.into();
        let id = symbol.id.clone();

        if let Some(existing) = self.symbols.get(&id) {
            if existing.file_uri != symbol.file_uri {
                return Err(GraphError::DuplicateIdentity {
                    id: id.0.clone(),
                    owner: existing.file_uri.clone(),
                });
            }
            self.unindex(&id);
        }

        trace!("[GRAPH] add_symbol: {} ({})", id, symbol.kind.tag());

        if !symbol.is_scope() {
            self.by_name
                .entry(symbol.name.to_lowercase())
                .or_default()
                .push(id.clone());
        }
        if let Some(fqn) = &symbol.fqn {
            self.by_fqn
                .entry(fqn.to_lowercase())
                .or_default()
                .push(id.clone());
        }
        let file_ids = self.by_file.entry(symbol.file_uri.clone()).or_default();
        if !file_ids.contains(&id) {
            file_ids.push(id.clone());
        }

        let name = symbol.name.to_lowercase();
        let fqn = symbol.fqn.as_ref().map(|fqn| fqn.to_lowercase());
        self.symbols.insert(id.clone(), symbol);

        self.materialise_deferred(&name, &id);
        if let Some(fqn) = fqn.filter(|fqn| *fqn != name) {
            self.materialise_deferred(&fqn, &id);
        }
        Ok(())
    }

    /// Remove a symbol and every edge touching it.
    ///
    /// Edges arriving from other files are parked again under the name they were
    /// recorded with, so re-adding the symbol restores them.
    pub fn remove_symbol(&mut self, id: &SymbolId) -> Option<Arc<Symbol>> {
        if !self.symbols.contains_key(id) {
            return None;
        }
        trace!("[GRAPH] remove_symbol: {}", id);

        let symbol_file = self.symbols.get(id).map(|symbol| symbol.file_uri.clone());

        for edge in self.outgoing.remove(id).unwrap_or_default() {
            Self::detach(&mut self.incoming, &edge.target, &edge);
        }
        for edge in self.incoming.remove(id).unwrap_or_default() {
            Self::detach(&mut self.outgoing, &edge.source, &edge);
            if edge.source != *id && edge.file != symbol_file {
                self.park(DeferredReference {
                    source: edge.source,
                    target_name: edge.target_name,
                    reference_type: edge.reference_type,
                    location: edge.location,
                    file: edge.file,
                });
            }
        }

        self.deferred.retain(|_, parked| {
            parked.retain(|entry| entry.source != *id);
            !parked.is_empty()
        });

        self.unindex(id);
        if let Some(file) = &symbol_file {
            if let Some(ids) = self.by_file.get_mut(file) {
                ids.retain(|other| other != id);
                if ids.is_empty() {
                    self.by_file.shift_remove(file);
                }
            }
        }
        self.symbols.remove(id)
    }

    fn unindex(&mut self, id: &SymbolId) {
        let Some(symbol) = self.symbols.get(id) else {
            return;
        };
        let name = symbol.name.to_lowercase();
        if let Some(ids) = self.by_name.get_mut(&name) {
            ids.retain(|other| other != id);
            if ids.is_empty() {
                self.by_name.remove(&name);
            }
        }
        if let Some(fqn) = &symbol.fqn {
            let fqn = fqn.to_lowercase();
            if let Some(ids) = self.by_fqn.get_mut(&fqn) {
                ids.retain(|other| other != id);
                if ids.is_empty() {
                    self.by_fqn.remove(&fqn);
                }
            }
        }
    }

    fn detach(index: &mut FxHashMap<SymbolId, Vec<Reference>>, key: &SymbolId, edge: &Reference) {
        if let Some(edges) = index.get_mut(key) {
            edges.retain(|other| other != edge);
            if edges.is_empty() {
                index.remove(key);
            }
        }
    }

    // ============================================================
    // Edges
    // ============================================================

    /// Add a typed edge between two indexed symbols.
    ///
    /// Adding an identical edge twice is a no-op.
    pub fn add_edge(&mut self, edge: Reference) -> Result<bool, GraphError> {
        for end in [&edge.source, &edge.target] {
            if !self.symbols.contains_key(end) {
                return Err(GraphError::UnknownSymbol(end.0.clone()));
            }
        }
        let edges = self.outgoing.entry(edge.source.clone()).or_default();
        if edges.contains(&edge) {
            return Ok(false);
        }
        trace!(
            "[GRAPH] add_edge: {} -[{}]-> {}",
            edge.source, edge.reference_type, edge.target
        );
        edges.push(edge.clone());
        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .push(edge);
        Ok(true)
    }

    fn park(&mut self, entry: DeferredReference) {
        let key = entry.target_name.to_lowercase();
        let parked = self.deferred.entry(key).or_default();
        if !parked.contains(&entry) {
            trace!(
                "[GRAPH] deferring {} -> '{}' ({})",
                entry.source, entry.target_name, entry.reference_type
            );
            parked.push(entry);
        }
    }

    fn materialise_deferred(&mut self, key: &str, target: &SymbolId) {
        let Some(parked) = self.deferred.remove(key) else {
            return;
        };
        let Some(target_kind) = self.symbols.get(target).map(|symbol| symbol.kind) else {
            return;
        };

        let mut still_waiting = Vec::new();
        for entry in parked {
            if !entry.reference_type.accepts_target(target_kind)
                || !self.symbols.contains_key(&entry.source)
            {
                still_waiting.push(entry);
                continue;
            }
            let edge = Reference {
                source: entry.source,
                target: target.clone(),
                reference_type: entry.reference_type,
                target_name: entry.target_name,
                location: entry.location,
                file: entry.file,
            };
            debug!("[GRAPH] materialised {} -> {}", edge.source, edge.target);
            if let Err(err) = self.add_edge(edge) {
                trace!("[GRAPH] dropped parked edge for {}: {}", key, err);
            }
        }
        if !still_waiting.is_empty() {
            self.deferred.insert(key.to_string(), still_waiting);
        }
    }

    // ============================================================
    // Files
    // ============================================================

    /// Index every symbol of a table and derive its edges.
    ///
    /// A file that is already indexed is replaced. On error the caller must call
    /// [`remove_file`](Self::remove_file) before retrying. Returns the number of
    /// edges added.
    pub fn add_file(&mut self, table: &SymbolTable) -> Result<usize, GraphError> {
        self.add_file_with(table, |symbol| Arc::new(symbol.clone()))
    }

    /// Like [`add_file`](Self::add_file), storing the handles `intern` hands out.
    pub fn add_file_with(
        &mut self,
        table: &SymbolTable,
        mut intern: impl FnMut(&Symbol) -> Arc<Symbol>,
    ) -> Result<usize, GraphError> {
        let uri = SmolStr::new(table.file_uri());
        if let Some(stray) = table.symbols().find(|symbol| symbol.file_uri != uri) {
            return Err(GraphError::FileMismatch {
                symbol: stray.id.0.clone(),
                expected: uri.clone(),
                actual: stray.file_uri.clone(),
            });
        }
        if self.by_file.contains_key(&uri) {
            self.remove_file(&uri);
        }

        debug!("[GRAPH] add_file: {} ({} symbols)", uri, table.len());
        for symbol in table.symbols() {
            self.add_symbol(intern(symbol))?;
        }

        let mut added = 0;
        for symbol in table.symbols() {
            added += self.add_structural_edges(symbol, &uri)?;
            added += self.add_inheritance_edges(symbol, &uri)?;
        }
        for reference in table.references() {
            added += self.add_usage_edges(table, reference, &uri)?;
        }
        Ok(added)
    }

    /// Remove a file's symbols, their edges and the edges parked from the file.
    ///
    /// Returns the number of symbols removed.
    pub fn remove_file(&mut self, uri: &str) -> usize {
        let ids = self.by_file.get(uri).cloned().unwrap_or_default();
        debug!("[GRAPH] remove_file: {} ({} symbols)", uri, ids.len());
        for id in &ids {
            self.remove_symbol(id);
        }
        self.by_file.shift_remove(uri);
        self.deferred.retain(|_, parked| {
            parked.retain(|entry| entry.file.as_deref() != Some(uri));
            !parked.is_empty()
        });
        ids.len()
    }

    fn add_structural_edges(&mut self, symbol: &Symbol, uri: &SmolStr) -> Result<usize, GraphError> {
        let Some(parent) = symbol.parent_id.as_ref() else {
            return Ok(0);
        };
        if !self.symbols.contains_key(parent) {
            return Ok(0);
        }
        let parent_is_scope = self
            .symbols
            .get(parent)
            .is_some_and(|parent| parent.is_scope());
        let reference_type = if parent_is_scope && !symbol.is_scope() {
            ReferenceType::ScopeContains
        } else {
            ReferenceType::ScopeChild
        };
        let edge = Reference {
            source: parent.clone(),
            target: symbol.id.clone(),
            reference_type,
            target_name: symbol.name.to_string(),
            location: symbol.location,
            file: Some(uri.clone()),
        };
        Ok(usize::from(self.add_edge(edge)?))
    }

    fn add_inheritance_edges(&mut self, symbol: &Symbol, uri: &SmolStr) -> Result<usize, GraphError> {
        if !symbol.kind.is_type() {
            return Ok(0);
        }
        let interface_type = if symbol.kind == SymbolKind::Interface {
            ReferenceType::Inheritance
        } else {
            ReferenceType::InterfaceImplementation
        };

        let targets = symbol
            .super_class()
            .map(|name| (name.to_string(), ReferenceType::Inheritance))
            .into_iter()
            .chain(
                symbol
                    .interfaces()
                    .iter()
                    .map(|name| (name.clone(), interface_type)),
            )
            .collect::<Vec<_>>();

        let mut added = 0;
        for (name, reference_type) in targets {
            let entry = DeferredReference {
                source: symbol.id.clone(),
                target_name: name,
                reference_type,
                location: symbol.location,
                file: Some(uri.clone()),
            };
            added += self.link_or_park(entry, uri, move |kind| reference_type.accepts_target(kind))?;
        }
        Ok(added)
    }

    fn add_usage_edges(
        &mut self,
        table: &SymbolTable,
        reference: &TypeReference,
        uri: &SmolStr,
    ) -> Result<usize, GraphError> {
        if reference.is_chained() {
            let mut added = 0;
            for node in &reference.chain_nodes {
                added += self.add_usage_edges(table, node, uri)?;
            }
            return Ok(added);
        }

        let context = reference.context;
        if !is_linkable(context) {
            return Ok(0);
        }
        let Some(source) = reference
            .context_symbol_id
            .clone()
            .or_else(|| table.file_scope().map(|scope| scope.id.clone()))
        else {
            return Ok(0);
        };
        if !self.symbols.contains_key(&source) {
            return Ok(0);
        }

        let reference_type = ReferenceType::Usage(context);
        if let Some(target) = reference
            .resolved_symbol_id
            .as_ref()
            .filter(|target| self.symbols.contains_key(*target))
        {
            let edge = Reference {
                source,
                target: target.clone(),
                reference_type,
                target_name: reference.name.clone(),
                location: reference.location,
                file: Some(uri.clone()),
            };
            return Ok(usize::from(self.add_edge(edge)?));
        }

        let entry = DeferredReference {
            source,
            target_name: reference.name.clone(),
            reference_type,
            location: reference.location,
            file: Some(uri.clone()),
        };
        // Chain steps and class references are guesses; only park what must exist.
        if is_builtin_type(&reference.name)
            || matches!(context, ReferenceContext::ChainStep | ReferenceContext::ClassReference)
            || (context.is_member_usage()
                && reference
                    .qualifier
                    .as_deref()
                    .is_some_and(is_builtin_type))
        {
            return self.link_only(entry, uri, move |kind| reference_type.accepts_target(kind));
        }
        self.link_or_park(entry, uri, move |kind| reference_type.accepts_target(kind))
    }

    fn link_or_park(
        &mut self,
        entry: DeferredReference,
        uri: &SmolStr,
        filter: impl Fn(SymbolKind) -> bool,
    ) -> Result<usize, GraphError> {
        match self.best_candidate(&entry.target_name, uri, &filter) {
            Some(target) => self.link(entry, target),
            None => {
                self.park(entry);
                Ok(0)
            }
        }
    }

    fn link_only(
        &mut self,
        entry: DeferredReference,
        uri: &SmolStr,
        filter: impl Fn(SymbolKind) -> bool,
    ) -> Result<usize, GraphError> {
        match self.best_candidate(&entry.target_name, uri, &filter) {
            Some(target) => self.link(entry, target),
            None => Ok(0),
        }
    }

    fn link(&mut self, entry: DeferredReference, target: SymbolId) -> Result<usize, GraphError> {
        let edge = Reference {
            source: entry.source,
            target,
            reference_type: entry.reference_type,
            target_name: entry.target_name,
            location: entry.location,
            file: entry.file,
        };
        Ok(usize::from(self.add_edge(edge)?))
    }

    /// Pick a target for a name: exact FQN first, then same-file candidates.
    fn best_candidate(
        &self,
        name: &str,
        uri: &str,
        filter: &dyn Fn(SymbolKind) -> bool,
    ) -> Option<SymbolId> {
        let exact = self
            .by_fqn
            .get(&name.to_lowercase())
            .into_iter()
            .flatten()
            .filter_map(|id| self.symbols.get(id))
            .filter(|symbol| filter(symbol.kind))
            .min_by(|a, b| (a.file_uri != uri).cmp(&(b.file_uri != uri)));
        if let Some(symbol) = exact {
            return Some(symbol.id.clone());
        }
        let simple = name.rsplit('.').next().unwrap_or(name);
        let mut candidates = self
            .by_name
            .get(&simple.to_lowercase())?
            .iter()
            .filter_map(|id| self.symbols.get(id))
            .filter(|symbol| filter(symbol.kind))
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| {
            (a.file_uri != uri)
                .cmp(&(b.file_uri != uri))
                .then_with(|| a.id.cmp(&b.id))
        });
        candidates.first().map(|symbol| symbol.id.clone())
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn get(&self, id: &SymbolId) -> Option<Arc<Symbol>> {
        self.symbols.get(id).cloned()
    }

    pub fn contains(&self, id: &SymbolId) -> bool {
        self.symbols.contains_key(id)
    }

    /// Every symbol with the given name, ignoring case.
    pub fn lookup_by_name(&self, name: &str) -> Vec<Arc<Symbol>> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.symbols.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The earliest indexed symbol still carrying `fqn`, ignoring case.
    pub fn lookup_by_fqn(&self, fqn: &str) -> Option<Arc<Symbol>> {
        self.by_fqn
            .get(&fqn.to_lowercase())
            .and_then(|ids| ids.iter().find_map(|id| self.symbols.get(id).cloned()))
    }

    /// Symbols owned by a file, in declaration order.
    pub fn symbols_in_file(&self, uri: &str) -> Vec<Arc<Symbol>> {
        self.by_file
            .get(uri)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.symbols.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Files declaring a symbol with the given name.
    pub fn files_containing(&self, name: &str) -> Vec<SmolStr> {
        let mut files = Vec::new();
        for symbol in self.lookup_by_name(name) {
            if !files.contains(&symbol.file_uri) {
                files.push(symbol.file_uri.clone());
            }
        }
        files
    }

    pub fn files(&self) -> impl Iterator<Item = &SmolStr> {
        self.by_file.keys()
    }

    pub fn contains_file(&self, uri: &str) -> bool {
        self.by_file.contains_key(uri)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Arc<Symbol>> {
        self.symbols.values()
    }

    /// Edges leaving a symbol, optionally restricted to one edge type.
    pub fn outgoing(&self, id: &SymbolId, filter: Option<ReferenceType>) -> Vec<Reference> {
        Self::filtered(self.outgoing.get(id), filter)
    }

    /// Edges arriving at a symbol, optionally restricted to one edge type.
    pub fn incoming(&self, id: &SymbolId, filter: Option<ReferenceType>) -> Vec<Reference> {
        Self::filtered(self.incoming.get(id), filter)
    }

    fn filtered(edges: Option<&Vec<Reference>>, filter: Option<ReferenceType>) -> Vec<Reference> {
        edges
            .map(|edges| {
                edges
                    .iter()
                    .filter(|edge| filter.is_none_or(|wanted| edge.reference_type == wanted))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every edge in the graph.
    pub fn edges(&self) -> impl Iterator<Item = &Reference> {
        self.outgoing.values().flatten()
    }

    /// Targets of the non-structural edges leaving a symbol.
    pub fn dependency_targets(&self, id: &SymbolId) -> impl Iterator<Item = &SymbolId> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .filter(|edge| !edge.reference_type.is_structural())
            .map(|edge| &edge.target)
    }

    /// Sources of the non-structural edges arriving at a symbol.
    pub fn dependent_sources(&self, id: &SymbolId) -> impl Iterator<Item = &SymbolId> {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .filter(|edge| !edge.reference_type.is_structural())
            .map(|edge| &edge.source)
    }

    /// Names still waiting for a target.
    pub fn deferred_names(&self) -> Vec<String> {
        let mut names = self
            .deferred
            .values()
            .flatten()
            .map(|entry| entry.target_name.clone())
            .collect::<Vec<_>>();
        names.sort();
        names.dedup();
        names
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            symbols: self.symbols.len(),
            edges: self.outgoing.values().map(Vec::len).sum(),
            files: self.by_file.len(),
            deferred: self.deferred.values().map(Vec::len).sum(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Usage contexts that become edges.
///
/// `extends`/`implements` usages are skipped; declarations already yield
/// inheritance edges for them.
fn is_linkable(context: ReferenceContext) -> bool {
    if matches!(
        context,
        ReferenceContext::SuperType | ReferenceContext::InterfaceType
    ) {
        return false;
    }
    context.is_type_usage()
        || context.is_member_usage()
        || matches!(
            context,
            ReferenceContext::ClassReference
                | ReferenceContext::ChainStep
                | ReferenceContext::StaticMemberAccess
                | ReferenceContext::AnnotationReference
                | ReferenceContext::TriggerSObject
                | ReferenceContext::SoqlFromObject
                | ReferenceContext::SoslReturningObject
                | ReferenceContext::EnumValueReference
        )
}
