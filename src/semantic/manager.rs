//! Symbol manager: the query surface over the symbol graph.
//!
//! Consumers (diagnostics, hover, definition) go through [`SymbolManager`] instead of
//! the raw graph. It adds:
//! - TTL caches per query family, invalidated by every mutation
//! - compact per-file metadata in place of whole symbol tables
//! - a pool of shared symbol handles
//! - impact analysis, candidate ranking, metrics and pattern mining
//!
//! [`SharedSymbolManager`] is the cloneable handle services share.

mod cache;
mod impact;
mod metadata;
mod metrics;
mod patterns;
mod pool;
mod resolution;
mod settings;
mod shared;
mod stats;

pub use cache::{CacheStats, Direction, ManagerCaches, RelationshipKey, TtlCache};
pub use impact::{
    BreakingChange, BreakingChangeKind, ImpactAnalysis, LOW_RISK_MAX, MEDIUM_RISK_MAX, RiskLevel,
    analyze_impact,
};
pub use metadata::{FileMetadata, ScopeNode};
pub use metrics::{LifecycleStage, SymbolMetrics, UsagePattern};
pub use patterns::{PatternDirection, PatternQuery, RelationshipPattern};
pub use pool::{PoolStats, SymbolPool};
pub use resolution::{
    Resolution, ResolutionContext, SINGLE_CANDIDATE_CONFIDENCE, ScoreFactors, ScoredCandidate,
};
pub use settings::{Environment, ManagerSettings};
pub use shared::{SharedSymbolManager, SymbolAvailability};
pub use stats::ManagerStats;

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use parking_lot::Mutex;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::semantic::graphs::{DependencyAnalysis, Reference, ReferenceType, SymbolGraph};
use crate::semantic::symbol_table::{Symbol, SymbolId, SymbolTable};
use crate::semantic::types::GraphError;

#[cfg(test)]
mod tests;

/// Cache key of the graph-wide pattern list.
const ALL_PATTERNS: &str = "all";

#[derive(Debug)]
pub struct SymbolManager {
    settings: ManagerSettings,
    graph: SymbolGraph,
    caches: Mutex<ManagerCaches>,
    metadata: IndexMap<SmolStr, FileMetadata>,
    pool: SymbolPool,
}

impl Default for SymbolManager {
    fn default() -> Self {
        Self::new(ManagerSettings::default())
    }
}

impl SymbolManager {
    pub fn new(settings: ManagerSettings) -> Self {
        Self {
            caches: Mutex::new(ManagerCaches::new(
                settings.cache_ttl,
                settings.max_cache_entries,
            )),
            settings,
            graph: SymbolGraph::new(),
            metadata: IndexMap::new(),
            pool: SymbolPool::new(),
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// The underlying graph, for queries the manager does not wrap.
    pub fn graph(&self) -> &SymbolGraph {
        &self.graph
    }

    // ============================================================
    // Mutation
    // ============================================================

    /// Index a file's table, replacing any earlier version of the file.
    ///
    /// On failure the partial state is removed before the error is returned.
    pub fn add_file(&mut self, table: &SymbolTable) -> Result<usize, GraphError> {
        let uri = SmolStr::new(table.file_uri());
        let (mut names, mut touched) = self.file_footprint(&uri);

        let pool = &mut self.pool;
        let result = self.graph.add_file_with(table, |symbol| pool.intern(symbol));
        let edges = match result {
            Ok(edges) => edges,
            Err(err) => {
                warn!("[MANAGER] indexing {} failed: {}", uri, err);
                self.graph.remove_file(&uri);
                self.metadata.shift_remove(&uri);
                self.invalidate(&names, Some(uri.as_str()), &touched);
                return Err(err);
            }
        };

        let (added_names, added_touched) = self.file_footprint(&uri);
        names.extend(added_names);
        touched.extend(added_touched);
        self.metadata
            .insert(uri.clone(), FileMetadata::from_table(table, Instant::now()));
        self.invalidate(&names, Some(uri.as_str()), &touched);
        debug!(
            "[MANAGER] indexed {} ({} symbols, {} edges)",
            uri,
            table.len(),
            edges
        );
        Ok(edges)
    }

    /// Drop a file's symbols, edges and metadata. Returns the number of symbols removed.
    pub fn remove_file(&mut self, uri: &str) -> usize {
        let (names, touched) = self.file_footprint(uri);
        let removed = self.graph.remove_file(uri);
        self.metadata.shift_remove(uri);
        self.invalidate(&names, Some(uri), &touched);
        debug!("[MANAGER] removed {} ({} symbols)", uri, removed);
        removed
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> Result<(), GraphError> {
        let names = vec![symbol.name.to_lowercase()];
        let uri = symbol.file_uri.clone();
        let id = symbol.id.clone();
        let handle = self.pool.intern(&symbol);
        self.graph.add_symbol(handle)?;
        let touched = self.neighbourhood(&id);
        self.invalidate(&names, Some(uri.as_str()), &touched);
        Ok(())
    }

    pub fn remove_symbol(&mut self, id: &SymbolId) -> Option<Arc<Symbol>> {
        let touched = self.neighbourhood(id);
        let removed = self.graph.remove_symbol(id)?;
        self.invalidate(
            &[removed.name.to_lowercase()],
            Some(removed.file_uri.as_str()),
            &touched,
        );
        Some(removed)
    }

    /// Add an edge between two indexed symbols.
    pub fn add_relationship(&mut self, edge: Reference) -> Result<bool, GraphError> {
        let touched = vec![edge.source.clone(), edge.target.clone()];
        let added = self.graph.add_edge(edge)?;
        if added {
            self.invalidate(&[], None, &touched);
        }
        Ok(added)
    }

    /// Forget everything: graph, caches, metadata and pool.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.caches.lock().clear();
        self.metadata.clear();
        self.pool.clear();
    }

    /// Lowercase names and edge endpoints of everything a file currently owns.
    fn file_footprint(&self, uri: &str) -> (Vec<String>, Vec<SymbolId>) {
        let mut names = Vec::new();
        let mut touched = Vec::new();
        for symbol in self.graph.symbols_in_file(uri) {
            let name = symbol.name.to_lowercase();
            if !names.contains(&name) {
                names.push(name);
            }
            touched.extend(self.neighbourhood(&symbol.id));
        }
        (names, touched)
    }

    /// A symbol and every symbol sharing an edge with it.
    fn neighbourhood(&self, id: &SymbolId) -> Vec<SymbolId> {
        let mut ids = vec![id.clone()];
        for edge in self
            .graph
            .outgoing(id, None)
            .into_iter()
            .chain(self.graph.incoming(id, None))
        {
            for end in [edge.source, edge.target] {
                if !ids.contains(&end) {
                    ids.push(end);
                }
            }
        }
        ids
    }

    fn invalidate(&self, names: &[String], file: Option<&str>, touched: &[SymbolId]) {
        trace!(
            "[MANAGER] invalidating {} name(s), file {:?}, {} symbol(s)",
            names.len(),
            file,
            touched.len()
        );
        self.caches.lock().invalidate(names, file, touched);
    }

    // ============================================================
    // Lookup
    // ============================================================

    /// Every symbol with the name, ignoring case.
    pub fn find_symbol_by_name(&self, name: &str) -> Vec<Arc<Symbol>> {
        let key = name.to_lowercase();
        if let Some(hit) = self.caches.lock().by_name.get(&key) {
            return hit;
        }
        let found = self.graph.lookup_by_name(name);
        self.caches.lock().by_name.insert(key, found.clone());
        found
    }

    pub fn find_symbol_by_fqn(&self, fqn: &str) -> Option<Arc<Symbol>> {
        let key = fqn.to_lowercase();
        if let Some(hit) = self.caches.lock().by_fqn.get(&key) {
            return hit;
        }
        let found = self.graph.lookup_by_fqn(fqn);
        self.caches.lock().by_fqn.insert(key, found.clone());
        found
    }

    pub fn find_symbols_in_file(&self, uri: &str) -> Vec<Arc<Symbol>> {
        let key = SmolStr::new(uri);
        if let Some(hit) = self.caches.lock().by_file.get(&key) {
            return hit;
        }
        let found = self.graph.symbols_in_file(uri);
        self.caches.lock().by_file.insert(key, found.clone());
        found
    }

    pub fn find_files_for_symbol(&self, name: &str) -> Vec<SmolStr> {
        self.graph.files_containing(name)
    }

    pub fn get_symbol(&self, id: &SymbolId) -> Option<Arc<Symbol>> {
        self.graph.get(id)
    }

    /// Edges arriving at a symbol.
    pub fn find_references_to(
        &self,
        id: &SymbolId,
        filter: Option<ReferenceType>,
    ) -> Vec<Reference> {
        self.relationships(id, Direction::Incoming, filter)
    }

    /// Edges leaving a symbol.
    pub fn find_references_from(
        &self,
        id: &SymbolId,
        filter: Option<ReferenceType>,
    ) -> Vec<Reference> {
        self.relationships(id, Direction::Outgoing, filter)
    }

    /// Targets of a symbol's edges of one type.
    pub fn find_related_symbols(
        &self,
        id: &SymbolId,
        reference_type: ReferenceType,
    ) -> Vec<Arc<Symbol>> {
        self.find_references_from(id, Some(reference_type))
            .into_iter()
            .filter_map(|edge| self.graph.get(&edge.target))
            .collect()
    }

    fn relationships(
        &self,
        id: &SymbolId,
        direction: Direction,
        filter: Option<ReferenceType>,
    ) -> Vec<Reference> {
        let key = RelationshipKey {
            symbol: id.clone(),
            direction,
            filter,
        };
        if let Some(hit) = self.caches.lock().relationships.get(&key) {
            return hit;
        }
        let found = match direction {
            Direction::Incoming => self.graph.incoming(id, filter),
            Direction::Outgoing => self.graph.outgoing(id, filter),
        };
        self.caches.lock().relationships.insert(key, found.clone());
        found
    }

    /// Compact structure of an indexed file.
    pub fn file_metadata(&self, uri: &str) -> Option<&FileMetadata> {
        self.metadata.get(uri)
    }

    pub fn indexed_files(&self) -> Vec<SmolStr> {
        self.metadata.keys().cloned().collect()
    }

    // ============================================================
    // Analysis
    // ============================================================

    pub fn detect_circular_dependencies(&self) -> Vec<Vec<SymbolId>> {
        self.graph.find_cycles()
    }

    pub fn analyze_dependencies(&self, id: &SymbolId) -> DependencyAnalysis {
        self.graph.dependency_analysis(id)
    }

    pub fn analyze_impact(&self, id: &SymbolId) -> Option<ImpactAnalysis> {
        analyze_impact(&self.graph, id, self.settings.impact_depth)
    }

    /// Resolve a possibly ambiguous name in a use-site context.
    pub fn resolve_symbol(&self, name: &str, context: &ResolutionContext) -> Option<Resolution> {
        let candidates = match self.find_symbol_by_fqn(name) {
            Some(exact) if name.contains('.') => vec![exact],
            _ => {
                let simple = name.rsplit('.').next().unwrap_or(name);
                self.find_symbol_by_name(simple)
                    .into_iter()
                    .filter(|symbol| !symbol.is_scope())
                    .collect()
            }
        };
        let resolution = resolution::resolve_among(&self.graph, candidates, context)?;
        trace!(
            "[MANAGER] resolved '{}' → {} ({:.2})",
            name, resolution.symbol.id, resolution.confidence
        );
        Some(resolution)
    }

    pub fn compute_metrics(&self, id: &SymbolId) -> Option<SymbolMetrics> {
        metrics::compute_metrics(
            &self.graph,
            id,
            self.settings.impact_depth,
            self.settings.max_inheritance_depth,
        )
    }

    /// Frequency of (source kind, edge type, target kind) triples.
    pub fn relationship_patterns(&self) -> Vec<RelationshipPattern> {
        let key = ALL_PATTERNS.to_string();
        if let Some(hit) = self.caches.lock().patterns.get(&key) {
            return hit;
        }
        let patterns = patterns::mine_patterns(&self.graph);
        self.caches.lock().patterns.insert(key, patterns.clone());
        patterns
    }

    /// Symbols with at least `query.min_count` matching edges.
    pub fn query_patterns(&self, query: &PatternQuery) -> Vec<(SymbolId, usize)> {
        patterns::query_symbols(&self.graph, query)
    }

    pub fn hub_symbols(&self, min_degree: usize) -> Vec<(SymbolId, usize)> {
        patterns::hub_symbols(&self.graph, min_degree)
    }

    pub fn isolated_symbols(&self) -> Vec<SymbolId> {
        patterns::isolated_symbols(&self.graph)
    }

    // ============================================================
    // Housekeeping
    // ============================================================

    /// Reclaim pooled handles the graph no longer holds.
    pub fn sweep_pool(&mut self) -> usize {
        self.pool.sweep(Instant::now())
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn statistics(&self) -> ManagerStats {
        if let Some(hit) = self.caches.lock().statistics.get(&()) {
            return hit;
        }
        let graph = self.graph.stats();
        let mut by_kind: IndexMap<&'static str, usize> = IndexMap::new();
        for symbol in self.graph.symbols() {
            *by_kind.entry(symbol.kind.tag()).or_default() += 1;
        }
        by_kind.sort_keys();

        let stats = ManagerStats {
            total_symbols: graph.symbols,
            total_edges: graph.edges,
            total_files: graph.files,
            deferred_references: graph.deferred,
            symbols_by_kind: by_kind
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), count))
                .collect(),
            caches: self
                .caches
                .lock()
                .report()
                .into_iter()
                .map(|(name, stats)| (name.to_string(), stats))
                .collect(),
            pool: self.pool.stats(),
        };
        self.caches.lock().statistics.insert((), stats.clone());
        stats
    }

    /// Counters of every cache.
    pub fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        self.caches.lock().report()
    }
}
