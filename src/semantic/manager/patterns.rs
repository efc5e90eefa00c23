//! Relationship-pattern mining over the whole graph.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::semantic::graphs::{Reference, ReferenceType, SymbolGraph};
use crate::semantic::symbol_table::{SymbolId, SymbolKind};

/// How often edges of one type connect two kinds of symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipPattern {
    pub source_kind: SymbolKind,
    pub reference_type: ReferenceType,
    pub target_kind: SymbolKind,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternDirection {
    #[default]
    Outgoing,
    Incoming,
    Both,
}

/// Symbols with at least `min_count` edges of a type in a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternQuery {
    pub reference_type: Option<ReferenceType>,
    pub direction: PatternDirection,
    pub min_count: usize,
}

impl PatternQuery {
    /// Cache key of the query.
    pub fn key(&self) -> String {
        format!(
            "query:{}:{:?}:{}",
            self.reference_type.map_or("any", |ty| ty.name()),
            self.direction,
            self.min_count
        )
    }
}

/// Every (source kind, edge type, target kind) triple, most frequent first.
pub fn mine_patterns(graph: &SymbolGraph) -> Vec<RelationshipPattern> {
    let mut counts: FxHashMap<(SymbolKind, ReferenceType, SymbolKind), usize> =
        FxHashMap::default();
    for edge in graph.edges() {
        if edge.reference_type.is_structural() {
            continue;
        }
        let (Some(source), Some(target)) = (graph.get(&edge.source), graph.get(&edge.target))
        else {
            continue;
        };
        *counts
            .entry((source.kind, edge.reference_type, target.kind))
            .or_default() += 1;
    }

    let mut patterns = counts
        .into_iter()
        .map(|((source_kind, reference_type, target_kind), count)| RelationshipPattern {
            source_kind,
            reference_type,
            target_kind,
            count,
        })
        .collect::<Vec<_>>();
    patterns.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.reference_type.name().cmp(b.reference_type.name()))
            .then_with(|| a.source_kind.tag().cmp(b.source_kind.tag()))
            .then_with(|| a.target_kind.tag().cmp(b.target_kind.tag()))
    });
    patterns
}

/// Symbols matching a query with their edge counts, highest first.
pub fn query_symbols(graph: &SymbolGraph, query: &PatternQuery) -> Vec<(SymbolId, usize)> {
    let mut matches = graph
        .symbols()
        .filter_map(|symbol| {
            let count_of = |edges: Vec<Reference>| {
                edges
                    .iter()
                    .filter(|edge| !edge.reference_type.is_structural())
                    .count()
            };
            let outgoing = || count_of(graph.outgoing(&symbol.id, query.reference_type));
            let incoming = || count_of(graph.incoming(&symbol.id, query.reference_type));
            let count = match query.direction {
                PatternDirection::Outgoing => outgoing(),
                PatternDirection::Incoming => incoming(),
                PatternDirection::Both => outgoing() + incoming(),
            };
            (count > 0 && count >= query.min_count).then(|| (symbol.id.clone(), count))
        })
        .collect::<Vec<_>>();
    matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    matches
}

/// Symbols whose total degree reaches `min_degree`.
pub fn hub_symbols(graph: &SymbolGraph, min_degree: usize) -> Vec<(SymbolId, usize)> {
    query_symbols(
        graph,
        &PatternQuery {
            reference_type: None,
            direction: PatternDirection::Both,
            min_count: min_degree,
        },
    )
}

/// Declarations (not scopes) with no dependency edge in either direction.
pub fn isolated_symbols(graph: &SymbolGraph) -> Vec<SymbolId> {
    let mut isolated = graph
        .symbols()
        .filter(|symbol| !symbol.is_scope())
        .filter(|symbol| {
            graph.dependency_targets(&symbol.id).next().is_none()
                && graph.dependent_sources(&symbol.id).next().is_none()
        })
        .map(|symbol| symbol.id.clone())
        .collect::<Vec<_>>();
    isolated.sort();
    isolated
}
