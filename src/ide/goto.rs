//! Go-to-definition implementation.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{Position, Range};
use crate::semantic::manager::ResolutionContext;
use crate::semantic::symbol_table::{Symbol, SymbolKind, SymbolTable, TypeReference};
use crate::semantic::SymbolManager;

/// Confidence of a target found without ranking (local scope or already resolved).
const EXACT: f64 = 1.0;

/// Result of a go-to-definition request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GotoResult {
    /// Best first
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A location to jump to.
#[derive(Clone, Debug, PartialEq)]
pub struct GotoTarget {
    pub uri: SmolStr,
    /// Range of the declaration's identifier
    pub range: Range,
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub confidence: f64,
}

impl GotoTarget {
    fn new(symbol: &Symbol, confidence: f64) -> Self {
        Self {
            uri: symbol.file_uri.clone(),
            range: symbol.location.identifier_range,
            name: symbol.name.clone(),
            kind: symbol.kind,
            confidence,
        }
    }
}

/// Find the definition(s) of what is under `position`.
///
/// On a usage the candidates come back in confidence order; on a declaration the
/// declaration itself is returned.
pub fn goto_definition(
    table: &SymbolTable,
    manager: &SymbolManager,
    position: Position,
) -> GotoResult {
    if let Some(reference) = table.reference_at(position) {
        let targets = definitions(table, manager, reference, position)
            .into_iter()
            .map(|(symbol, confidence)| GotoTarget::new(&symbol, confidence))
            .collect();
        return GotoResult { targets };
    }

    match table.symbol_at(position) {
        Some(symbol) => GotoResult {
            targets: vec![GotoTarget::new(symbol, EXACT)],
        },
        None => GotoResult::empty(),
    }
}

/// Candidate declarations of a reference, best first.
///
/// Order of attempts: the id recorded by enrichment, the lexical scope at the use
/// site (unqualified non-type usages), then ranked resolution across the graph.
pub(super) fn definitions(
    table: &SymbolTable,
    manager: &SymbolManager,
    reference: &TypeReference,
    position: Position,
) -> Vec<(Arc<Symbol>, f64)> {
    if let Some(symbol) = reference
        .resolved_symbol_id
        .as_ref()
        .and_then(|id| manager.get_symbol(id))
    {
        return vec![(symbol, EXACT)];
    }

    if reference.qualifier.is_none() && !reference.context.is_type_usage() {
        let local = table
            .scope_at(position)
            .and_then(|scope| table.lookup_from_scope(&reference.name, &scope.id));
        if let Some(local) = local {
            let symbol = manager
                .get_symbol(&local.id)
                .unwrap_or_else(|| Arc::new(local.clone()));
            return vec![(symbol, EXACT)];
        }
    }

    let context = ResolutionContext::in_file(table.file_uri());
    let Some(resolution) = manager.resolve_symbol(&reference.name, &context) else {
        return Vec::new();
    };
    let types_only = reference.context.is_type_usage();
    resolution
        .candidates
        .into_iter()
        .filter(|candidate| !types_only || candidate.symbol.kind.is_type())
        .map(|candidate| (candidate.symbol, candidate.confidence))
        .collect()
}
