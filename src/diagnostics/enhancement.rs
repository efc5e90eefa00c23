//! Cross-file enhancement: dependency cycles and high-impact symbols.
//!
//! Runs after the per-document diagnostics. Symbols are analysed in batches of
//! `batch_size`, yielding to the scheduler after each batch.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::semantic::symbol_table::{Symbol, SymbolId};
use crate::semantic::SharedSymbolManager;

use super::settings::PipelineSettings;
use super::types::{Diagnostic, codes, sources};

pub async fn cross_file_diagnostics(
    manager: &SharedSymbolManager,
    uri: &str,
    settings: &PipelineSettings,
) -> Vec<Diagnostic> {
    let symbols: Vec<Arc<Symbol>> = manager
        .read()
        .find_symbols_in_file(uri)
        .into_iter()
        .filter(|symbol| !symbol.is_scope())
        .collect();
    if symbols.is_empty() {
        return Vec::new();
    }

    let cycles = cycles_by_symbol(manager, &symbols);
    let mut diagnostics = Vec::new();
    for batch in symbols.chunks(settings.batch_size.max(1)) {
        for symbol in batch {
            if let Some(cycle) = cycles.get(&symbol.id) {
                diagnostics.push(
                    Diagnostic::warning(
                        symbol.location.identifier_range,
                        format!(
                            "'{}' is part of a circular dependency: {}",
                            symbol.name, cycle
                        ),
                    )
                    .with_code(codes::CIRCULAR_DEPENDENCY)
                    .with_source(sources::CROSS_FILE),
                );
            }

            let impact = manager.read().analyze_impact(&symbol.id);
            if let Some(impact) = impact {
                let total = impact.total_impact();
                if total > settings.high_impact_threshold {
                    diagnostics.push(
                        Diagnostic::info(
                            symbol.location.identifier_range,
                            format!(
                                "Changing '{}' affects {} symbols ({} risk)",
                                symbol.name,
                                total,
                                impact.risk
                            ),
                        )
                        .with_code(codes::HIGH_IMPACT)
                        .with_source(sources::CROSS_FILE),
                    );
                }
            }
        }
        tokio::task::yield_now().await;
    }

    debug!(
        "[PIPELINE] cross-file pass over {} symbols of {} produced {} diagnostics",
        symbols.len(),
        uri,
        diagnostics.len()
    );
    diagnostics
}

/// First cycle through each of `symbols`, rendered as `A -> B -> A`.
fn cycles_by_symbol(
    manager: &SharedSymbolManager,
    symbols: &[Arc<Symbol>],
) -> FxHashMap<SymbolId, String> {
    let manager = manager.read();
    let cycles = manager.detect_circular_dependencies();
    let mut out = FxHashMap::default();
    for symbol in symbols {
        let Some(cycle) = cycles.iter().find(|cycle| cycle.contains(&symbol.id)) else {
            continue;
        };
        let mut names: Vec<String> = cycle
            .iter()
            .map(|id| {
                manager
                    .get_symbol(id)
                    .map_or_else(|| id.to_string(), |s| s.name.to_string())
            })
            .collect();
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }
        out.insert(symbol.id.clone(), names.join(" -> "));
    }
    out
}
