//! Folding ranges from block scopes.

use crate::semantic::symbol_table::{ScopeKind, SymbolTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldingRange {
    pub start_line: u32,
    pub end_line: u32,
    pub scope: ScopeKind,
}

/// One range per multi-line scope, ordered by start line.
///
/// Scopes starting on the same line fold together; the outermost one is kept.
pub fn folding_ranges(table: &SymbolTable) -> Vec<FoldingRange> {
    let mut ranges: Vec<FoldingRange> = table
        .scopes()
        .filter_map(|scope| {
            let kind = scope.scope_kind()?;
            let range = scope.location.symbol_range;
            (kind != ScopeKind::File && range.is_multiline()).then_some(FoldingRange {
                start_line: range.start.line,
                end_line: range.end.line,
                scope: kind,
            })
        })
        .collect();

    ranges.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });
    ranges.dedup_by_key(|range| range.start_line);
    ranges
}
