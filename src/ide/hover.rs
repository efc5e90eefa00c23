//! Hover information implementation.

use crate::base::{Position, Range};
use crate::semantic::symbol_table::{Symbol, SymbolId, SymbolTable};
use crate::semantic::SymbolManager;

use super::goto::definitions;

/// Result of a hover request.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverResult {
    /// Markdown
    pub contents: String,
    /// The hovered identifier
    pub range: Range,
    pub symbol_id: SymbolId,
}

/// Hover information for `position`.
///
/// On a usage this describes the best matching declaration, on a declaration the
/// declaration itself. `None` if there is nothing under the cursor or the usage
/// does not resolve.
pub fn hover(table: &SymbolTable, manager: &SymbolManager, position: Position) -> Option<HoverResult> {
    if let Some(reference) = table.reference_at(position) {
        let candidates = definitions(table, manager, reference, position);
        let (symbol, confidence) = candidates.first()?;
        let mut contents = build_hover_content(symbol, table.file_uri());
        if candidates.len() > 1 {
            contents.push_str(&format!(
                "\n*Best of {} candidates (confidence {:.2})*\n",
                candidates.len(),
                confidence
            ));
        }
        return Some(HoverResult {
            contents,
            range: reference.location.identifier_range,
            symbol_id: symbol.id.clone(),
        });
    }

    let symbol = table.symbol_at(position)?;
    Some(HoverResult {
        contents: build_hover_content(symbol, table.file_uri()),
        range: symbol.location.identifier_range,
        symbol_id: symbol.id.clone(),
    })
}

/// Build markdown hover content for a symbol.
fn build_hover_content(symbol: &Symbol, from_uri: &str) -> String {
    let mut content = String::new();

    content.push_str("```apex\n");
    content.push_str(&symbol.declaration());
    content.push_str("\n```\n");

    let annotations: Vec<String> = symbol
        .annotations
        .iter()
        .map(|a| format!("`@{}`", a.name))
        .collect();
    if !annotations.is_empty() {
        content.push('\n');
        content.push_str(&annotations.join(" "));
        content.push('\n');
    }

    if let Some(fqn) = &symbol.fqn {
        content.push_str("\n**Qualified Name:** `");
        content.push_str(fqn);
        content.push_str("`\n");
    }

    if symbol.file_uri != from_uri {
        content.push_str("\n*Declared in* `");
        content.push_str(&symbol.file_uri);
        content.push_str("`\n");
    }

    content
}
