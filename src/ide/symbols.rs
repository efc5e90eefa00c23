//! Document outline.

use smol_str::SmolStr;

use crate::base::Range;
use crate::semantic::symbol_table::{Symbol, SymbolKind, SymbolTable};

/// One node of the document outline.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSymbol {
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// One-line declaration summary
    pub detail: String,
    /// Whole declaration
    pub range: Range,
    /// The identifier
    pub selection_range: Range,
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    fn from_symbol(symbol: &Symbol, children: Vec<DocumentSymbol>) -> Self {
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind,
            detail: symbol.declaration(),
            range: symbol.location.symbol_range,
            selection_range: symbol.location.identifier_range,
            children,
        }
    }
}

/// Hierarchical outline of a document: top-level types, their members and inner
/// types, in source order. Locals and parameters are not listed.
pub fn document_symbols(table: &SymbolTable) -> Vec<DocumentSymbol> {
    let mut roots: Vec<&Symbol> = table
        .types()
        .filter(|ty| table.enclosing_type(&ty.id).is_none())
        .collect();
    sort_by_position(&mut roots);
    roots.into_iter().map(|ty| outline(table, ty)).collect()
}

fn outline(table: &SymbolTable, symbol: &Symbol) -> DocumentSymbol {
    if !symbol.kind.is_type() {
        return DocumentSymbol::from_symbol(symbol, Vec::new());
    }
    let mut members = table.members_of(&symbol.id);
    sort_by_position(&mut members);
    let children = members
        .into_iter()
        .filter(|member| member.kind.is_member() || member.kind.is_type())
        .map(|member| outline(table, member))
        .collect();
    DocumentSymbol::from_symbol(symbol, children)
}

fn sort_by_position(symbols: &mut [&Symbol]) {
    symbols.sort_by_key(|s| s.location.symbol_range.start);
}
