//! Assertion helpers over diagnostics and indexed symbols.

use std::sync::Arc;

use apexls::semantic::{Symbol, SymbolId};
use apexls::{Diagnostic, SymbolManager};

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .filter_map(|d| d.code.as_deref())
        .collect()
}

pub fn assert_has_code(diagnostics: &[Diagnostic], code: &str) {
    assert!(
        codes(diagnostics).contains(&code),
        "expected a '{}' diagnostic, got {:#?}",
        code,
        diagnostics
    );
}

pub fn assert_lacks_code(diagnostics: &[Diagnostic], code: &str) {
    assert!(
        !codes(diagnostics).contains(&code),
        "unexpected '{}' diagnostic in {:#?}",
        code,
        diagnostics
    );
}

/// The indexed type declaration named `name`.
pub fn type_named(manager: &SymbolManager, name: &str) -> Arc<Symbol> {
    manager
        .find_symbol_by_name(name)
        .into_iter()
        .find(|symbol| symbol.kind.is_type())
        .unwrap_or_else(|| panic!("Expected type '{}' to be indexed", name))
}

pub fn type_id(manager: &SymbolManager, name: &str) -> SymbolId {
    type_named(manager, name).id.clone()
}
