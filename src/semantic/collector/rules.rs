//! Identifier and modifier rules checked while declaring symbols.

use crate::base::constants::{MAX_IDENTIFIER_LENGTH, is_reserved_word};
use crate::semantic::symbol_table::{Modifiers, SymbolKind, Visibility};

/// Why a declared identifier is invalid, or `None` when it is fine.
pub(super) fn identifier_problem(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Some("Identifier must not be empty".to_string());
    };
    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Some(format!(
            "Identifier '{name}' exceeds the maximum length of {MAX_IDENTIFIER_LENGTH} characters"
        ));
    }
    if !unicode_ident::is_xid_start(first) {
        return Some(format!("Identifier '{name}' must start with a letter"));
    }
    if let Some(bad) = chars.find(|c| !unicode_ident::is_xid_continue(*c)) {
        return Some(format!("Identifier '{name}' contains invalid character '{bad}'"));
    }
    if name.contains("__") {
        return Some(format!(
            "Identifier '{name}' cannot contain consecutive underscores"
        ));
    }
    if name.ends_with('_') {
        return Some(format!("Identifier '{name}' cannot end with an underscore"));
    }
    if is_reserved_word(name) {
        return Some(format!("Identifier '{name}' is a reserved word"));
    }
    None
}

/// Illegal modifier combinations for a declaration of `kind`.
pub(super) fn modifier_problems(modifiers: &Modifiers, kind: SymbolKind) -> Vec<String> {
    let mut problems = Vec::new();
    let target = kind.display();

    if kind.is_method_like() {
        if modifiers.is_abstract && modifiers.is_virtual {
            problems.push("Methods cannot be both abstract and virtual".to_string());
        }
        if modifiers.is_abstract && modifiers.is_static {
            problems.push("Abstract methods cannot be static".to_string());
        }
    }
    if modifiers.is_override && kind != SymbolKind::Method {
        problems.push(format!("The override modifier cannot be used on a {target}"));
    }
    if modifiers.is_transient && !matches!(kind, SymbolKind::Field | SymbolKind::Property) {
        problems.push(format!("The transient modifier cannot be used on a {target}"));
    }
    if modifiers.is_web_service && modifiers.visibility != Visibility::Global {
        problems.push(format!("A webservice {target} must be declared global"));
    }
    if matches!(kind, SymbolKind::Field | SymbolKind::Property) && modifiers.is_abstract {
        problems.push(if modifiers.is_final {
            format!("A {target} cannot be both final and abstract")
        } else {
            format!("A {target} cannot be abstract")
        });
    }
    if matches!(kind, SymbolKind::Variable | SymbolKind::Parameter)
        && (modifiers.visibility != Visibility::Default || modifiers.is_static)
    {
        problems.push(format!(
            "Only the final modifier is allowed on a local {target}"
        ));
    }
    problems
}
