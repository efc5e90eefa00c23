use crate::base::Position;

use super::references::TypeReference;
use super::symbol::{ScopeKind, Symbol, SymbolId, SymbolKind};
use super::table::SymbolTable;

impl SymbolTable {
    // ============================================================
    // Name lookups
    // ============================================================

    /// All symbols named `name` (case-insensitive), in declaration order.
    pub fn lookup(&self, name: &str) -> Vec<&Symbol> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|ids| ids.iter().filter_map(|id| self.symbols.get(id)).collect())
            .unwrap_or_default()
    }

    /// Resolve `name` from `scope_id` outwards through the parent chain.
    ///
    /// Block symbols are never returned; the first non-block child of a scope on the
    /// chain whose name matches wins.
    pub fn lookup_from_scope(&self, name: &str, scope_id: &SymbolId) -> Option<&Symbol> {
        let mut current = Some(scope_id.clone());
        while let Some(id) = current {
            let found = self
                .children
                .get(&id)
                .into_iter()
                .flatten()
                .filter_map(|child| self.symbols.get(child))
                .find(|child| !child.is_scope() && child.name.eq_ignore_ascii_case(name));
            if found.is_some() {
                return found;
            }
            current = self.symbols.get(&id).and_then(|s| s.parent_id.clone());
        }
        None
    }

    // ============================================================
    // Tree navigation
    // ============================================================

    /// Direct children of a symbol, in insertion order.
    pub fn children_of(&self, id: &SymbolId) -> Vec<&Symbol> {
        self.children
            .get(id)
            .map(|ids| ids.iter().filter_map(|c| self.symbols.get(c)).collect())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, id: &SymbolId) -> Option<&Symbol> {
        self.symbols
            .get(id)
            .and_then(|s| s.parent_id.as_ref())
            .and_then(|p| self.symbols.get(p))
    }

    /// Parent chain of a symbol, nearest first. Stops on a repeated id.
    pub fn ancestors(&self, id: &SymbolId) -> Vec<&Symbol> {
        let mut out: Vec<&Symbol> = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(symbol) = current {
            if out.iter().any(|seen| seen.id == symbol.id) {
                break;
            }
            out.push(symbol);
            current = self.parent_of(&symbol.id);
        }
        out
    }

    /// Nearest enclosing class, interface, enum or trigger.
    pub fn enclosing_type(&self, id: &SymbolId) -> Option<&Symbol> {
        self.ancestors(id).into_iter().find(|s| s.kind.is_type())
    }

    /// Nearest enclosing method or constructor.
    pub fn enclosing_method(&self, id: &SymbolId) -> Option<&Symbol> {
        self.ancestors(id).into_iter().find(|s| s.kind.is_method_like())
    }

    /// The scope symbol representing a type or method body.
    pub fn body_scope(&self, id: &SymbolId) -> Option<&Symbol> {
        self.children_of(id).into_iter().find(|child| {
            matches!(
                child.scope_kind(),
                Some(ScopeKind::Class | ScopeKind::Method)
            )
        })
    }

    /// Members declared directly in a type body.
    pub fn members_of(&self, type_id: &SymbolId) -> Vec<&Symbol> {
        self.body_scope(type_id)
            .map(|scope| {
                self.children_of(&scope.id)
                    .into_iter()
                    .filter(|s| !s.is_scope())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Top-level scope of the file.
    pub fn file_scope(&self) -> Option<&Symbol> {
        self.symbols
            .values()
            .find(|s| s.scope_kind() == Some(ScopeKind::File))
    }

    /// All scope symbols.
    pub fn scopes(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().filter(|s| s.is_scope())
    }

    /// Types declared in the file (outer and inner).
    pub fn types(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().filter(|s| s.kind.is_type())
    }

    pub fn symbols_of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().filter(move |s| s.kind == kind)
    }

    // ============================================================
    // Position lookups
    // ============================================================

    /// The declaration whose identifier is under `position`.
    pub fn symbol_at(&self, position: Position) -> Option<&Symbol> {
        self.symbols
            .values()
            .filter(|s| !s.is_scope() && s.location.identifier_range.contains(position))
            .min_by_key(|s| {
                let r = s.location.identifier_range;
                (
                    r.end.line.saturating_sub(r.start.line),
                    r.end.column.saturating_sub(r.start.column),
                )
            })
    }

    /// Innermost scope whose range contains `position`.
    pub fn scope_at(&self, position: Position) -> Option<&Symbol> {
        self.scopes()
            .filter(|s| s.location.symbol_range.contains(position))
            .max_by_key(|s| self.ancestors(&s.id).len())
    }

    /// The reference (or chain step) under `position`.
    pub fn reference_at(&self, position: Position) -> Option<&TypeReference> {
        self.references.iter().find_map(|r| r.at(position))
    }
}
