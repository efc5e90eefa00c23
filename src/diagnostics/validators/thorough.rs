//! Validators that consult the cross-file graph.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::base::Range;
use crate::base::constants::is_builtin_type;
use crate::semantic::SharedSymbolManager;
use crate::semantic::symbol_table::{
    ReferenceContext, ScopeKind, Symbol, SymbolId, SymbolKind, SymbolTable, TypeInfo,
};

use super::{ValidationContext, ValidationTier, Validator};
use crate::diagnostics::error::ValidationError;
use crate::diagnostics::types::{Diagnostic, codes};

/// Base name of a declared super type (`List<T>` is `List`).
fn base_name(declared: &str) -> String {
    TypeInfo::parse(declared).name
}

fn declared_in_table(table: &SymbolTable, name: &str) -> bool {
    let simple = name.rsplit('.').next().unwrap_or(name);
    table.lookup(simple).iter().any(|s| s.kind.is_type())
}

/// Range of the `extends`/`implements` reference to `name` inside `owner`.
fn supertype_range(table: &SymbolTable, owner: &Symbol, name: &str) -> Range {
    table
        .references()
        .iter()
        .filter(|r| {
            matches!(
                r.context,
                ReferenceContext::SuperType | ReferenceContext::InterfaceType
            )
        })
        .find(|r| {
            r.name.eq_ignore_ascii_case(name)
                && owner
                    .location
                    .symbol_range
                    .encloses(&r.location.identifier_range)
        })
        .map_or(owner.location.identifier_range, |r| r.location.identifier_range)
}

/// Methods declared directly in a type's body, read from the graph.
fn methods_of(manager: &SharedSymbolManager, owner: &Symbol) -> Vec<Arc<Symbol>> {
    let symbols = manager.read().find_symbols_in_file(&owner.file_uri);
    let Some(body) = symbols
        .iter()
        .find(|s| {
            s.parent_id.as_ref() == Some(&owner.id) && s.scope_kind() == Some(ScopeKind::Class)
        })
        .map(|s| s.id.clone())
    else {
        return Vec::new();
    };
    symbols
        .into_iter()
        .filter(|s| s.kind == SymbolKind::Method && s.parent_id.as_ref() == Some(&body))
        .collect()
}

/// `name(Type, Type)` as shown in messages.
fn method_label(method: &Symbol) -> String {
    let parameters = method
        .parameters()
        .iter()
        .map(|p| p.type_info.original.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", method.name, parameters)
}

/// Declared super class and interfaces, already indexed, as symbols.
fn supertypes_of(manager: &SharedSymbolManager, symbol: &Symbol) -> Vec<Arc<Symbol>> {
    symbol
        .super_class()
        .into_iter()
        .chain(symbol.interfaces().iter().map(String::as_str))
        .map(base_name)
        .filter(|name| !is_builtin_type(name))
        .filter_map(|name| manager.find_type(&name))
        .collect()
}

// ============================================================================
// UNDEFINED TYPES
// ============================================================================

/// Type names that are not declared, not indexed and cannot be loaded.
///
/// `extends`/`implements` clauses are left to [`InheritanceValidator`].
pub struct UndefinedTypeValidator;

#[async_trait]
impl Validator for UndefinedTypeValidator {
    fn name(&self) -> &'static str {
        "undefined-type"
    }

    fn tier(&self) -> ValidationTier {
        ValidationTier::Thorough
    }

    async fn validate(
        &self,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let table = context.table;
        let mut unresolved: IndexMap<String, (String, Vec<Range>)> = IndexMap::new();
        for reference in table.references() {
            if !reference.context.is_type_usage()
                || matches!(
                    reference.context,
                    ReferenceContext::SuperType | ReferenceContext::InterfaceType
                )
                || is_builtin_type(&reference.name)
                || declared_in_table(table, &reference.name)
            {
                continue;
            }
            unresolved
                .entry(reference.name.to_lowercase())
                .or_insert_with(|| (reference.name.clone(), Vec::new()))
                .1
                .push(reference.location.identifier_range);
        }

        let mut diagnostics = Vec::new();
        for (name, ranges) in unresolved.into_values() {
            if context.resolve_type(&name).await.is_some() {
                continue;
            }
            trace!("[VALIDATOR] '{}' is undefined in {}", name, context.uri);
            diagnostics.extend(ranges.into_iter().map(|range| {
                Diagnostic::error(range, format!("Unknown type '{}'", name))
                    .with_code(codes::UNDEFINED_TYPE)
            }));
        }
        Ok(diagnostics)
    }
}

// ============================================================================
// INHERITANCE
// ============================================================================

/// `extends`/`implements` rules: the super type exists, is extensible and of the
/// right kind, and the hierarchy has no cycle.
pub struct InheritanceValidator;

impl InheritanceValidator {
    /// True if following super types from `start` leads back to it.
    fn is_circular(manager: &SharedSymbolManager, start: &Symbol, max_depth: usize) -> bool {
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        let mut level = supertypes_of(manager, start);
        for _ in 0..max_depth.max(1) {
            let mut next = Vec::new();
            for symbol in level {
                if symbol.id == start.id {
                    return true;
                }
                if visited.insert(symbol.id.clone()) {
                    next.extend(supertypes_of(manager, &symbol));
                }
            }
            if next.is_empty() {
                break;
            }
            level = next;
        }
        false
    }

    async fn check_super_class(
        context: &ValidationContext<'_>,
        owner: &Symbol,
        declared: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let name = base_name(declared);
        if is_builtin_type(&name) {
            return;
        }
        let range = supertype_range(context.table, owner, &name);
        let Some(super_class) = context.resolve_type(&name).await else {
            diagnostics.push(
                Diagnostic::error(range, format!("Super class '{}' does not exist", name))
                    .with_code(codes::MISSING_SUPERCLASS),
            );
            return;
        };
        match super_class.kind {
            SymbolKind::Class => {
                let modifiers = &super_class.modifiers;
                if !modifiers.is_virtual && !modifiers.is_abstract {
                    diagnostics.push(
                        Diagnostic::error(
                            range,
                            format!(
                                "Class '{}' is final and cannot be extended; mark it virtual or abstract",
                                super_class.name
                            ),
                        )
                        .with_code(codes::FINAL_SUPERCLASS),
                    );
                }
            }
            SymbolKind::Interface => diagnostics.push(
                Diagnostic::error(
                    range,
                    format!(
                        "Class '{}' cannot extend interface '{}'; use implements",
                        owner.name, super_class.name
                    ),
                )
                .with_code(codes::INVALID_SUPERTYPE),
            ),
            other => diagnostics.push(
                Diagnostic::error(
                    range,
                    format!("Cannot extend {} '{}'", other.display(), super_class.name),
                )
                .with_code(codes::INVALID_SUPERTYPE),
            ),
        }
    }

    async fn check_interface(
        context: &ValidationContext<'_>,
        owner: &Symbol,
        declared: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let name = base_name(declared);
        if is_builtin_type(&name) {
            return;
        }
        let range = supertype_range(context.table, owner, &name);
        let Some(interface) = context.resolve_type(&name).await else {
            diagnostics.push(
                Diagnostic::error(range, format!("Unknown interface '{}'", name))
                    .with_code(codes::UNDEFINED_TYPE),
            );
            return;
        };
        if interface.kind == SymbolKind::Interface {
            return;
        }
        let diagnostic = if owner.kind == SymbolKind::Interface {
            Diagnostic::error(
                range,
                format!(
                    "Interface '{}' can only extend interfaces; '{}' is a {}",
                    owner.name,
                    interface.name,
                    interface.kind.display()
                ),
            )
            .with_code(codes::INVALID_SUPERTYPE)
        } else {
            Diagnostic::error(
                range,
                format!(
                    "'{}' is a {}, not an interface, and cannot be implemented",
                    interface.name,
                    interface.kind.display()
                ),
            )
            .with_code(codes::IMPLEMENTS_NON_INTERFACE)
        };
        diagnostics.push(diagnostic);
    }
}

#[async_trait]
impl Validator for InheritanceValidator {
    fn name(&self) -> &'static str {
        "inheritance"
    }

    fn tier(&self) -> ValidationTier {
        ValidationTier::Thorough
    }

    async fn validate(
        &self,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let mut diagnostics = Vec::new();
        let types: Vec<&Symbol> = context
            .table
            .types()
            .filter(|ty| matches!(ty.kind, SymbolKind::Class | SymbolKind::Interface))
            .collect();

        for owner in types {
            if let Some(declared) = owner.super_class() {
                Self::check_super_class(context, owner, declared, &mut diagnostics).await;
            }
            for declared in owner.interfaces() {
                Self::check_interface(context, owner, declared, &mut diagnostics).await;
            }
            if Self::is_circular(context.manager, owner, context.max_inheritance_depth) {
                diagnostics.push(
                    Diagnostic::error(
                        owner.location.identifier_range,
                        format!("Circular inheritance involving '{}'", owner.name),
                    )
                    .with_code(codes::CIRCULAR_INHERITANCE),
                );
            }
        }
        Ok(diagnostics)
    }
}

// ============================================================================
// INTERFACE METHODS
// ============================================================================

/// Concrete classes implement every method of the interfaces they declare.
pub struct InterfaceMethodValidator;

impl InterfaceMethodValidator {
    /// Methods required by `interface` and the interfaces it extends.
    fn required_methods(
        manager: &SharedSymbolManager,
        interface: Arc<Symbol>,
        max_depth: usize,
    ) -> Vec<(Arc<Symbol>, Arc<Symbol>)> {
        let mut out = Vec::new();
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        let mut level = vec![interface];
        for _ in 0..max_depth.max(1) {
            let mut next = Vec::new();
            for interface in level {
                if interface.kind != SymbolKind::Interface || !visited.insert(interface.id.clone())
                {
                    continue;
                }
                for method in methods_of(manager, &interface) {
                    out.push((interface.clone(), method));
                }
                next.extend(supertypes_of(manager, &interface));
            }
            if next.is_empty() {
                break;
            }
            level = next;
        }
        out
    }

    /// Methods of `class` and of its super classes.
    fn available_methods(
        manager: &SharedSymbolManager,
        class: &Symbol,
        max_depth: usize,
    ) -> Vec<Arc<Symbol>> {
        let mut out = methods_of(manager, class);
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        visited.insert(class.id.clone());
        let mut current = class
            .super_class()
            .map(base_name)
            .and_then(|name| manager.find_type(&name));
        let mut depth = 0;
        while let Some(super_class) = current {
            if depth >= max_depth || !visited.insert(super_class.id.clone()) {
                break;
            }
            depth += 1;
            out.extend(methods_of(manager, &super_class));
            current = super_class
                .super_class()
                .map(base_name)
                .and_then(|name| manager.find_type(&name));
        }
        out
    }
}

#[async_trait]
impl Validator for InterfaceMethodValidator {
    fn name(&self) -> &'static str {
        "interface-methods"
    }

    fn tier(&self) -> ValidationTier {
        ValidationTier::Thorough
    }

    async fn validate(
        &self,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let manager = context.manager;
        let depth = context.max_inheritance_depth;
        let mut diagnostics = Vec::new();

        let classes = context
            .table
            .types()
            .filter(|ty| ty.kind == SymbolKind::Class && !ty.modifiers.is_abstract)
            .filter(|ty| !ty.interfaces().is_empty());
        for class in classes {
            let available = Self::available_methods(manager, class, depth);
            let interfaces = class
                .interfaces()
                .iter()
                .map(|declared| base_name(declared))
                .filter_map(|name| manager.find_type(&name));
            for interface in interfaces {
                for (source, required) in Self::required_methods(manager, interface, depth) {
                    let signature = required.signature();
                    let implemented = available.iter().any(|method| {
                        method.name.eq_ignore_ascii_case(&required.name)
                            && method.signature() == signature
                    });
                    if !implemented {
                        diagnostics.push(
                            Diagnostic::error(
                                class.location.identifier_range,
                                format!(
                                    "Class '{}' must implement method '{}' from interface '{}'",
                                    class.name,
                                    method_label(&required),
                                    source.name
                                ),
                            )
                            .with_code(codes::MISSING_INTERFACE_METHOD),
                        );
                    }
                }
            }
        }
        Ok(diagnostics)
    }
}
