//! Validators that only read the document's own table.

use async_trait::async_trait;

use crate::semantic::symbol_table::{ScopeKind, Symbol, SymbolKind, SymbolTable, TypeReference};

use super::{ValidationContext, ValidationTier, Validator};
use crate::diagnostics::error::ValidationError;
use crate::diagnostics::types::{Diagnostic, codes};

fn is_test_type(symbol: &Symbol) -> bool {
    symbol.modifiers.is_test_method || symbol.annotations.iter().any(|a| a.is_test())
}

// ============================================================================
// ABSTRACT MEMBERS
// ============================================================================

/// Abstract methods may only appear in abstract classes (and interfaces).
pub struct AbstractMemberValidator;

#[async_trait]
impl Validator for AbstractMemberValidator {
    fn name(&self) -> &'static str {
        "abstract-member"
    }

    fn tier(&self) -> ValidationTier {
        ValidationTier::Immediate
    }

    async fn validate(
        &self,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let table = context.table;
        let diagnostics = table
            .symbols_of_kind(SymbolKind::Method)
            .filter(|method| method.modifiers.is_abstract)
            .filter_map(|method| {
                let owner = table.enclosing_type(&method.id)?;
                if owner.kind != SymbolKind::Class || owner.modifiers.is_abstract {
                    return None;
                }
                Some(
                    Diagnostic::error(
                        method.location.identifier_range,
                        format!(
                            "Abstract method '{}' can only be declared in an abstract class; '{}' is not abstract",
                            method.name, owner.name
                        ),
                    )
                    .with_code(codes::ABSTRACT_MEMBER_IN_CONCRETE_CLASS),
                )
            })
            .collect();
        Ok(diagnostics)
    }
}

// ============================================================================
// TEST METHODS
// ============================================================================

/// Test methods must live in a class marked `@IsTest`.
pub struct TestMethodValidator;

#[async_trait]
impl Validator for TestMethodValidator {
    fn name(&self) -> &'static str {
        "test-method"
    }

    fn tier(&self) -> ValidationTier {
        ValidationTier::Immediate
    }

    async fn validate(
        &self,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let table = context.table;
        let mut diagnostics = Vec::new();
        for method in table.symbols_of_kind(SymbolKind::Method) {
            if !is_test_type(method) {
                continue;
            }
            let types: Vec<&Symbol> = table
                .ancestors(&method.id)
                .into_iter()
                .filter(|s| s.kind.is_type())
                .collect();
            let Some(owner) = types.first() else {
                continue;
            };
            if !types.iter().any(|ty| is_test_type(ty)) {
                diagnostics.push(
                    Diagnostic::error(
                        method.location.identifier_range,
                        format!(
                            "Test method '{}' must be declared in a class annotated with @IsTest; '{}' is not",
                            method.name, owner.name
                        ),
                    )
                    .with_code(codes::TEST_METHOD_OUTSIDE_TEST_CLASS),
                );
            }
        }
        Ok(diagnostics)
    }
}

// ============================================================================
// UNUSED LOCALS
// ============================================================================

/// Local variables that are never read or written after their declaration.
///
/// Catch clause variables are exempt.
pub struct UnusedVariableValidator;

#[async_trait]
impl Validator for UnusedVariableValidator {
    fn name(&self) -> &'static str {
        "unused-variable"
    }

    fn tier(&self) -> ValidationTier {
        ValidationTier::Immediate
    }

    async fn validate(
        &self,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let table = context.table;
        let diagnostics = table
            .symbols_of_kind(SymbolKind::Variable)
            .filter(|variable| !is_used(table, variable))
            .map(|variable| {
                Diagnostic::warning(
                    variable.location.identifier_range,
                    format!("Local variable '{}' is never used", variable.name),
                )
                .with_code(codes::UNUSED_VARIABLE)
            })
            .collect();
        Ok(diagnostics)
    }
}

fn is_used(table: &SymbolTable, variable: &Symbol) -> bool {
    let Some(scope) = table.parent_of(&variable.id) else {
        return true;
    };
    if scope.scope_kind() == Some(ScopeKind::Catch) {
        return true;
    }
    let visible = scope.location.symbol_range;
    let declared = variable.location.identifier_range.end;

    let check = |reference: &TypeReference| {
        reference.qualifier.is_none()
            && !reference.context.is_type_usage()
            && reference.name.eq_ignore_ascii_case(&variable.name)
            && reference.location.identifier_range.start >= declared
            && visible.encloses(&reference.location.identifier_range)
    };
    table
        .references()
        .iter()
        .any(|reference| any_node(reference, &check))
}

/// The reference or one of its chain steps satisfies `check`.
fn any_node(reference: &TypeReference, check: &dyn Fn(&TypeReference) -> bool) -> bool {
    check(reference) || reference.chain_nodes.iter().any(|node| any_node(node, check))
}
