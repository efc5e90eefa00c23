//! Name usages inside expressions and statements.

use crate::base::constants::{THIS_KEYWORD, is_compound_assignment};
use crate::base::{Location, Range};
use crate::semantic::symbol_table::{AccessType, ReferenceContext};
use crate::semantic::types::{SemanticError, SemanticResult};
use crate::syntax::{Construct, NodeRole, SyntaxNode};

use super::SymbolCollector;

/// A plain (possibly indexed) name such as `total` or `items[0]`.
fn simple_name(text: &str) -> Option<&str> {
    let name = text.split('[').next().unwrap_or(text).trim();
    let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// Identifier range of a node, falling back to the node's range.
fn name_range(node: &dyn SyntaxNode) -> Range {
    node.identifier().map_or(node.range(), |ident| ident.range())
}

impl SymbolCollector {
    pub(super) fn enter_method_call(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let ident = node
            .identifier()
            .ok_or_else(|| SemanticError::malformed("method call", "name", node.range()))?;
        if self.is_suppressed(ident.range()) || self.is_suppressed(node.range()) {
            return Ok(());
        }
        let reference = self.reference(
            ident.text().trim(),
            Location::new(node.range(), ident.range()),
            ReferenceContext::MethodCall,
        );
        self.emit(reference);
        Ok(())
    }

    pub(super) fn enter_identifier(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let name = node.name().unwrap_or_else(|| node.text()).trim();
        let range = name_range(node);
        if name.is_empty()
            || name.eq_ignore_ascii_case(THIS_KEYWORD)
            || self.is_suppressed(range)
            || self.is_suppressed(node.range())
        {
            return Ok(());
        }
        let reference = self
            .reference(
                name,
                Location::new(node.range(), range),
                ReferenceContext::VariableUsage,
            )
            .with_access(AccessType::Read);
        self.emit(reference);
        Ok(())
    }

    pub(super) fn enter_new(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let type_node = node
            .type_ref()
            .ok_or_else(|| SemanticError::malformed("new expression", "type", node.range()))?;
        self.emit_type_references(type_node, ReferenceContext::ConstructorCall);
        Ok(())
    }

    pub(super) fn enter_type_test(
        &mut self,
        construct: Construct,
        node: &dyn SyntaxNode,
    ) -> SemanticResult<()> {
        let type_node = node
            .type_ref()
            .ok_or_else(|| SemanticError::malformed(construct.display(), "type", node.range()))?;
        let context = if construct == Construct::CastExpression {
            ReferenceContext::CastTypeReference
        } else {
            ReferenceContext::InstanceofTypeReference
        };
        self.emit_type_references(type_node, context);
        Ok(())
    }

    // ============================================================
    // Assignments
    // ============================================================

    /// Record the write and suppress the target's own reference callbacks.
    pub(super) fn enter_assignment(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let target = node
            .child(NodeRole::Target)
            .ok_or_else(|| SemanticError::malformed("assignment", "target", node.range()))?;
        let operator = node.child(NodeRole::Operator).map_or("=", |op| op.text());
        let access = if is_compound_assignment(operator) {
            AccessType::ReadWrite
        } else {
            AccessType::Write
        };

        let text = target.text();
        if text.contains('.') {
            self.write_targets.push((target.range(), access));
            return Ok(());
        }
        let Some(name) = simple_name(target.name().unwrap_or(text)) else {
            return Ok(());
        };
        let range = name_range(target);
        let reference = self
            .reference(
                name,
                Location::new(target.range(), range),
                ReferenceContext::VariableUsage,
            )
            .with_access(access);
        self.emit(reference);
        self.suppressed.push(target.range());
        self.suppressed.push(range);
        Ok(())
    }

    pub(super) fn exit_assignment(&mut self, node: &dyn SyntaxNode) {
        let Some(target) = node.child(NodeRole::Target) else {
            return;
        };
        let range = target.range();
        if let Some(index) = self.write_targets.iter().rposition(|(r, _)| *r == range) {
            self.write_targets.remove(index);
        }
        self.unsuppress(range);
        self.unsuppress(name_range(target));
    }

    // ============================================================
    // SOQL, SOSL and DML
    // ============================================================

    pub(super) fn enter_soql(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let from = node
            .type_ref()
            .ok_or_else(|| SemanticError::malformed("SOQL query", "FROM object", node.range()))?;
        let object = from.text().trim().to_string();
        let reference = self.reference(
            object.clone(),
            Location::new(node.range(), from.range()),
            ReferenceContext::SoqlFromObject,
        );
        self.emit(reference);

        for field in node.children(NodeRole::Field) {
            let reference = self
                .reference(
                    field.text().trim(),
                    Location::new(node.range(), field.range()),
                    ReferenceContext::SoqlSelectField,
                )
                .with_qualifier(object.clone());
            self.emit(reference);
        }
        self.emit_binds(node);
        Ok(())
    }

    pub(super) fn enter_sosl(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        for object in node.children(NodeRole::TypeRef) {
            let reference = self.reference(
                object.text().trim(),
                Location::new(node.range(), object.range()),
                ReferenceContext::SoslReturningObject,
            );
            self.emit(reference);
        }
        self.emit_binds(node);
        Ok(())
    }

    fn emit_binds(&mut self, node: &dyn SyntaxNode) {
        for bind in node.children(NodeRole::Bind) {
            let name = bind.text().trim().trim_start_matches(':');
            let reference = self
                .reference(
                    name,
                    Location::new(node.range(), bind.range()),
                    ReferenceContext::SoqlBindVariable,
                )
                .with_access(AccessType::Read);
            self.emit(reference);
        }
    }

    /// `insert record;` reads and writes the record.
    pub(super) fn enter_dml(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let target = node
            .child(NodeRole::Target)
            .ok_or_else(|| SemanticError::malformed("DML statement", "operand", node.range()))?;
        let Some(name) = simple_name(target.name().unwrap_or_else(|| target.text())) else {
            return Ok(());
        };
        let range = name_range(target);
        let mut reference = self
            .reference(
                name,
                Location::new(node.range(), range),
                ReferenceContext::DmlTarget,
            )
            .with_access(AccessType::ReadWrite);
        if let Some(verb) = node.child(NodeRole::Operator) {
            reference = reference.with_qualifier(verb.text().trim());
        }
        self.emit(reference);
        self.suppressed.push(target.range());
        self.suppressed.push(range);
        Ok(())
    }

    pub(super) fn exit_dml(&mut self, node: &dyn SyntaxNode) {
        let Some(target) = node.child(NodeRole::Target) else {
            return;
        };
        if simple_name(target.name().unwrap_or_else(|| target.text())).is_none() {
            return;
        }
        self.unsuppress(target.range());
        self.unsuppress(name_range(target));
    }
}
