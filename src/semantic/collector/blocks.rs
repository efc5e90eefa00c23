//! Control-flow and accessor scopes.

use crate::base::Location;
use crate::semantic::symbol_table::{Modifiers, ReferenceContext, ScopeKind, TypeInfo};
use crate::semantic::types::SemanticResult;
use crate::syntax::{Construct, SyntaxNode};

use super::SymbolCollector;
use super::state::scope_kind_for;

impl SymbolCollector {
    pub(super) fn enter_block(
        &mut self,
        construct: Construct,
        node: &dyn SyntaxNode,
    ) -> SemanticResult<()> {
        self.discard_pending(construct);
        let kind = scope_kind_for(construct).unwrap_or(ScopeKind::Block);
        let name = self.next_block_name(kind);
        self.push_scope(
            kind,
            name.clone(),
            &name,
            None,
            construct,
            Location::single(node.range()),
        );

        match construct {
            // Enhanced for: `for (Type item : items)`
            Construct::ForStatement => {
                if let (Some(type_node), Some(ident)) = (node.type_ref(), node.identifier()) {
                    self.declare_variable(
                        ident,
                        node.range(),
                        TypeInfo::parse(type_node.text()),
                        None,
                        Modifiers::default(),
                    );
                    self.emit_type_references(type_node, ReferenceContext::TypeDeclaration);
                }
            }
            Construct::CatchClause => {
                if let Some(type_node) = node.type_ref() {
                    self.emit_type_references(type_node, ReferenceContext::ExceptionType);
                    if let Some(ident) = node.identifier() {
                        self.declare_variable(
                            ident,
                            node.range(),
                            TypeInfo::parse(type_node.text()),
                            None,
                            Modifiers::default(),
                        );
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
