//! Dotted chains (`a.b().c`) and their right-to-left narrowing.
//!
//! A chain is collected as one frame holding its steps. On exit the rightmost step
//! keeps its syntactic context (call or access) and every step to its left is
//! classified as a class reference when it names a standard-library class or a
//! variable in scope, and as an ambiguous chain step otherwise. The result is one
//! chained reference whose `chain_nodes` hold the classified steps. Chains rooted at
//! `this` are expanded into plain member references instead.

use tracing::warn;

use crate::base::constants::{
    THIS_KEYWORD, TRIGGER_CLASS, is_builtin_class, is_trigger_context_variable,
};
use crate::base::{Location, Range};
use crate::semantic::symbol_table::{
    AccessType, HierarchicalReference, ReferenceContext, TypeReference,
};
use crate::semantic::types::{SemanticError, SemanticResult};
use crate::syntax::{NodeRole, SyntaxNode};

use super::SymbolCollector;
use super::state::{ChainFrame, ChainStep};

impl SymbolCollector {
    pub(super) fn enter_dot_expression(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let steps: Vec<ChainStep> = node
            .slots()
            .into_iter()
            .filter(|(role, _)| matches!(role, NodeRole::CallStep | NodeRole::AccessStep))
            .map(|(role, step)| ChainStep {
                name: step.name().unwrap_or_else(|| step.text()).trim().to_string(),
                range: step.identifier().map_or(step.range(), |i| i.range()),
                is_call: role == NodeRole::CallStep,
            })
            .collect();
        if steps.is_empty() {
            return Err(SemanticError::malformed(
                "dot expression",
                "steps",
                node.range(),
            ));
        }
        for step in &steps {
            self.suppressed.push(step.range);
        }
        self.chains.push(ChainFrame {
            range: node.range(),
            steps,
        });
        Ok(())
    }

    pub(super) fn exit_dot_expression(&mut self, node: &dyn SyntaxNode) {
        match self.chains.last() {
            Some(frame) if frame.range == node.range() => {}
            Some(frame) => {
                warn!(
                    "[COLLECTOR] chain mismatch: open chain at {:?}, exiting {:?}",
                    frame.range.start,
                    node.range().start
                );
                return;
            }
            // Entry failed and was already reported.
            None => return,
        }
        let Some(frame) = self.chains.pop() else {
            return;
        };
        for step in &frame.steps {
            self.unsuppress(step.range);
        }
        let access = self
            .write_targets
            .iter()
            .rev()
            .find(|(range, _)| *range == frame.range)
            .map(|(_, access)| *access);

        if frame.steps[0].name.eq_ignore_ascii_case(THIS_KEYWORD) {
            self.expand_this_chain(&frame, access);
        } else {
            self.narrow_chain(&frame, access);
        }
    }

    /// `this.a.b()` becomes a field reference `a` and a method reference `b`.
    fn expand_this_chain(&mut self, frame: &ChainFrame, access: Option<AccessType>) {
        let last = frame.steps.len() - 1;
        for (index, step) in frame.steps.iter().enumerate().skip(1) {
            let context = if step.is_call {
                ReferenceContext::MethodCall
            } else {
                ReferenceContext::FieldAccess
            };
            let mut reference = self
                .reference(
                    step.name.clone(),
                    Location::new(frame.range, step.range),
                    context,
                )
                .with_qualifier(frame.steps[index - 1].name.clone())
                .with_static(false);
            if index == last {
                if let Some(access) = access {
                    reference = reference.with_access(access);
                }
            }
            self.emit(reference);
        }
    }

    fn narrow_chain(&mut self, frame: &ChainFrame, access: Option<AccessType>) {
        let steps = &frame.steps;
        let last = steps.len() - 1;
        let rooted_at_trigger = steps[0].name.eq_ignore_ascii_case(TRIGGER_CLASS);

        let mut nodes: Vec<TypeReference> = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate().rev() {
            let (context, is_static) = if step.is_call {
                (ReferenceContext::MethodCall, None)
            } else if index == last {
                if rooted_at_trigger && index == 1 && is_trigger_context_variable(&step.name) {
                    (ReferenceContext::TriggerContextVariable, Some(true))
                } else {
                    (ReferenceContext::FieldAccess, None)
                }
            } else if is_builtin_class(&step.name) {
                (ReferenceContext::ClassReference, Some(true))
            } else if self.is_variable_in_scope(&step.name) {
                (ReferenceContext::ClassReference, Some(false))
            } else {
                (ReferenceContext::ChainStep, None)
            };

            let mut reference = self.reference(
                step.name.clone(),
                Location::new(frame.range, step.range),
                context,
            );
            reference.is_static = is_static;
            if index > 0 {
                reference.qualifier = Some(steps[index - 1].name.clone());
            }
            if index == last {
                reference.access = access;
            }
            nodes.push(reference);
        }
        nodes.reverse();

        let name = steps
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        let identifier = Range::new(steps[0].range.start, steps[last].range.end);
        if let Some(hierarchy) = HierarchicalReference::from_steps(&nodes) {
            self.table.add_hierarchical_reference(hierarchy);
        }
        let mut chained = self.reference(
            name,
            Location::new(frame.range, identifier),
            ReferenceContext::ChainedType,
        );
        chained.access = access;
        chained.chain_nodes = nodes;
        self.emit(chained);
    }

    fn is_variable_in_scope(&self, name: &str) -> bool {
        self.current_scope_id()
            .and_then(|scope| self.table.lookup_from_scope(name, &scope))
            .is_some_and(|symbol| symbol.kind.is_variable_like())
    }
}
