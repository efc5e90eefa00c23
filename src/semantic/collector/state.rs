//! Mutable traversal state of the collector.

use smol_str::SmolStr;

use crate::base::Range;
use crate::semantic::symbol_table::{Annotation, Modifiers, ScopeKind, SymbolId};
use crate::syntax::Construct;

/// One entry of the scope stack.
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    /// The block symbol of this scope
    pub id: SymbolId,
    pub kind: ScopeKind,
    /// Path segment contributed to the keys of symbols declared inside
    pub name: SmolStr,
    /// Construct that opened the scope
    pub construct: Construct,
    /// Type or method the scope represents (class and method scopes only)
    pub owner: Option<SymbolId>,
}

/// Modifiers and annotations seen since the last declaration.
#[derive(Debug, Clone, Default)]
pub(super) struct PendingDeclaration {
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
}

impl PendingDeclaration {
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers == Modifiers::default() && self.annotations.is_empty()
    }
}

/// A step of a dotted chain.
#[derive(Debug, Clone)]
pub(super) struct ChainStep {
    pub name: String,
    pub range: Range,
    pub is_call: bool,
}

/// A dotted chain being collected.
#[derive(Debug, Clone)]
pub(super) struct ChainFrame {
    pub range: Range,
    pub steps: Vec<ChainStep>,
}

/// The scope kind a construct opens, if any.
pub(super) fn scope_kind_for(construct: Construct) -> Option<ScopeKind> {
    use Construct::*;
    let kind = match construct {
        CompilationUnit | TriggerUnit => ScopeKind::File,
        ClassDeclaration | InterfaceDeclaration | EnumDeclaration => ScopeKind::Class,
        MethodDeclaration | InterfaceMethodDeclaration | ConstructorDeclaration => {
            ScopeKind::Method
        }
        Block => ScopeKind::Block,
        IfStatement => ScopeKind::If,
        WhileStatement => ScopeKind::While,
        ForStatement => ScopeKind::For,
        DoWhileStatement => ScopeKind::DoWhile,
        TryStatement => ScopeKind::Try,
        CatchClause => ScopeKind::Catch,
        FinallyBlock => ScopeKind::Finally,
        SwitchStatement => ScopeKind::Switch,
        WhenControl => ScopeKind::When,
        RunAsStatement => ScopeKind::RunAs,
        GetterBlock => ScopeKind::Getter,
        SetterBlock => ScopeKind::Setter,
        _ => return None,
    };
    Some(kind)
}

/// Scope kinds a construct pushes on entry, outermost first.
///
/// A trigger opens the file scope and the scope of its body.
pub(super) fn scopes_opened_by(construct: Construct) -> Vec<ScopeKind> {
    match construct {
        Construct::TriggerUnit => vec![ScopeKind::File, ScopeKind::Class],
        other => scope_kind_for(other).into_iter().collect(),
    }
}
