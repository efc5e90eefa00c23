//! # Symbol Collection
//!
//! Single-pass construction of a [`SymbolTable`] from parse-tree enter/exit callbacks.
//!
//! The collector keeps an explicit scope stack. Every scope-opening construct pushes a
//! block symbol on entry and pops it on exit; the block's parent is the enclosing
//! scope, or for class and method bodies the type or method symbol the body belongs
//! to. Members are parented to the block, never directly to the type.
//!
//! Construct handlers return [`SemanticResult`]. An error is recorded against the
//! construct's range and the walk continues; scopes a failed handler did not get to
//! open are still pushed so that the matching exits stay balanced.

mod blocks;
mod chains;
mod declarations;
mod expressions;
mod rules;
mod state;

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::base::{Location, Range};
use crate::semantic::symbol_table::{
    AccessType, ReferenceContext, ScopeKind, Symbol, SymbolDetails, SymbolId, SymbolKey,
    SymbolKind, SymbolTable, TypeReference,
};
use crate::semantic::types::{SemanticError, SemanticResult};
use crate::syntax::{Construct, ParseListener, ParseTree, ParsedDocument, SyntaxNode};

pub use state::ScopeFrame;
use state::{ChainFrame, PendingDeclaration, scopes_opened_by};

/// Output of one collection pass.
#[derive(Debug, Clone, Default)]
pub struct CollectionResult {
    pub table: SymbolTable,
    pub errors: Vec<SemanticError>,
}

/// Parse listener that builds a symbol table.
pub struct SymbolCollector {
    table: SymbolTable,
    namespace: Option<SmolStr>,
    scopes: Vec<ScopeFrame>,
    pending: PendingDeclaration,
    errors: Vec<SemanticError>,
    /// Dotted chains currently open, innermost last
    chains: Vec<ChainFrame>,
    /// Identifier ranges whose reference callbacks are skipped
    suppressed: Vec<Range>,
    /// Dotted assignment targets and how they are written
    write_targets: Vec<(Range, AccessType)>,
    block_counter: u32,
}

impl SymbolCollector {
    pub fn new(file_uri: impl Into<SmolStr>) -> Self {
        Self {
            table: SymbolTable::new(file_uri),
            namespace: None,
            scopes: Vec::new(),
            pending: PendingDeclaration::default(),
            errors: Vec::new(),
            chains: Vec::new(),
            suppressed: Vec::new(),
            write_targets: Vec::new(),
            block_counter: 0,
        }
    }

    /// Prefix type FQNs with a package namespace.
    pub fn with_namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Walk `tree` and return the populated table.
    pub fn collect(tree: &dyn ParseTree, file_uri: &str) -> CollectionResult {
        let mut collector = Self::new(file_uri);
        tree.walk(&mut collector);
        collector.finish()
    }

    /// Collect a parsed document; a document without a tree yields an empty table.
    pub fn collect_document(document: &ParsedDocument, file_uri: &str) -> CollectionResult {
        match &document.tree {
            Some(tree) => Self::collect(tree.as_ref(), file_uri),
            None => CollectionResult {
                table: SymbolTable::new(file_uri),
                errors: Vec::new(),
            },
        }
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn scope_stack(&self) -> &[ScopeFrame] {
        &self.scopes
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn finish(self) -> CollectionResult {
        if !self.scopes.is_empty() {
            warn!(
                "[COLLECTOR] {} scopes still open at end of {}",
                self.scopes.len(),
                self.table.file_uri()
            );
        }
        debug!(
            "[COLLECTOR] {}: {} symbols, {} references, {} errors",
            self.table.file_uri(),
            self.table.len(),
            self.table.references().len(),
            self.errors.len()
        );
        CollectionResult {
            table: self.table,
            errors: self.errors,
        }
    }

    // ============================================================
    // Scope stack
    // ============================================================

    fn current_scope(&self) -> Option<&ScopeFrame> {
        self.scopes.last()
    }

    fn current_scope_id(&self) -> Option<SymbolId> {
        self.current_scope().map(|frame| frame.id.clone())
    }

    /// Key path of symbols declared in the current scope.
    fn current_path(&self) -> Vec<SmolStr> {
        self.scopes.iter().map(|frame| frame.name.clone()).collect()
    }

    /// Nearest enclosing type or method symbol.
    fn current_owner(&self) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.owner.as_ref())
            .and_then(|id| self.table.get(id))
    }

    /// Nearest enclosing type symbol.
    fn current_type(&self) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .filter(|frame| frame.kind == ScopeKind::Class)
            .find_map(|frame| frame.owner.as_ref())
            .and_then(|id| self.table.get(id))
    }

    fn next_block_name(&mut self, kind: ScopeKind) -> SmolStr {
        self.block_counter += 1;
        SmolStr::new(format!("{}_{}", kind.prefix(), self.block_counter))
    }

    /// Create a block symbol and push it.
    ///
    /// `owner` is the type or method the scope represents; the block is parented to it
    /// when present, otherwise to the enclosing scope.
    fn push_scope(
        &mut self,
        kind: ScopeKind,
        key_name: SmolStr,
        display_name: &str,
        owner: Option<SymbolId>,
        construct: Construct,
        location: Location,
    ) -> SymbolId {
        let key = SymbolKey::new(self.current_path(), SymbolKind::Block, key_name.clone());
        let parent = owner.clone().or_else(|| self.current_scope_id());
        let mut block = Symbol::new(self.table.file_uri(), key.clone(), display_name, location)
            .with_parent(parent)
            .with_details(SymbolDetails::Block { scope_kind: kind });
        block.id = self.table.allocate_id(&key);
        let id = self.table.add_symbol(block);
        trace!("[COLLECTOR] push {:?} scope {}", kind, id);
        self.scopes.push(ScopeFrame {
            id: id.clone(),
            kind,
            name: key_name,
            construct,
            owner,
        });
        id
    }

    /// Pop the top scope, warning when it is not the expected kind.
    fn pop_scope(&mut self, expected: ScopeKind, construct: Construct) {
        match self.scopes.pop() {
            Some(frame) if frame.kind != expected => warn!(
                "[COLLECTOR] scope mismatch on exit of {}: expected {:?}, popped {:?} ({})",
                construct.display(),
                expected,
                frame.kind,
                frame.id
            ),
            Some(frame) => trace!("[COLLECTOR] pop {:?} scope {}", frame.kind, frame.id),
            None => warn!(
                "[COLLECTOR] scope stack empty on exit of {}",
                construct.display()
            ),
        }
    }

    // ============================================================
    // Symbol and reference helpers
    // ============================================================

    /// A symbol declared in the current scope with a collision-free id.
    fn new_symbol(
        &self,
        kind: SymbolKind,
        key_name: &str,
        name: &str,
        location: Location,
    ) -> Symbol {
        let key = SymbolKey::new(self.current_path(), kind, key_name);
        let mut symbol = Symbol::new(self.table.file_uri(), key.clone(), name, location)
            .with_parent(self.current_scope_id())
            .with_namespace(self.namespace.clone());
        symbol.id = self.table.allocate_id(&key);
        symbol
    }

    /// Non-block symbols declared directly in the current scope.
    fn current_scope_symbols(&self) -> Vec<&Symbol> {
        match self.current_scope() {
            Some(frame) => self
                .table
                .children_of(&frame.id)
                .into_iter()
                .filter(|s| !s.is_scope())
                .collect(),
            None => Vec::new(),
        }
    }

    /// A reference tagged with the enclosing method or type.
    fn reference(
        &self,
        name: impl Into<String>,
        location: Location,
        context: ReferenceContext,
    ) -> TypeReference {
        let owner = self.current_owner();
        TypeReference::new(name, location, context).with_context(
            owner.map(|s| s.name.clone()),
            owner.map(|s| s.id.clone()),
        )
    }

    fn emit(&mut self, reference: TypeReference) {
        trace!(
            "[COLLECTOR] reference {} ({})",
            reference.name,
            reference.context.display()
        );
        self.table.add_type_reference(reference);
    }

    fn error(&mut self, error: SemanticError) {
        debug!(
            "[COLLECTOR] {} at {}:{}: {}",
            self.table.file_uri(),
            error.location.start.line,
            error.location.start.column,
            error.message
        );
        self.errors.push(error);
    }

    fn is_suppressed(&self, range: Range) -> bool {
        self.suppressed.contains(&range)
    }

    fn unsuppress(&mut self, range: Range) {
        if let Some(index) = self.suppressed.iter().rposition(|r| *r == range) {
            self.suppressed.remove(index);
        }
    }

    fn dispatch_enter(&mut self, construct: Construct, node: &dyn SyntaxNode) -> SemanticResult<()> {
        use Construct::*;
        match construct {
            CompilationUnit => self.enter_compilation_unit(node),
            TriggerUnit => self.enter_trigger(node),
            ClassDeclaration | InterfaceDeclaration | EnumDeclaration => {
                self.enter_type(construct, node)
            }
            MethodDeclaration | InterfaceMethodDeclaration | ConstructorDeclaration => {
                self.enter_method(construct, node)
            }
            FieldDeclaration | PropertyDeclaration => self.enter_field(construct, node),
            LocalVariableDeclaration => self.enter_local_variable(node),
            Block | IfStatement | WhileStatement | ForStatement | DoWhileStatement
            | TryStatement | CatchClause | FinallyBlock | SwitchStatement | WhenControl
            | RunAsStatement | GetterBlock | SetterBlock => self.enter_block(construct, node),
            Modifier => self.enter_modifier(node),
            Annotation => self.enter_annotation(node),
            MethodCall => self.enter_method_call(node),
            DotExpression => self.enter_dot_expression(node),
            IdentifierPrimary => self.enter_identifier(node),
            NewExpression => self.enter_new(node),
            CastExpression | InstanceOfExpression => self.enter_type_test(construct, node),
            Assignment => self.enter_assignment(node),
            SoqlQuery => self.enter_soql(node),
            SoslQuery => self.enter_sosl(node),
            DmlStatement => self.enter_dml(node),
        }
    }
}

impl ParseListener for SymbolCollector {
    fn enter(&mut self, construct: Construct, node: &dyn SyntaxNode) {
        let depth = self.scopes.len();
        if let Err(err) = self.dispatch_enter(construct, node) {
            self.error(err);
        }

        // Keep enter/exit balanced when a handler bailed out before opening its scopes.
        let opened = scopes_opened_by(construct);
        let pushed = self.scopes.len().saturating_sub(depth);
        for kind in opened.into_iter().skip(pushed) {
            let name = self.next_block_name(kind);
            self.push_scope(
                kind,
                name.clone(),
                &name,
                None,
                construct,
                Location::single(node.range()),
            );
        }
    }

    fn exit(&mut self, construct: Construct, node: &dyn SyntaxNode) {
        match construct {
            Construct::DotExpression => self.exit_dot_expression(node),
            Construct::Assignment => self.exit_assignment(node),
            Construct::DmlStatement => self.exit_dml(node),
            _ => {}
        }
        for kind in scopes_opened_by(construct).into_iter().rev() {
            self.pop_scope(kind, construct);
        }
    }
}

#[cfg(test)]
mod tests;
