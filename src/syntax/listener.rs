//! Typed traversal callbacks and the parser seam used by the diagnostic pipeline.

use crate::base::Range;

use super::node::SyntaxNode;

/// Syntactic constructs the parser reports through enter/exit callbacks.
///
/// Each variant documents the slots the collector reads from its node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Construct {
    /// A class/interface/enum source file
    CompilationUnit,
    /// A trigger source file: `Identifier` = trigger name, `TypeRef` = SObject
    TriggerUnit,
    /// `Identifier`, optional `SuperType`, `Interface`*, `Body`*
    ClassDeclaration,
    /// `Identifier`, `Interface`* (extended interfaces), `Body`*
    InterfaceDeclaration,
    /// `Identifier`, `EnumValue`* (each an identifier leaf)
    EnumDeclaration,
    /// `Identifier`, `TypeRef` (return type, `void` allowed), `Parameter`*, `Body`*
    MethodDeclaration,
    /// Same slots as a method declaration, no body
    InterfaceMethodDeclaration,
    /// `Identifier`, `Parameter`*, `Body`*
    ConstructorDeclaration,
    /// `TypeRef`, `Identifier`, optional `Value`
    FieldDeclaration,
    /// `TypeRef`, `Identifier`, `Body`* (getter/setter blocks)
    PropertyDeclaration,
    /// `TypeRef`, `Identifier`, optional `Value`
    LocalVariableDeclaration,
    /// A generic `{ ... }` block
    Block,
    IfStatement,
    WhileStatement,
    /// A classic for loop; an enhanced for loop additionally carries `TypeRef` and
    /// `Identifier` for the element variable
    ForStatement,
    DoWhileStatement,
    TryStatement,
    /// `TypeRef` = exception type, `Identifier` = exception variable
    CatchClause,
    FinallyBlock,
    SwitchStatement,
    WhenControl,
    /// `System.runAs(...) { ... }`
    RunAsStatement,
    GetterBlock,
    SetterBlock,
    /// Node text is the modifier keyword
    Modifier,
    /// `Identifier` = annotation name, `AnnotationParameter`* (text `name=value` or `value`)
    Annotation,
    /// Unqualified call: `Identifier`, `Argument`*
    MethodCall,
    /// Dotted chain: `AccessStep` / `CallStep` children in source order
    DotExpression,
    /// A bare name used as an expression
    IdentifierPrimary,
    /// `new T(...)`: `TypeRef` (may be generic), `Argument`*
    NewExpression,
    /// `(T) expr`: `TypeRef`
    CastExpression,
    /// `expr instanceof T`: `TypeRef`
    InstanceOfExpression,
    /// `Target`, `Operator` (`=`, `+=`, ...), `Value`
    Assignment,
    /// `TypeRef` = FROM object, `Field`*, `Bind`*
    SoqlQuery,
    /// `TypeRef`* = RETURNING objects, `Bind`*
    SoslQuery,
    /// `Operator` = DML verb (`insert`, `update`, ...), `Target` = operand
    DmlStatement,
}

impl Construct {
    /// Human readable name used in log messages and semantic errors.
    pub fn display(&self) -> &'static str {
        match self {
            Construct::CompilationUnit => "compilation unit",
            Construct::TriggerUnit => "trigger",
            Construct::ClassDeclaration => "class declaration",
            Construct::InterfaceDeclaration => "interface declaration",
            Construct::EnumDeclaration => "enum declaration",
            Construct::MethodDeclaration => "method declaration",
            Construct::InterfaceMethodDeclaration => "interface method declaration",
            Construct::ConstructorDeclaration => "constructor declaration",
            Construct::FieldDeclaration => "field declaration",
            Construct::PropertyDeclaration => "property declaration",
            Construct::LocalVariableDeclaration => "local variable declaration",
            Construct::Block => "block",
            Construct::IfStatement => "if statement",
            Construct::WhileStatement => "while statement",
            Construct::ForStatement => "for statement",
            Construct::DoWhileStatement => "do-while statement",
            Construct::TryStatement => "try statement",
            Construct::CatchClause => "catch clause",
            Construct::FinallyBlock => "finally block",
            Construct::SwitchStatement => "switch statement",
            Construct::WhenControl => "when control",
            Construct::RunAsStatement => "runAs statement",
            Construct::GetterBlock => "getter",
            Construct::SetterBlock => "setter",
            Construct::Modifier => "modifier",
            Construct::Annotation => "annotation",
            Construct::MethodCall => "method call",
            Construct::DotExpression => "dotted expression",
            Construct::IdentifierPrimary => "identifier",
            Construct::NewExpression => "new expression",
            Construct::CastExpression => "cast expression",
            Construct::InstanceOfExpression => "instanceof expression",
            Construct::Assignment => "assignment",
            Construct::SoqlQuery => "SOQL query",
            Construct::SoslQuery => "SOSL query",
            Construct::DmlStatement => "DML statement",
        }
    }
}

/// Receiver of traversal callbacks.
pub trait ParseListener {
    fn enter(&mut self, construct: Construct, node: &dyn SyntaxNode);
    fn exit(&mut self, construct: Construct, node: &dyn SyntaxNode);
}

/// A parse tree that can replay itself as enter/exit callbacks.
pub trait ParseTree: Send + Sync {
    fn walk(&self, listener: &mut dyn ParseListener);
}

/// A syntax error reported by the parser collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub range: Range,
    pub message: String,
}

impl SyntaxError {
    pub fn new(range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

/// Result of parsing one document.
///
/// `tree` is `None` when the parser could not produce anything usable; syntax errors
/// are still reported.
pub struct ParsedDocument {
    pub tree: Option<Box<dyn ParseTree>>,
    pub errors: Vec<SyntaxError>,
}

impl ParsedDocument {
    pub fn new(tree: impl ParseTree + 'static, errors: Vec<SyntaxError>) -> Self {
        Self {
            tree: Some(Box::new(tree)),
            errors,
        }
    }

    pub fn failed(errors: Vec<SyntaxError>) -> Self {
        Self { tree: None, errors }
    }
}

/// The grammar-driven parser, seen from the diagnostic pipeline.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, uri: &str, text: &str) -> ParsedDocument;
}
