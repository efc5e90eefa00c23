//! Constructors for [`TreeNode`] parse trees.
//!
//! Hosts that adapt a foreign parse tree and the tests use these to produce trees in
//! the shape the collector expects. Positions are synthesised from a line number and,
//! for expressions, a start column: declarations start at column 0 and their name is
//! placed after the keyword, slots appended later continue to the right.
//!
//! ```ignore
//! use apexls::syntax::build::*;
//!
//! let tree = compilation_unit(vec![
//!     class("Account", 0).modifiers(&["public"]).ends(4).body(vec![
//!         field("String", "name", 1),
//!         method("void", "save", 2).param("Boolean", "force").ends(3),
//!     ]),
//! ]);
//! ```

use crate::base::Range;

use super::listener::Construct;
use super::node::{NodeRole, SyntaxNode, TreeNode};

fn span(line: u32, col: u32, text: &str) -> Range {
    Range::from_coords(line, col, line, col + text.chars().count() as u32)
}

fn leaf_at(text: &str, line: u32, col: u32) -> TreeNode {
    TreeNode::leaf(text, span(line, col, text))
}

/// Column right after the right-most slot on the node's first line.
fn next_col(node: &TreeNode) -> u32 {
    let line = node.range().start.line;
    node.slots()
        .iter()
        .map(|(_, child)| child.range())
        .filter(|r| r.end.line == line)
        .map(|r| r.end.column + 1)
        .max()
        .unwrap_or(node.range().start.column)
}

fn declaration(construct: Construct, keyword: &str, name: &str, line: u32) -> TreeNode {
    let col = keyword.len() as u32 + 1;
    let text = format!("{keyword} {name}");
    TreeNode::construct(construct, text.clone(), span(line, 0, &text))
        .with(NodeRole::Identifier, leaf_at(name, line, col))
}

fn typed_declaration(construct: Construct, type_name: &str, name: &str, line: u32) -> TreeNode {
    let name_col = type_name.chars().count() as u32 + 1;
    let text = format!("{type_name} {name}");
    TreeNode::construct(construct, text.clone(), span(line, 0, &text))
        .with(NodeRole::TypeRef, leaf_at(type_name, line, 0))
        .with(NodeRole::Identifier, leaf_at(name, line, name_col))
}

/// A class/interface/enum source file.
pub fn compilation_unit(members: Vec<TreeNode>) -> TreeNode {
    let end = members
        .iter()
        .map(|m| m.range().end.line)
        .max()
        .unwrap_or(0);
    TreeNode::construct(
        Construct::CompilationUnit,
        "",
        Range::from_coords(0, 0, end + 1, 0),
    )
    .with_all(NodeRole::Body, members)
}

/// A trigger source file on `sobject`.
pub fn trigger_unit(name: &str, sobject: &str, line: u32, body: Vec<TreeNode>) -> TreeNode {
    let end = body.iter().map(|m| m.range().end.line).max().unwrap_or(line);
    let text = format!("trigger {name} on {sobject}");
    let sobject_col = 8 + name.len() as u32 + 4;
    TreeNode::construct(
        Construct::TriggerUnit,
        text,
        Range::from_coords(line, 0, end + 1, 1),
    )
    .with(NodeRole::Identifier, leaf_at(name, line, 8))
    .with(NodeRole::TypeRef, leaf_at(sobject, line, sobject_col))
    .with_all(NodeRole::Body, body)
}

pub fn class(name: &str, line: u32) -> TreeNode {
    declaration(Construct::ClassDeclaration, "class", name, line)
}

pub fn interface(name: &str, line: u32) -> TreeNode {
    declaration(Construct::InterfaceDeclaration, "interface", name, line)
}

pub fn enum_decl(name: &str, line: u32, values: &[&str]) -> TreeNode {
    let mut node = declaration(Construct::EnumDeclaration, "enum", name, line);
    for value in values {
        let col = next_col(&node);
        node.push(NodeRole::EnumValue, leaf_at(value, line, col));
    }
    node
}

pub fn method(return_type: &str, name: &str, line: u32) -> TreeNode {
    typed_declaration(Construct::MethodDeclaration, return_type, name, line)
}

pub fn interface_method(return_type: &str, name: &str, line: u32) -> TreeNode {
    typed_declaration(Construct::InterfaceMethodDeclaration, return_type, name, line)
}

pub fn constructor(name: &str, line: u32) -> TreeNode {
    let text = format!("{name}()");
    TreeNode::construct(Construct::ConstructorDeclaration, text.clone(), span(line, 0, &text))
        .with(NodeRole::Identifier, leaf_at(name, line, 0))
}

pub fn field(type_name: &str, name: &str, line: u32) -> TreeNode {
    typed_declaration(Construct::FieldDeclaration, type_name, name, line)
}

pub fn property(type_name: &str, name: &str, line: u32) -> TreeNode {
    typed_declaration(Construct::PropertyDeclaration, type_name, name, line)
}

pub fn local_var(type_name: &str, name: &str, line: u32) -> TreeNode {
    typed_declaration(Construct::LocalVariableDeclaration, type_name, name, line)
}

/// A block-like statement spanning `line..=end_line`.
pub fn scope(construct: Construct, line: u32, end_line: u32, body: Vec<TreeNode>) -> TreeNode {
    TreeNode::construct(
        construct,
        construct.display(),
        Range::from_coords(line, 0, end_line, 1),
    )
    .with_all(NodeRole::Body, body)
}

pub fn block(line: u32, end_line: u32, body: Vec<TreeNode>) -> TreeNode {
    scope(Construct::Block, line, end_line, body)
}

pub fn if_stmt(line: u32, end_line: u32, body: Vec<TreeNode>) -> TreeNode {
    scope(Construct::IfStatement, line, end_line, body)
}

pub fn while_stmt(line: u32, end_line: u32, body: Vec<TreeNode>) -> TreeNode {
    scope(Construct::WhileStatement, line, end_line, body)
}

pub fn for_stmt(line: u32, end_line: u32, body: Vec<TreeNode>) -> TreeNode {
    scope(Construct::ForStatement, line, end_line, body)
}

/// `for (Type var : ...) { body }`
pub fn for_each(
    type_name: &str,
    var: &str,
    line: u32,
    end_line: u32,
    body: Vec<TreeNode>,
) -> TreeNode {
    let type_col = 5;
    let var_col = type_col + type_name.chars().count() as u32 + 1;
    TreeNode::construct(
        Construct::ForStatement,
        format!("for ({type_name} {var} : ...)"),
        Range::from_coords(line, 0, end_line, 1),
    )
    .with(NodeRole::TypeRef, leaf_at(type_name, line, type_col))
    .with(NodeRole::Identifier, leaf_at(var, line, var_col))
    .with_all(NodeRole::Body, body)
}

pub fn try_stmt(line: u32, end_line: u32, body: Vec<TreeNode>) -> TreeNode {
    scope(Construct::TryStatement, line, end_line, body)
}

/// `catch (Type var) { body }`
pub fn catch_clause(
    type_name: &str,
    var: &str,
    line: u32,
    end_line: u32,
    body: Vec<TreeNode>,
) -> TreeNode {
    let type_col = 9;
    let var_col = type_col + type_name.chars().count() as u32 + 1;
    TreeNode::construct(
        Construct::CatchClause,
        format!("catch ({type_name} {var})"),
        Range::from_coords(line, 0, end_line, 1),
    )
    .with(NodeRole::TypeRef, leaf_at(type_name, line, type_col))
    .with(NodeRole::Identifier, leaf_at(var, line, var_col))
    .with_all(NodeRole::Body, body)
}

/// Bare identifier expression.
pub fn ident(name: &str, line: u32, col: u32) -> TreeNode {
    TreeNode::construct(Construct::IdentifierPrimary, name, span(line, col, name))
        .with(NodeRole::Identifier, leaf_at(name, line, col))
}

/// Unqualified method call `name(args)`.
pub fn call(name: &str, line: u32, col: u32, args: Vec<TreeNode>) -> TreeNode {
    let text = format!("{name}()");
    TreeNode::construct(Construct::MethodCall, text.clone(), span(line, col, &text))
        .with(NodeRole::Identifier, leaf_at(name, line, col))
        .with_all(NodeRole::Argument, args)
}

/// Dotted chain such as `a.b().c`; steps ending in `()` are calls.
pub fn chain(text: &str, line: u32, col: u32) -> TreeNode {
    let mut node = TreeNode::construct(Construct::DotExpression, text, span(line, col, text));
    let mut step_col = col;
    for part in text.split('.') {
        match part.strip_suffix("()") {
            Some(name) => {
                node.push(NodeRole::CallStep, leaf_at(name, line, step_col));
            }
            None => {
                node.push(NodeRole::AccessStep, leaf_at(part, line, step_col));
            }
        }
        step_col += part.chars().count() as u32 + 1;
    }
    node
}

/// `new Type()`
pub fn new_expr(type_name: &str, line: u32, col: u32) -> TreeNode {
    let text = format!("new {type_name}()");
    TreeNode::construct(Construct::NewExpression, text.clone(), span(line, col, &text))
        .with(NodeRole::TypeRef, leaf_at(type_name, line, col + 4))
}

/// `(Type) operand`
pub fn cast(type_name: &str, line: u32, col: u32, operand: TreeNode) -> TreeNode {
    let text = format!("({type_name}) {}", operand.text());
    TreeNode::construct(Construct::CastExpression, text.clone(), span(line, col, &text))
        .with(NodeRole::TypeRef, leaf_at(type_name, line, col + 1))
        .with(NodeRole::Value, operand)
}

/// `operand instanceof Type`
pub fn instance_of(operand: TreeNode, type_name: &str, line: u32) -> TreeNode {
    let col = operand.range().start.column;
    let type_col = operand.range().end.column + 12;
    let text = format!("{} instanceof {type_name}", operand.text());
    TreeNode::construct(Construct::InstanceOfExpression, text.clone(), span(line, col, &text))
        .with(NodeRole::Value, operand)
        .with(NodeRole::TypeRef, leaf_at(type_name, line, type_col))
}

/// `target op value`
pub fn assign(target: TreeNode, operator: &str, value: TreeNode) -> TreeNode {
    let start = target.range().start;
    let end = value.range().end;
    let op_col = target.range().end.column + 1;
    let text = format!("{} {operator} {}", target.text(), value.text());
    TreeNode::construct(Construct::Assignment, text, Range::new(start, end))
        .with(NodeRole::Target, target)
        .with(NodeRole::Operator, leaf_at(operator, start.line, op_col))
        .with(NodeRole::Value, value)
}

/// `[SELECT fields FROM object WHERE x = :bind]`
pub fn soql(from: &str, fields: &[&str], binds: &[&str], line: u32, col: u32) -> TreeNode {
    let text = format!(
        "[SELECT {} FROM {from}{}]",
        fields.join(", "),
        binds
            .iter()
            .map(|b| format!(" :{b}"))
            .collect::<String>()
    );
    let mut node = TreeNode::construct(Construct::SoqlQuery, text.clone(), span(line, col, &text));
    let mut cursor = col + 8;
    for f in fields {
        node.push(NodeRole::Field, leaf_at(f, line, cursor));
        cursor += f.chars().count() as u32 + 2;
    }
    cursor += 4;
    node.push(NodeRole::TypeRef, leaf_at(from, line, cursor));
    cursor += from.chars().count() as u32 + 2;
    for b in binds {
        node.push(NodeRole::Bind, leaf_at(b, line, cursor));
        cursor += b.chars().count() as u32 + 2;
    }
    node
}

/// `[FIND 'x' RETURNING objects]`
pub fn sosl(returning: &[&str], line: u32, col: u32) -> TreeNode {
    let text = format!("[FIND 'x' RETURNING {}]", returning.join(", "));
    let mut node = TreeNode::construct(Construct::SoslQuery, text.clone(), span(line, col, &text));
    let mut cursor = col + 20;
    for object in returning {
        node.push(NodeRole::TypeRef, leaf_at(object, line, cursor));
        cursor += object.chars().count() as u32 + 2;
    }
    node
}

/// `verb target;`
pub fn dml(verb: &str, target: TreeNode) -> TreeNode {
    let start = target.range().start;
    let line = start.line;
    let text = format!("{verb} {}", target.text());
    TreeNode::construct(
        Construct::DmlStatement,
        text,
        Range::from_coords(line, 0, line, target.range().end.column),
    )
    .with(NodeRole::Operator, leaf_at(verb, line, 0))
    .with(NodeRole::Target, target)
}

impl TreeNode {
    /// Precede this declaration with modifier keywords.
    pub fn modifiers(mut self, keywords: &[&str]) -> Self {
        let line = self.range().start.line;
        for keyword in keywords {
            self = self.with_leading(TreeNode::construct(
                Construct::Modifier,
                *keyword,
                span(line, 0, keyword),
            ));
        }
        self
    }

    /// Precede this declaration with an annotation such as `@IsTest(SeeAllData=true)`.
    pub fn annotated(self, name: &str, parameters: &[&str]) -> Self {
        let line = self.range().start.line;
        let mut annotation = TreeNode::construct(
            Construct::Annotation,
            format!("@{name}"),
            span(line, 0, name),
        )
        .with(NodeRole::Identifier, leaf_at(name, line, 1));
        for parameter in parameters {
            annotation.push(NodeRole::AnnotationParameter, leaf_at(parameter, line, 0));
        }
        self.with_leading(annotation)
    }

    /// `extends Base`
    pub fn extends(self, super_type: &str) -> Self {
        let line = self.range().start.line;
        let col = next_col(&self) + 8;
        self.with(NodeRole::SuperType, leaf_at(super_type, line, col))
    }

    /// `implements A, B` (or `extends A, B` on an interface)
    pub fn implements(mut self, interfaces: &[&str]) -> Self {
        let line = self.range().start.line;
        for name in interfaces {
            let col = next_col(&self) + 1;
            self.push(NodeRole::Interface, leaf_at(name, line, col));
        }
        self
    }

    /// Append a formal parameter.
    pub fn param(mut self, type_name: &str, name: &str) -> Self {
        let line = self.range().start.line;
        let col = next_col(&self);
        let name_col = col + type_name.chars().count() as u32 + 1;
        let text = format!("{type_name} {name}");
        let parameter = TreeNode::leaf(text.clone(), span(line, col, &text))
            .with(NodeRole::TypeRef, leaf_at(type_name, line, col))
            .with(NodeRole::Identifier, leaf_at(name, line, name_col));
        self.push(NodeRole::Parameter, parameter);
        self
    }

    /// Initializer expression of a field or variable.
    pub fn init(self, value: TreeNode) -> Self {
        self.with(NodeRole::Value, value)
    }

    /// Nested declarations or statements.
    pub fn body(self, members: Vec<TreeNode>) -> Self {
        self.with_all(NodeRole::Body, members)
    }

    /// Extend the node's range to end on `end_line`.
    pub fn ends(mut self, end_line: u32) -> Self {
        let start = self.range().start;
        self.set_range(Range::from_coords(start.line, start.column, end_line, 1));
        self
    }
}
