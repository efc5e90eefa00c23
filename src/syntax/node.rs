//! Parse-tree nodes as seen by the symbol collector.

use crate::base::Range;

use super::listener::{Construct, ParseListener, ParseTree};

/// Named child slots a node can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// The declared or referenced name
    Identifier,
    /// The declared type (field, variable, parameter, return, cast, instanceof, new)
    TypeRef,
    /// `extends` target of a class
    SuperType,
    /// `implements` targets of a class, `extends` targets of an interface
    Interface,
    /// Formal parameter (identifier + type ref)
    Parameter,
    /// Call argument expression
    Argument,
    /// Constant of an enum declaration
    EnumValue,
    /// Left-hand side of an assignment, DML operand
    Target,
    /// Right-hand side of an assignment, initializer of a declaration
    Value,
    /// Assignment operator or DML verb
    Operator,
    /// Step of a dotted chain that is a call (`b()` in `a.b().c`)
    CallStep,
    /// Step of a dotted chain that is an access (`a`, `c` in `a.b().c`)
    AccessStep,
    /// Selected field of a SOQL query
    Field,
    /// Bind variable (`:name`) of a SOQL/SOSL query
    Bind,
    /// Named or positional parameter of an annotation
    AnnotationParameter,
    /// Nested declarations and statements
    Body,
}

/// A node handed to the collector by the parser collaborator.
///
/// Only `text`, `range` and `slots` are required; everything else is derived.
pub trait SyntaxNode {
    /// Source text covered by the node.
    fn text(&self) -> &str;

    /// Source range of the node.
    fn range(&self) -> Range;

    /// All slotted children, in source order.
    fn slots(&self) -> Vec<(NodeRole, &dyn SyntaxNode)>;

    /// First child in the given slot.
    fn child(&self, role: NodeRole) -> Option<&dyn SyntaxNode> {
        self.slots()
            .into_iter()
            .find(|(r, _)| *r == role)
            .map(|(_, node)| node)
    }

    /// All children in the given slot, in source order.
    fn children(&self, role: NodeRole) -> Vec<&dyn SyntaxNode> {
        self.slots()
            .into_iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, node)| node)
            .collect()
    }

    fn identifier(&self) -> Option<&dyn SyntaxNode> {
        self.child(NodeRole::Identifier)
    }

    fn type_ref(&self) -> Option<&dyn SyntaxNode> {
        self.child(NodeRole::TypeRef)
    }

    fn parameters(&self) -> Vec<&dyn SyntaxNode> {
        self.children(NodeRole::Parameter)
    }

    fn arguments(&self) -> Vec<&dyn SyntaxNode> {
        self.children(NodeRole::Argument)
    }

    /// Text of the identifier child, if any.
    fn name(&self) -> Option<&str> {
        self.identifier().map(|id| id.text())
    }
}

/// Owned parse-tree node.
///
/// Doubles as a [`ParseTree`]: walking it emits `enter`/`exit` for every node that
/// carries a [`Construct`]. Modifier and annotation children are walked before the
/// owning construct is entered, mirroring a grammar where modifiers precede the
/// declaration they apply to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeNode {
    construct: Option<Construct>,
    text: String,
    range: Range,
    slots: Vec<(NodeRole, TreeNode)>,
    leading: Vec<TreeNode>,
}

impl TreeNode {
    /// A plain node without a construct (identifiers, type names, operands).
    pub fn leaf(text: impl Into<String>, range: Range) -> Self {
        Self {
            construct: None,
            text: text.into(),
            range,
            slots: Vec::new(),
            leading: Vec::new(),
        }
    }

    /// A node that emits enter/exit events for `construct`.
    pub fn construct(construct: Construct, text: impl Into<String>, range: Range) -> Self {
        Self {
            construct: Some(construct),
            ..Self::leaf(text, range)
        }
    }

    pub fn construct_kind(&self) -> Option<Construct> {
        self.construct
    }

    /// Append a slotted child.
    pub fn with(mut self, role: NodeRole, child: TreeNode) -> Self {
        self.slots.push((role, child));
        self
    }

    /// Append several children to the same slot.
    pub fn with_all(mut self, role: NodeRole, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.slots
            .extend(children.into_iter().map(|child| (role, child)));
        self
    }

    /// Attach a modifier or annotation node that is walked before this node.
    pub fn with_leading(mut self, node: TreeNode) -> Self {
        self.leading.push(node);
        self
    }

    pub fn push(&mut self, role: NodeRole, child: TreeNode) {
        self.slots.push((role, child));
    }

    pub fn set_range(&mut self, range: Range) {
        self.range = range;
    }
}

impl SyntaxNode for TreeNode {
    fn text(&self) -> &str {
        &self.text
    }

    fn range(&self) -> Range {
        self.range
    }

    fn slots(&self) -> Vec<(NodeRole, &dyn SyntaxNode)> {
        self.slots
            .iter()
            .map(|(role, node)| (*role, node as &dyn SyntaxNode))
            .collect()
    }
}

impl ParseTree for TreeNode {
    fn walk(&self, listener: &mut dyn ParseListener) {
        for node in &self.leading {
            node.walk(listener);
        }
        if let Some(construct) = self.construct {
            listener.enter(construct, self);
        }
        for (_, child) in &self.slots {
            child.walk(listener);
        }
        if let Some(construct) = self.construct {
            listener.exit(construct, self);
        }
    }
}
