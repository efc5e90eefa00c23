//! Non-declaring name usages recorded during collection.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{Location, Position};

use super::symbol::SymbolId;

/// Syntactic context a name was used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceContext {
    TypeDeclaration,
    ParameterType,
    ReturnType,
    GenericParameterType,
    CastTypeReference,
    InstanceofTypeReference,
    MethodCall,
    FieldAccess,
    ConstructorCall,
    PropertyAccess,
    VariableUsage,
    /// Whole dotted chain (`a.b().c`)
    ChainedType,
    /// Chain step left of the last one that could be a class, namespace or instance
    ChainStep,
    /// Chain step known to name a class (standard library or variable in scope)
    ClassReference,
    ExceptionType,
    AnnotationReference,
    TriggerSObject,
    TriggerContextVariable,
    WebServiceType,
    SoqlFromObject,
    SoqlSelectField,
    SoqlBindVariable,
    SoslReturningObject,
    DmlTarget,
    EnumValueReference,
    StaticMemberAccess,
    InterfaceType,
    SuperType,
}

impl ReferenceContext {
    /// Contexts in which the name denotes a type that must exist.
    pub fn is_type_usage(&self) -> bool {
        matches!(
            self,
            Self::TypeDeclaration
                | Self::ParameterType
                | Self::ReturnType
                | Self::GenericParameterType
                | Self::CastTypeReference
                | Self::InstanceofTypeReference
                | Self::ConstructorCall
                | Self::ExceptionType
                | Self::SuperType
                | Self::InterfaceType
                | Self::WebServiceType
        )
    }

    /// Contexts that name a member (method, field, property).
    pub fn is_member_usage(&self) -> bool {
        matches!(
            self,
            Self::MethodCall | Self::FieldAccess | Self::PropertyAccess
        )
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::TypeDeclaration => "type declaration",
            Self::ParameterType => "parameter type",
            Self::ReturnType => "return type",
            Self::GenericParameterType => "generic parameter type",
            Self::CastTypeReference => "cast type",
            Self::InstanceofTypeReference => "instanceof type",
            Self::MethodCall => "method call",
            Self::FieldAccess => "field access",
            Self::ConstructorCall => "constructor call",
            Self::PropertyAccess => "property access",
            Self::VariableUsage => "variable usage",
            Self::ChainedType => "chained expression",
            Self::ChainStep => "chain step",
            Self::ClassReference => "class reference",
            Self::ExceptionType => "exception type",
            Self::AnnotationReference => "annotation",
            Self::TriggerSObject => "trigger sobject",
            Self::TriggerContextVariable => "trigger context variable",
            Self::WebServiceType => "webservice type",
            Self::SoqlFromObject => "SOQL object",
            Self::SoqlSelectField => "SOQL field",
            Self::SoqlBindVariable => "SOQL bind variable",
            Self::SoslReturningObject => "SOSL object",
            Self::DmlTarget => "DML target",
            Self::EnumValueReference => "enum value",
            Self::StaticMemberAccess => "static member access",
            Self::InterfaceType => "interface type",
            Self::SuperType => "super type",
        }
    }
}

/// How a variable usage touches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessType {
    Read,
    Write,
    ReadWrite,
}

/// A located usage of a name, tagged with its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReference {
    pub name: String,
    pub location: Location,
    pub context: ReferenceContext,
    #[serde(default)]
    pub resolved_symbol_id: Option<SymbolId>,
    /// Name of the enclosing method or type
    #[serde(default)]
    pub parent_context: Option<SmolStr>,
    /// Id of the enclosing method or type
    #[serde(default)]
    pub context_symbol_id: Option<SymbolId>,
    /// Left-hand qualifier (`Account` in `Account.Name`)
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub is_static: Option<bool>,
    #[serde(default)]
    pub access: Option<AccessType>,
    /// Per-step references of a chained reference, left to right
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain_nodes: Vec<TypeReference>,
}

impl TypeReference {
    pub fn new(name: impl Into<String>, location: Location, context: ReferenceContext) -> Self {
        Self {
            name: name.into(),
            location,
            context,
            resolved_symbol_id: None,
            parent_context: None,
            context_symbol_id: None,
            qualifier: None,
            is_static: None,
            access: None,
            chain_nodes: Vec::new(),
        }
    }

    pub fn with_access(mut self, access: AccessType) -> Self {
        self.access = Some(access);
        self
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    pub fn with_context(mut self, name: Option<SmolStr>, id: Option<SymbolId>) -> Self {
        self.parent_context = name;
        self.context_symbol_id = id;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_symbol_id.is_some()
    }

    pub fn is_chained(&self) -> bool {
        self.context == ReferenceContext::ChainedType
    }

    /// Whether `position` falls on the identifier.
    pub fn covers(&self, position: Position) -> bool {
        self.location.identifier_range.contains(position)
    }

    /// The innermost reference (chain step or self) under `position`.
    pub fn at(&self, position: Position) -> Option<&TypeReference> {
        self.chain_nodes
            .iter()
            .find(|node| node.covers(position))
            .or_else(|| self.covers(position).then_some(self))
    }
}

/// A dotted usage with its nested steps (`a.b.c` → `a` → `b` → `c`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalReference {
    pub name: String,
    pub location: Location,
    pub context: ReferenceContext,
    #[serde(default)]
    pub children: Vec<HierarchicalReference>,
}

impl HierarchicalReference {
    /// Build the nested form from per-step references, left to right.
    pub fn from_steps(steps: &[TypeReference]) -> Option<Self> {
        let (last, rest) = steps.split_last()?;
        let mut node = Self {
            name: last.name.clone(),
            location: last.location,
            context: last.context,
            children: Vec::new(),
        };
        for step in rest.iter().rev() {
            node = Self {
                name: step.name.clone(),
                location: step.location,
                context: step.context,
                children: vec![node],
            };
        }
        Some(node)
    }

    /// Dotted text of the chain from this node down its first children.
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        let mut current = self;
        while let Some(child) = current.children.first() {
            parts.push(&child.name);
            current = child;
        }
        parts.join(".")
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}
