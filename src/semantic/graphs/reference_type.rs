use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::Location;
use crate::semantic::symbol_table::{ReferenceContext, SymbolId, SymbolKind};

/// Type of a graph edge.
///
/// Name usages carry the context they were recorded in; declarations contribute
/// inheritance and structural edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceType {
    Usage(ReferenceContext),
    Inheritance,
    InterfaceImplementation,
    /// Scope block → symbol declared in it
    ScopeContains,
    /// Type or method → the scope block of its body, scope → nested scope
    ScopeChild,
}

impl ReferenceType {
    /// Containment edges, ignored by dependency and cycle analysis.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::ScopeContains | Self::ScopeChild)
    }

    pub fn is_inheritance(&self) -> bool {
        matches!(self, Self::Inheritance | Self::InterfaceImplementation)
    }

    /// Whether a symbol of `kind` can be the target of an edge of this type.
    pub fn accepts_target(&self, kind: SymbolKind) -> bool {
        match self {
            Self::Usage(ReferenceContext::MethodCall) => kind == SymbolKind::Method,
            Self::Usage(ReferenceContext::FieldAccess | ReferenceContext::StaticMemberAccess) => {
                matches!(kind, SymbolKind::Field | SymbolKind::Property | SymbolKind::EnumValue)
            }
            Self::Usage(ReferenceContext::PropertyAccess) => kind == SymbolKind::Property,
            Self::Usage(ReferenceContext::EnumValueReference) => kind == SymbolKind::EnumValue,
            Self::Usage(_) => kind.is_type() && kind != SymbolKind::Trigger,
            Self::Inheritance | Self::InterfaceImplementation => {
                matches!(kind, SymbolKind::Class | SymbolKind::Interface)
            }
            Self::ScopeContains | Self::ScopeChild => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Usage(context) => context.display(),
            Self::Inheritance => "inheritance",
            Self::InterfaceImplementation => "interface implementation",
            Self::ScopeContains => "scope contains",
            Self::ScopeChild => "scope child",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A directed edge between two symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub source: SymbolId,
    pub target: SymbolId,
    pub reference_type: ReferenceType,
    /// Name the target was referenced by
    pub target_name: String,
    pub location: Location,
    /// File the edge was recorded in
    pub file: Option<SmolStr>,
}
