//! Error types for semantic analysis.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::Range;

/// Category of a construct-level error raised while collecting symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SemanticErrorKind {
    /// Identifier breaks the naming rules (characters, length, reserved word)
    InvalidIdentifier,
    /// A type, member, variable or enum value is declared twice in one scope
    DuplicateDeclaration,
    /// Modifier combination or placement that the language rejects
    IllegalModifier,
    /// Inner type placement that the language rejects
    IllegalNesting,
    /// Constructor whose name does not match its class
    InvalidConstructor,
    /// The parse tree is missing a slot the construct requires
    MalformedConstruct,
}

impl SemanticErrorKind {
    /// Machine-readable code attached to diagnostics derived from this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "invalid.identifier",
            Self::DuplicateDeclaration => "duplicate.declaration",
            Self::IllegalModifier => "illegal.modifier",
            Self::IllegalNesting => "illegal.nesting",
            Self::InvalidConstructor => "invalid.constructor",
            Self::MalformedConstruct => "malformed.construct",
        }
    }
}

/// A semantic error attached to the construct that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub message: String,
    pub location: Range,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, message: impl Into<String>, location: Range) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn invalid_identifier(message: impl Into<String>, location: Range) -> Self {
        Self::new(SemanticErrorKind::InvalidIdentifier, message, location)
    }

    pub fn duplicate(message: impl Into<String>, location: Range) -> Self {
        Self::new(SemanticErrorKind::DuplicateDeclaration, message, location)
    }

    pub fn illegal_modifier(message: impl Into<String>, location: Range) -> Self {
        Self::new(SemanticErrorKind::IllegalModifier, message, location)
    }

    pub fn illegal_nesting(message: impl Into<String>, location: Range) -> Self {
        Self::new(SemanticErrorKind::IllegalNesting, message, location)
    }

    /// A construct is missing a child slot it cannot do without.
    pub fn malformed(what: &str, slot: &str, location: Range) -> Self {
        Self::new(
            SemanticErrorKind::MalformedConstruct,
            format!("{what} is missing its {slot}"),
            location,
        )
    }
}

pub type SemanticResult<T> = Result<T, SemanticError>;

/// Errors raised while mutating the symbol graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The table's symbols do not all belong to the file being added.
    #[error("symbol '{symbol}' belongs to '{actual}', not '{expected}'")]
    FileMismatch {
        symbol: SmolStr,
        expected: SmolStr,
        actual: SmolStr,
    },

    /// An id is already owned by a symbol from another file.
    #[error("symbol id '{id}' is already owned by '{owner}'")]
    DuplicateIdentity { id: SmolStr, owner: SmolStr },

    /// Edge endpoint or removal target is not in the graph.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(SmolStr),
}

/// Errors raised while reading or writing the persisted symbol table form.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level structure is not an object or lacks `fileUri`.
    #[error("invalid table structure: {0}")]
    Structure(String),
}

impl TableError {
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }
}
