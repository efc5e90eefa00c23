//! Diagnostic types handed to the transport layer.

use serde::Serialize;
use smol_str::SmolStr;

use crate::base::Range;
use crate::semantic::SemanticError;
use crate::syntax::SyntaxError;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    /// Machine-readable code (see [`codes`]).
    pub code: Option<SmolStr>,
    /// Stage that produced the diagnostic (see [`sources`]).
    pub source: SmolStr,
}

impl Diagnostic {
    pub fn new(severity: Severity, range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity,
            code: None,
            source: SmolStr::new_static(sources::VALIDATION),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, range, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, range, message)
    }

    pub fn info(range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, range, message)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(SmolStr::new_static(code));
        self
    }

    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = SmolStr::new_static(source);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(error: &SyntaxError) -> Self {
        Diagnostic::error(error.range, error.message.clone())
            .with_code(codes::SYNTAX_ERROR)
            .with_source(sources::SYNTAX)
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(error: &SemanticError) -> Self {
        Diagnostic::error(error.location, error.message.clone())
            .with_code(error.kind.code())
            .with_source(sources::SEMANTIC)
    }
}

/// Drop diagnostics whose (code, range, message) was already seen, keeping the first.
pub fn dedup_diagnostics(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut out = Vec::with_capacity(diagnostics.len());
    for diagnostic in diagnostics {
        let key = (
            diagnostic.code.clone(),
            diagnostic.range,
            diagnostic.message.clone(),
        );
        if seen.insert(key) {
            out.push(diagnostic);
        }
    }
    out
}

// ============================================================================
// DIAGNOSTIC SOURCES
// ============================================================================

pub mod sources {
    /// Parser collaborator
    pub const SYNTAX: &str = "apex-syntax";
    /// Symbol collection
    pub const SEMANTIC: &str = "apex-semantic";
    /// Tiered validators
    pub const VALIDATION: &str = "apex-validation";
    /// Cross-file enhancement pass
    pub const CROSS_FILE: &str = "apex-cross-file";
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes produced outside the collector.
///
/// Collector errors carry their own code from
/// [`SemanticErrorKind::code`](crate::semantic::SemanticErrorKind::code).
pub mod codes {
    /// Error reported by the parser.
    pub const SYNTAX_ERROR: &str = "syntax.error";

    // ========================================================================
    // IMMEDIATE TIER
    // ========================================================================

    /// Abstract method declared in a class that is not abstract.
    pub const ABSTRACT_MEMBER_IN_CONCRETE_CLASS: &str = "abstract.member.concrete.class";
    /// Test method declared in a class that is not marked as a test class.
    pub const TEST_METHOD_OUTSIDE_TEST_CLASS: &str = "test.method.outside.test.class";
    pub const UNUSED_VARIABLE: &str = "unused.variable";

    // ========================================================================
    // THOROUGH TIER
    // ========================================================================

    /// Type name that is neither declared, indexed nor loadable.
    pub const UNDEFINED_TYPE: &str = "undefined.type";
    pub const MISSING_SUPERCLASS: &str = "missing.superclass";
    /// Super class is neither virtual nor abstract.
    pub const FINAL_SUPERCLASS: &str = "final.superclass";
    /// `extends` names an interface (or `implements` a class).
    pub const INVALID_SUPERTYPE: &str = "invalid.supertype";
    pub const IMPLEMENTS_NON_INTERFACE: &str = "implements.non.interface";
    pub const CIRCULAR_INHERITANCE: &str = "circular.inheritance";
    pub const MISSING_INTERFACE_METHOD: &str = "missing.interface.method";

    // ========================================================================
    // CROSS-FILE
    // ========================================================================

    pub const CIRCULAR_DEPENDENCY: &str = "circular.dependency";
    /// Changing the symbol affects more symbols than the configured threshold.
    pub const HIGH_IMPACT: &str = "high.impact";
}
