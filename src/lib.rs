//! # apexls-base
//!
//! Semantic core of an Apex language server: per-file symbol collection, the
//! cross-file symbol graph and its query layer, and incremental diagnostics.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide          → AnalysisHost, hover, goto-definition, outline, folding
//!   ↓
//! diagnostics  → Tiered validators, artifact loading, cached pipeline
//!   ↓
//! semantic     → Symbol collector, symbol tables, symbol graph, symbol manager
//!   ↓
//! syntax       → Parser collaborator contract (ParseListener, SyntaxNode, TreeNode)
//!   ↓
//! base         → Positions, ranges, language constants
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → semantic → diagnostics → ide)
// ============================================================================

/// Foundation types: Position, Range, Location, Apex constants
pub mod base;

/// Parser contract: constructs, listener callbacks, owned trees
pub mod syntax;

/// Symbol collection, tables, graph and manager
pub mod semantic;

/// Diagnostic pipeline and validators
pub mod diagnostics;

/// IDE features: hover, goto-definition, document symbols, folding ranges
pub mod ide;

// Re-export commonly needed items
pub use base::{Location, Position, Range};
pub use diagnostics::{Diagnostic, DiagnosticPipeline, DiagnosticRequest, Severity, TextDocument};
pub use ide::AnalysisHost;
pub use semantic::{SharedSymbolManager, SymbolCollector, SymbolManager, SymbolTable};
