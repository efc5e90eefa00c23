//! # Semantic Analysis
//!
//! Turns a parse-tree traversal into a per-file symbol table, aggregates tables into
//! the cross-file symbol graph, and serves queries over it through the symbol
//! manager.

pub mod collector;
pub mod graphs;
pub mod manager;
pub mod symbol_table;
pub mod types;

pub use collector::{CollectionResult, SymbolCollector};
pub use graphs::{DependencyAnalysis, Reference, ReferenceType, SymbolGraph};
pub use manager::{ManagerSettings, SharedSymbolManager, SymbolAvailability, SymbolManager};
pub use symbol_table::{Symbol, SymbolId, SymbolKind, SymbolTable, TypeReference};
pub use types::{GraphError, SemanticError, SemanticErrorKind, SemanticResult, TableError};
