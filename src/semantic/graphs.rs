//! Cross-file symbol graph.
//!
//! Symbols from every indexed file connected by typed, directed edges. Edges whose
//! target is not indexed yet are parked by target name and materialised when a
//! matching symbol arrives.
mod analysis;
mod reference_type;
mod symbol_graph;

pub use analysis::DependencyAnalysis;
pub use reference_type::{Reference, ReferenceType};
pub use symbol_graph::{GraphStats, SymbolGraph};

#[cfg(test)]
mod tests;
