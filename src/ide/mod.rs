//! IDE features: request handlers over the analysis state.
//!
//! Each function corresponds to an LSP request and works on one document's stored
//! [`SymbolTable`](crate::semantic::SymbolTable) plus the cross-file
//! [`SymbolManager`](crate::semantic::SymbolManager). No LSP types are used; hosts
//! convert at their boundary (positions are already 0-based).
//!
//! The recommended way in is through [`AnalysisHost`]:
//!
//! ```ignore
//! use apexls::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new(parser);
//! host.open(TextDocument::new("file:///Account.cls", 1, text)).await;
//!
//! let analysis = host.analysis();
//! let outline = analysis.document_symbols("file:///Account.cls");
//! ```

mod analysis;
mod folding;
mod goto;
mod hover;
mod symbols;

pub use analysis::{Analysis, AnalysisHost};
pub use folding::{FoldingRange, folding_ranges};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use hover::{HoverResult, hover};
pub use symbols::{DocumentSymbol, document_symbols};

#[cfg(test)]
mod tests;
