pub mod error;

pub use error::{GraphError, SemanticError, SemanticErrorKind, SemanticResult, TableError};
