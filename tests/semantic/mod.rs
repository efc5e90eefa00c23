//! Collection and cross-file graph tests
//!
//! Tests for:
//! - Indexing collected tables into the symbol manager
//! - Edges between files, independent of indexing order
//! - Candidate ranking, impact and cycle analysis

pub mod tests_cross_file;
