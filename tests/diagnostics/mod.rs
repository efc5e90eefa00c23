//! Diagnostic pipeline tests over a multi-file workspace
//!
//! Tests for:
//! - Validation results that depend on other documents
//! - Syntax errors alongside semantic diagnostics
//! - On-demand loading of missing types
//! - The cross-file pass

pub mod tests_workspace;
