//! Diagnostics: incremental, tiered validation of documents.
//!
//! The [`DiagnosticPipeline`] turns a document version into an ordered, de-duplicated
//! list of [`Diagnostic`]s:
//! - compile diagnostics (syntax and collection errors), cached per
//!   (uri, version, content length)
//! - IMMEDIATE and THOROUGH [`Validator`] tiers, each isolated from the other's failures
//! - bounded on-demand loading of missing types through an [`ArtifactLoader`]
//! - a cross-file pass reporting dependency cycles and high-impact symbols

pub mod artifacts;
mod cache;
mod enhancement;
mod error;
mod pipeline;
mod settings;
mod store;
mod types;
pub mod validators;

pub use artifacts::{ArtifactLoader, ArtifactOutcome, ArtifactRequest, ArtifactSession, LoadOrigin};
pub use cache::{CacheKey, DiagnosticCache, DiagnosticCacheStats};
pub use enhancement::cross_file_diagnostics;
pub use error::{ArtifactError, ValidationError};
pub use pipeline::{DiagnosticPipeline, DiagnosticRequest, TextDocument};
pub use settings::{ArtifactLoadingSettings, PipelineSettings};
pub use store::{EnrichmentLevel, StoredTable, TableStore};
pub use types::{Diagnostic, Severity, codes, dedup_diagnostics, sources};
pub use validators::{ValidationContext, ValidationTier, Validator, default_validators};

#[cfg(test)]
mod tests;
