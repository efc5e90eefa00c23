//! Error types for the diagnostic pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::semantic::GraphError;

/// Errors raised while loading a missing type definition on demand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    /// The loader gave up or reported a failure.
    #[error("failed to load '{name}': {message}")]
    Load { name: String, message: String },

    #[error("loading '{name}' timed out after {timeout:?}")]
    Timeout { name: String, timeout: Duration },

    /// The session was cancelled while the load was in flight.
    #[error("loading '{0}' was cancelled")]
    Cancelled(String),

    /// A loaded table could not be indexed.
    #[error("indexing artifact for '{name}' failed: {source}")]
    Index {
        name: String,
        #[source]
        source: GraphError,
    },
}

impl ArtifactError {
    pub fn load(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Infrastructure failure inside a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The table of the document under validation is not stored.
    #[error("no symbol table for '{0}'")]
    MissingTable(String),

    #[error("validator '{validator}' failed: {message}")]
    Failed {
        validator: &'static str,
        message: String,
    },
}

impl ValidationError {
    pub fn failed(validator: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            validator,
            message: message.into(),
        }
    }
}
