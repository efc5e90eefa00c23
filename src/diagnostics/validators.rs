//! Tiered semantic validators.
//!
//! IMMEDIATE validators only read the document's own table and are cheap enough to
//! run on every keystroke. THOROUGH validators consult the cross-file graph and may
//! load missing types through the document's [`ArtifactSession`].

mod immediate;
mod thorough;

use std::sync::Arc;

use async_trait::async_trait;

use crate::semantic::symbol_table::{Symbol, SymbolTable};
use crate::semantic::SharedSymbolManager;

use super::artifacts::ArtifactSession;
use super::error::ValidationError;
use super::types::Diagnostic;

pub use immediate::{AbstractMemberValidator, TestMethodValidator, UnusedVariableValidator};
pub use thorough::{InheritanceValidator, InterfaceMethodValidator, UndefinedTypeValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationTier {
    Immediate,
    Thorough,
}

impl ValidationTier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Thorough => "thorough",
        }
    }
}

/// Everything a validator may look at for one document.
pub struct ValidationContext<'a> {
    pub uri: &'a str,
    pub table: &'a SymbolTable,
    pub manager: &'a SharedSymbolManager,
    /// Present only when artifact loading is enabled
    pub artifacts: Option<&'a ArtifactSession>,
    pub max_inheritance_depth: usize,
}

impl ValidationContext<'_> {
    /// Look a type up in the graph, loading it on demand when a session is installed.
    pub async fn resolve_type(&self, name: &str) -> Option<Arc<Symbol>> {
        if let Some(symbol) = self.manager.find_type(name) {
            return Some(symbol);
        }
        match self.artifacts {
            Some(session) => session.ensure_type(name).await,
            None => None,
        }
    }
}

#[async_trait]
pub trait Validator: Send + Sync {
    fn name(&self) -> &'static str;

    fn tier(&self) -> ValidationTier;

    async fn validate(
        &self,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError>;
}

/// The built-in validators of both tiers.
pub fn default_validators() -> Vec<Arc<dyn Validator>> {
    vec![
        Arc::new(AbstractMemberValidator),
        Arc::new(TestMethodValidator),
        Arc::new(UnusedVariableValidator),
        Arc::new(UndefinedTypeValidator),
        Arc::new(InheritanceValidator),
        Arc::new(InterfaceMethodValidator),
    ]
}

#[cfg(test)]
mod tests;
