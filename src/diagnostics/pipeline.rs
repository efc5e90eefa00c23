//! The diagnostic pipeline for one document.
//!
//! ```text
//! request ─▶ cache lookup (uri, version, length)
//!              ├─ miss: parse + collect ─▶ store table ─▶ index ─▶ cache
//!              └─ hit:  cached compile diagnostics
//!          ─▶ enrichment required by the request
//!          ─▶ re-fetch the stored table
//!          ─▶ validator tiers ─▶ cross-file pass ─▶ dedup
//! ```
//!
//! Compile diagnostics (syntax and collection errors) are always part of the result;
//! every later stage degrades to "no extra diagnostics" on failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::semantic::manager::{ResolutionContext, SymbolManager};
use crate::semantic::symbol_table::{ReferenceContext, Symbol, SymbolId, TypeReference};
use crate::semantic::{SharedSymbolManager, SymbolCollector, SymbolTable};
use crate::syntax::DocumentParser;

use super::artifacts::{ArtifactLoader, ArtifactSession};
use super::cache::{CacheKey, DiagnosticCache};
use super::enhancement::cross_file_diagnostics;
use super::error::{ArtifactError, ValidationError};
use super::settings::PipelineSettings;
use super::store::{EnrichmentLevel, TableStore};
use super::types::{Diagnostic, dedup_diagnostics};
use super::validators::{ValidationContext, ValidationTier, Validator, default_validators};

/// A document as the transport layer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub uri: SmolStr,
    pub version: i32,
    pub text: String,
}

impl TextDocument {
    pub fn new(uri: impl Into<SmolStr>, version: i32, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            version,
            text: text.into(),
        }
    }

    fn cache_key(&self) -> CacheKey<'_> {
        CacheKey {
            uri: &self.uri,
            version: self.version,
            content_len: self.text.len(),
        }
    }
}

/// Kind of diagnostic request; decides tiers and enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticRequest {
    /// Published after an edit: cheap checks only
    Push,
    /// Client pull: both tiers
    Pull,
    /// "Give me everything": both tiers and the cross-file pass
    Interactive,
}

impl DiagnosticRequest {
    pub fn tiers(&self) -> &'static [ValidationTier] {
        match self {
            Self::Push => &[ValidationTier::Immediate],
            Self::Pull | Self::Interactive => {
                &[ValidationTier::Immediate, ValidationTier::Thorough]
            }
        }
    }

    pub fn required_enrichment(&self) -> EnrichmentLevel {
        match self {
            Self::Push => EnrichmentLevel::Declarations,
            Self::Pull | Self::Interactive => EnrichmentLevel::References,
        }
    }

    pub fn runs_cross_file(&self) -> bool {
        !matches!(self, Self::Push)
    }
}

pub struct DiagnosticPipeline {
    parser: Arc<dyn DocumentParser>,
    manager: SharedSymbolManager,
    store: TableStore,
    cache: DiagnosticCache,
    validators: Vec<Arc<dyn Validator>>,
    loader: Option<Arc<dyn ArtifactLoader>>,
    settings: PipelineSettings,
    /// Parent of every artifact session's token
    shutdown: CancellationToken,
    compiles: AtomicUsize,
}

impl DiagnosticPipeline {
    pub fn new(
        parser: Arc<dyn DocumentParser>,
        manager: SharedSymbolManager,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            parser,
            manager,
            store: TableStore::new(),
            cache: DiagnosticCache::new(),
            validators: default_validators(),
            loader: None,
            settings,
            shutdown: CancellationToken::new(),
            compiles: AtomicUsize::new(0),
        }
    }

    pub fn with_validators(mut self, validators: Vec<Arc<dyn Validator>>) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_artifact_loader(mut self, loader: Arc<dyn ArtifactLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn manager(&self) -> &SharedSymbolManager {
        &self.manager
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn cache(&self) -> &DiagnosticCache {
        &self.cache
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Number of parse + collect runs so far.
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    // ============================================================
    // Requests
    // ============================================================

    /// Diagnostics for one document version.
    pub async fn diagnostics(
        &self,
        document: &TextDocument,
        request: DiagnosticRequest,
    ) -> Vec<Diagnostic> {
        tokio::task::yield_now().await;

        let uri = document.uri.as_str();
        let cached = self.cache.get(document.cache_key()).filter(|_| {
            let stored = self.store.contains(uri);
            if !stored {
                warn!("[PIPELINE] cached diagnostics for {} without a table, recompiling", uri);
            }
            stored
        });
        let mut diagnostics = match cached {
            Some(cached) => cached,
            None => self.compile(document),
        };

        self.enrich(uri, request.required_enrichment());
        // Enrichment may have replaced the table since the cache entry was written.
        let Some(stored) = self.store.get(uri) else {
            return dedup_diagnostics(diagnostics);
        };

        diagnostics.extend(self.validate(uri, &stored.table, request).await);
        if request.runs_cross_file() && self.settings.cross_file_enhancement {
            diagnostics.extend(cross_file_diagnostics(&self.manager, uri, &self.settings).await);
        }

        let merged = dedup_diagnostics(diagnostics);
        debug!(
            "[PIPELINE] {}@{} {:?}: {} diagnostics",
            uri,
            document.version,
            request,
            merged.len()
        );
        merged
    }

    /// Parse, collect, store and index a document. Returns its compile diagnostics.
    pub fn compile(&self, document: &TextDocument) -> Vec<Diagnostic> {
        self.compiles.fetch_add(1, Ordering::Relaxed);
        let uri = document.uri.as_str();
        trace!("[PIPELINE] compiling {}@{}", uri, document.version);

        let parsed = self.parser.parse(uri, &document.text);
        let mut diagnostics: Vec<Diagnostic> =
            parsed.errors.iter().map(Diagnostic::from).collect();
        let result = SymbolCollector::collect_document(&parsed, uri);
        diagnostics.extend(result.errors.iter().map(Diagnostic::from));

        match self.store.insert(result.table, document.version) {
            Some(table) => {
                if let Err(err) = self.manager.add_file(&table) {
                    warn!("[PIPELINE] indexing {} failed: {}", uri, err);
                }
                self.cache.insert(document.cache_key(), diagnostics.clone());
            }
            None => debug!(
                "[PIPELINE] {}@{} superseded, result not stored",
                uri, document.version
            ),
        }
        diagnostics
    }

    /// Bring a stored table up to `level`.
    pub fn enrich(&self, uri: &str, level: EnrichmentLevel) {
        let Some(stored) = self.store.get(uri) else {
            return;
        };
        if stored.level >= level {
            return;
        }

        let mut table = (*stored.table).clone();
        let resolved = {
            let manager = self.manager.read();
            let context = ResolutionContext::in_file(uri);
            table.resolve_references(|reference| {
                resolve_type_reference(&manager, &context, reference)
            })
        };
        if let Err(err) = self.manager.add_file(&table) {
            warn!("[PIPELINE] re-indexing enriched {} failed: {}", uri, err);
        }
        if self.store.upgrade(table, stored.version, level) {
            debug!("[PIPELINE] enriched {} ({} references resolved)", uri, resolved);
        }
    }

    async fn validate(
        &self,
        uri: &str,
        table: &SymbolTable,
        request: DiagnosticRequest,
    ) -> Vec<Diagnostic> {
        let session = self.artifact_session(uri);
        let context = ValidationContext {
            uri,
            table,
            manager: &self.manager,
            artifacts: session.as_ref(),
            max_inheritance_depth: self.manager.read().settings().max_inheritance_depth,
        };

        let mut diagnostics = Vec::new();
        for tier in request.tiers() {
            match self.run_tier(*tier, &context).await {
                Ok(found) => diagnostics.extend(found),
                Err(err) => warn!("[PIPELINE] {} tier failed for {}: {}", tier.name(), uri, err),
            }
        }
        diagnostics
    }

    /// Run one tier's validators; any failure discards the whole tier.
    async fn run_tier(
        &self,
        tier: ValidationTier,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let validators = self.validators.iter().filter(|v| v.tier() == tier);
        let results = join_all(validators.map(|validator| validator.validate(context))).await;
        let mut diagnostics = Vec::new();
        for result in results {
            diagnostics.extend(result?);
        }
        Ok(diagnostics)
    }

    /// The loading callback for one document, if loading is enabled and possible.
    fn artifact_session(&self, uri: &str) -> Option<ArtifactSession> {
        if !self.settings.artifact_loading.enabled {
            return None;
        }
        let loader = self.loader.clone()?;
        Some(ArtifactSession::new(
            uri,
            loader,
            self.manager.clone(),
            self.settings.artifact_loading.clone(),
            self.shutdown.child_token(),
        ))
    }

    /// Load a type the user asked for, with the user timeout.
    pub async fn load_artifact(
        &self,
        uri: &str,
        name: &str,
    ) -> Result<Option<Arc<Symbol>>, ArtifactError> {
        match self.artifact_session(uri) {
            Some(session) => session.load_on_request(name).await,
            None => Ok(self.manager.find_type(name)),
        }
    }

    // ============================================================
    // Lifecycle
    // ============================================================

    /// Forget a document's cached diagnostics and table. Its symbols stay indexed.
    pub fn close(&self, uri: &str) {
        self.cache.invalidate(uri);
        self.store.remove(uri);
    }

    /// Drop a document from the pipeline and the index.
    pub fn remove(&self, uri: &str) {
        self.close(uri);
        self.manager.remove_file(uri);
    }

    /// Abandon every in-flight artifact load.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Resolve type-like usages to a type symbol; member and variable usages are left
/// for the graph's name-based linking.
fn resolve_type_reference(
    manager: &SymbolManager,
    context: &ResolutionContext,
    reference: &TypeReference,
) -> Option<SymbolId> {
    let type_like = reference.context.is_type_usage()
        || matches!(
            reference.context,
            ReferenceContext::ClassReference | ReferenceContext::ChainStep
        );
    if !type_like {
        return None;
    }
    manager
        .resolve_symbol(&reference.name, context)
        .filter(|resolution| resolution.symbol.kind.is_type())
        .map(|resolution| resolution.symbol.id.clone())
}
