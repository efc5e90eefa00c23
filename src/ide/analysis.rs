//! AnalysisHost and Analysis: document lifecycle and query snapshots.
//!
//! The `AnalysisHost` owns the diagnostic pipeline (and through it the symbol
//! manager and the stored tables) plus the latest text of every open document.
//! Queries go through an `Analysis` snapshot, which holds the manager's read lock
//! so that every query of one snapshot sees the same graph.
//!
//! ```ignore
//! let host = AnalysisHost::new(parser);
//! host.open(TextDocument::new(uri, 1, text)).await;
//!
//! let analysis = host.analysis();
//! let hover = analysis.hover(uri, Position::new(3, 8));
//! drop(analysis); // before the next change
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};
use smol_str::SmolStr;
use tracing::debug;

use crate::base::Position;
use crate::diagnostics::{
    Diagnostic, DiagnosticPipeline, DiagnosticRequest, PipelineSettings, TableStore,
    TextDocument,
};
use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::{ManagerSettings, SharedSymbolManager, SymbolManager};
use crate::syntax::DocumentParser;

use super::{DocumentSymbol, FoldingRange, GotoResult, HoverResult};

/// Owns all mutable state for the IDE layer.
pub struct AnalysisHost {
    pipeline: DiagnosticPipeline,
    /// Latest version of every open document
    documents: RwLock<IndexMap<SmolStr, TextDocument>>,
}

impl AnalysisHost {
    pub fn new(parser: Arc<dyn DocumentParser>) -> Self {
        Self::with_settings(parser, ManagerSettings::default(), PipelineSettings::default())
    }

    pub fn with_settings(
        parser: Arc<dyn DocumentParser>,
        manager_settings: ManagerSettings,
        settings: PipelineSettings,
    ) -> Self {
        let manager = SharedSymbolManager::with_settings(manager_settings);
        Self::from_pipeline(DiagnosticPipeline::new(parser, manager, settings))
    }

    /// Wrap a pipeline configured by the host (custom validators, artifact loader).
    pub fn from_pipeline(pipeline: DiagnosticPipeline) -> Self {
        Self {
            pipeline,
            documents: RwLock::new(IndexMap::new()),
        }
    }

    pub fn pipeline(&self) -> &DiagnosticPipeline {
        &self.pipeline
    }

    pub fn manager(&self) -> &SharedSymbolManager {
        self.pipeline.manager()
    }

    pub fn document(&self, uri: &str) -> Option<TextDocument> {
        self.documents.read().get(uri).cloned()
    }

    pub fn open_documents(&self) -> Vec<SmolStr> {
        self.documents.read().keys().cloned().collect()
    }

    // ============================================================
    // Document lifecycle
    // ============================================================

    /// Start tracking a document. Returns its push diagnostics.
    pub async fn open(&self, document: TextDocument) -> Vec<Diagnostic> {
        debug!("[HOST] open {}@{}", document.uri, document.version);
        self.update(document).await
    }

    /// Apply a new version. Versions older than the tracked one are ignored and
    /// produce no diagnostics.
    pub async fn change(&self, document: TextDocument) -> Vec<Diagnostic> {
        let tracked = self.documents.read().get(&document.uri).map(|d| d.version);
        if tracked.is_some_and(|version| version > document.version) {
            debug!(
                "[HOST] ignoring {}@{}, already at {:?}",
                document.uri, document.version, tracked
            );
            return Vec::new();
        }
        self.update(document).await
    }

    /// Full (pull) diagnostics of the saved document.
    pub async fn save(&self, uri: &str) -> Vec<Diagnostic> {
        self.diagnostics(uri, DiagnosticRequest::Pull).await
    }

    /// Stop tracking a document. Its symbols stay indexed for other documents.
    pub fn close(&self, uri: &str) -> bool {
        self.pipeline.close(uri);
        let closed = self.documents.write().shift_remove(uri).is_some();
        debug!("[HOST] close {} (tracked: {})", uri, closed);
        closed
    }

    /// Diagnostics of an open document; empty for unknown documents.
    pub async fn diagnostics(&self, uri: &str, request: DiagnosticRequest) -> Vec<Diagnostic> {
        let Some(document) = self.document(uri) else {
            return Vec::new();
        };
        self.pipeline.diagnostics(&document, request).await
    }

    async fn update(&self, document: TextDocument) -> Vec<Diagnostic> {
        self.documents
            .write()
            .insert(document.uri.clone(), document.clone());
        self.pipeline
            .diagnostics(&document, DiagnosticRequest::Push)
            .await
    }

    /// A consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis {
            manager: self.pipeline.manager().read(),
            store: self.pipeline.store(),
        }
    }
}

/// An immutable snapshot of the analysis state.
///
/// Holds the manager's read lock; drop it before applying changes.
pub struct Analysis<'a> {
    manager: RwLockReadGuard<'a, SymbolManager>,
    store: &'a TableStore,
}

impl Analysis<'_> {
    fn table(&self, uri: &str) -> Option<Arc<SymbolTable>> {
        self.store.get(uri).map(|stored| stored.table)
    }

    pub fn hover(&self, uri: &str, position: Position) -> Option<HoverResult> {
        let table = self.table(uri)?;
        super::hover(&table, &self.manager, position)
    }

    pub fn goto_definition(&self, uri: &str, position: Position) -> GotoResult {
        match self.table(uri) {
            Some(table) => super::goto_definition(&table, &self.manager, position),
            None => GotoResult::empty(),
        }
    }

    pub fn document_symbols(&self, uri: &str) -> Vec<DocumentSymbol> {
        self.table(uri)
            .map(|table| super::document_symbols(&table))
            .unwrap_or_default()
    }

    pub fn folding_ranges(&self, uri: &str) -> Vec<FoldingRange> {
        self.table(uri)
            .map(|table| super::folding_ranges(&table))
            .unwrap_or_default()
    }

    pub fn manager(&self) -> &SymbolManager {
        &self.manager
    }
}
