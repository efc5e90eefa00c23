//! Cloneable, lock-guarded manager handle.
//!
//! Mutations take the write lock and complete (graph plus cache invalidation)
//! before it is released, so readers never see a half-applied change. No lock is
//! held across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::semantic::graphs::DependencyAnalysis;
use crate::semantic::symbol_table::{Symbol, SymbolId, SymbolTable};
use crate::semantic::types::GraphError;

use super::{ManagerSettings, SymbolManager};

/// Ability to wait until a symbol becomes available.
///
/// Validators that schedule an asynchronous load use this to pick up the result.
#[async_trait]
pub trait SymbolAvailability: Send + Sync {
    fn is_symbol_available(&self, name: &str) -> bool;

    /// Wait up to `timeout` for a symbol with the name (or FQN) to be indexed.
    async fn wait_for_symbol(&self, name: &str, timeout: Duration) -> Option<Arc<Symbol>>;
}

#[derive(Debug, Clone, Default)]
pub struct SharedSymbolManager {
    inner: Arc<RwLock<SymbolManager>>,
    indexed: Arc<Notify>,
}

impl SharedSymbolManager {
    pub fn new(manager: SymbolManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
            indexed: Arc::new(Notify::new()),
        }
    }

    pub fn with_settings(settings: ManagerSettings) -> Self {
        Self::new(SymbolManager::new(settings))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, SymbolManager> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, SymbolManager> {
        self.inner.write()
    }

    pub fn add_file(&self, table: &SymbolTable) -> Result<usize, GraphError> {
        let result = self.inner.write().add_file(table);
        self.indexed.notify_waiters();
        result
    }

    pub fn remove_file(&self, uri: &str) -> usize {
        self.inner.write().remove_file(uri)
    }

    /// Index many tables, `max_concurrency` at a time, yielding between chunks.
    ///
    /// Returns one result per table, in input order.
    pub async fn add_files_chunked(
        &self,
        tables: &[SymbolTable],
        max_concurrency: usize,
    ) -> Vec<Result<usize, GraphError>> {
        let mut results = Vec::with_capacity(tables.len());
        for chunk in tables.chunks(max_concurrency.max(1)) {
            let chunk_results = join_all(chunk.iter().map(|table| async move {
                let result = self.add_file(table);
                if let Err(err) = &result {
                    warn!("[MANAGER] bulk indexing of {} failed: {}", table.file_uri(), err);
                }
                result
            }))
            .await;
            results.extend(chunk_results);
            tokio::task::yield_now().await;
        }
        debug!("[MANAGER] bulk indexed {} file(s)", tables.len());
        results
    }

    /// Dependency analysis for many symbols, `max_concurrency` at a time.
    pub async fn analyze_dependencies_chunked(
        &self,
        ids: &[SymbolId],
        max_concurrency: usize,
    ) -> Vec<DependencyAnalysis> {
        let mut results = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(max_concurrency.max(1)) {
            let chunk_results = join_all(
                chunk
                    .iter()
                    .map(|id| async move { self.read().analyze_dependencies(id) }),
            )
            .await;
            results.extend(chunk_results);
            tokio::task::yield_now().await;
        }
        results
    }

    /// A non-scope symbol with the FQN, or failing that the simple name.
    pub fn lookup(&self, name: &str) -> Option<Arc<Symbol>> {
        let manager = self.read();
        manager.find_symbol_by_fqn(name).or_else(|| {
            manager
                .find_symbol_by_name(name)
                .into_iter()
                .find(|symbol| !symbol.is_scope())
        })
    }

    /// A class, interface, enum or trigger named `name`.
    ///
    /// Dotted names are tried as an FQN first, then by their last segment.
    pub fn find_type(&self, name: &str) -> Option<Arc<Symbol>> {
        let manager = self.read();
        if let Some(symbol) = manager
            .find_symbol_by_fqn(name)
            .filter(|symbol| symbol.kind.is_type())
        {
            return Some(symbol);
        }
        let simple = name.rsplit('.').next().unwrap_or(name);
        manager
            .find_symbol_by_name(simple)
            .into_iter()
            .find(|symbol| symbol.kind.is_type())
    }
}

#[async_trait]
impl SymbolAvailability for SharedSymbolManager {
    fn is_symbol_available(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    async fn wait_for_symbol(&self, name: &str, timeout: Duration) -> Option<Arc<Symbol>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.indexed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(symbol) = self.lookup(name) {
                return Some(symbol);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                debug!("[MANAGER] gave up waiting for '{}'", name);
                return None;
            }
        }
    }
}
