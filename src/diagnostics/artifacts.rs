//! Bounded on-demand loading of type definitions ("artifacts").
//!
//! An [`ArtifactSession`] is bound to the document being validated. Each load runs
//! under a timeout and the session's cancellation token; a failed or slow load is
//! logged and skipped, it never aborts validation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::base::constants::is_builtin_type;
use crate::semantic::symbol_table::{Symbol, SymbolTable, TypeInfo};
use crate::semantic::{SharedSymbolManager, SymbolAvailability};

use super::error::ArtifactError;
use super::settings::ArtifactLoadingSettings;

/// Who asked for a load; selects the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Validation,
    User,
}

#[derive(Debug, Clone)]
pub struct ArtifactRequest {
    /// Correlates the log lines of one load
    pub id: Uuid,
    pub type_name: String,
    /// Document whose validation triggered the load
    pub requesting_uri: SmolStr,
    /// 0 for the type itself, n for its n-th level super types
    pub depth: usize,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ArtifactOutcome {
    /// Tables to index right away
    Loaded(Vec<SymbolTable>),
    /// The loader will index the type itself; wait for it
    Scheduled,
    NotFound,
}

/// Source of type definitions that are not part of the workspace yet.
#[async_trait]
pub trait ArtifactLoader: Send + Sync {
    async fn load(&self, request: &ArtifactRequest) -> Result<ArtifactOutcome, ArtifactError>;
}

#[derive(Debug, Default)]
struct SessionState {
    /// Lower-cased names already attempted
    attempted: FxHashSet<String>,
    attempts: usize,
}

/// Loading callback bound to one document's validation run.
pub struct ArtifactSession {
    uri: SmolStr,
    loader: Arc<dyn ArtifactLoader>,
    manager: SharedSymbolManager,
    settings: ArtifactLoadingSettings,
    cancel: CancellationToken,
    state: Mutex<SessionState>,
}

impl ArtifactSession {
    pub fn new(
        uri: impl Into<SmolStr>,
        loader: Arc<dyn ArtifactLoader>,
        manager: SharedSymbolManager,
        settings: ArtifactLoadingSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            uri: uri.into(),
            loader,
            manager,
            settings,
            cancel,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Number of loads attempted so far.
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }

    /// Make a type available, loading it and its super types if needed.
    ///
    /// Returns the type symbol once indexed. A name is attempted at most once per
    /// session, and no more than `max_artifacts` loads are made in total.
    pub async fn ensure_type(&self, name: &str) -> Option<Arc<Symbol>> {
        if let Some(symbol) = self.manager.find_type(name) {
            return Some(symbol);
        }

        let mut queue = VecDeque::from([(name.to_string(), 0usize)]);
        while let Some((type_name, depth)) = queue.pop_front() {
            if self.manager.find_type(&type_name).is_some() || !self.claim(&type_name) {
                continue;
            }
            let request = self.request(&type_name, depth, LoadOrigin::Validation);
            match self.run(&request).await {
                Ok(ArtifactOutcome::Loaded(tables)) => {
                    let super_types = self.index(&request, &tables);
                    if depth < self.settings.max_depth {
                        queue.extend(super_types.into_iter().map(|name| (name, depth + 1)));
                    }
                }
                Ok(ArtifactOutcome::Scheduled) if depth == 0 => {
                    let found = self
                        .manager
                        .wait_for_symbol(&type_name, self.settings.load_timeout)
                        .await;
                    if found.is_none() {
                        debug!(
                            "[ARTIFACTS] {} scheduled load of '{}' did not complete",
                            request.id, type_name
                        );
                    }
                }
                Ok(ArtifactOutcome::Scheduled) => {}
                Ok(ArtifactOutcome::NotFound) => {
                    trace!("[ARTIFACTS] {} '{}' not found", request.id, type_name);
                }
                Err(err) => {
                    warn!("[ARTIFACTS] {} {}", request.id, err);
                    if matches!(err, ArtifactError::Cancelled(_)) {
                        break;
                    }
                }
            }
        }

        self.manager.find_type(name)
    }

    /// Load a type the user asked for, with the longer user timeout.
    ///
    /// Not bounded by the session's attempt budget.
    pub async fn load_on_request(&self, name: &str) -> Result<Option<Arc<Symbol>>, ArtifactError> {
        let request = self.request(name, 0, LoadOrigin::User);
        match self.run(&request).await? {
            ArtifactOutcome::Loaded(tables) => {
                self.index(&request, &tables);
            }
            ArtifactOutcome::Scheduled => {
                self.manager.wait_for_symbol(name, request.timeout).await;
            }
            ArtifactOutcome::NotFound => {}
        }
        Ok(self.manager.find_type(name))
    }

    /// Reserve a load attempt for `name`. False if already tried or over budget.
    fn claim(&self, name: &str) -> bool {
        let mut state = self.state.lock();
        if state.attempts >= self.settings.max_artifacts {
            debug!(
                "[ARTIFACTS] budget of {} loads spent for {}, skipping '{}'",
                self.settings.max_artifacts, self.uri, name
            );
            return false;
        }
        if !state.attempted.insert(name.to_lowercase()) {
            return false;
        }
        state.attempts += 1;
        true
    }

    fn request(&self, name: &str, depth: usize, origin: LoadOrigin) -> ArtifactRequest {
        let timeout = match origin {
            LoadOrigin::Validation => self.settings.load_timeout,
            LoadOrigin::User => self.settings.user_load_timeout,
        };
        ArtifactRequest {
            id: Uuid::new_v4(),
            type_name: name.to_string(),
            requesting_uri: self.uri.clone(),
            depth,
            timeout,
        }
    }

    async fn run(&self, request: &ArtifactRequest) -> Result<ArtifactOutcome, ArtifactError> {
        trace!(
            "[ARTIFACTS] {} loading '{}' for {} (depth {})",
            request.id, request.type_name, request.requesting_uri, request.depth
        );
        tokio::select! {
            _ = self.cancel.cancelled() => {
                Err(ArtifactError::Cancelled(request.type_name.clone()))
            }
            result = tokio::time::timeout(request.timeout, self.loader.load(request)) => {
                match result {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ArtifactError::Timeout {
                        name: request.type_name.clone(),
                        timeout: request.timeout,
                    }),
                }
            }
        }
    }

    /// Index loaded tables. Returns the unresolved super types they declare.
    fn index(&self, request: &ArtifactRequest, tables: &[SymbolTable]) -> Vec<String> {
        let mut super_types = Vec::new();
        for table in tables {
            if let Err(source) = self.manager.add_file(table) {
                let err = ArtifactError::Index {
                    name: request.type_name.clone(),
                    source,
                };
                warn!("[ARTIFACTS] {} {}", request.id, err);
                continue;
            }
            for ty in table.types() {
                let declared = ty
                    .super_class()
                    .into_iter()
                    .chain(ty.interfaces().iter().map(String::as_str));
                for name in declared {
                    let base = TypeInfo::parse(name).name;
                    if !is_builtin_type(&base) && !super_types.contains(&base) {
                        super_types.push(base);
                    }
                }
            }
        }
        debug!(
            "[ARTIFACTS] {} indexed {} table(s) for '{}'",
            request.id,
            tables.len(),
            request.type_name
        );
        super_types
    }
}
