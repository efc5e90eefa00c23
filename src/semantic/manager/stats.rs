use serde::Serialize;

use super::cache::CacheStats;
use super::pool::PoolStats;

/// Snapshot of the manager's state and counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStats {
    pub total_symbols: usize,
    pub total_edges: usize,
    pub total_files: usize,
    pub deferred_references: usize,
    pub symbols_by_kind: Vec<(String, usize)>,
    pub caches: Vec<(String, CacheStats)>,
    pub pool: PoolStats,
}
