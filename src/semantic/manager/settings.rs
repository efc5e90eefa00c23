//! Manager configuration, owned by the host.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the language server runs; selects cache sizing presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Desktop,
    Web,
    Test,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerSettings {
    /// Lifetime of every cache entry
    pub cache_ttl: Duration,
    /// Entry cap per cache; the oldest entries are evicted first
    pub max_cache_entries: usize,
    /// Breadth-first depth of indirect impact
    pub impact_depth: usize,
    /// Cap on inheritance chain traversal
    pub max_inheritance_depth: usize,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl ManagerSettings {
    pub fn for_environment(environment: Environment) -> Self {
        let (cache_ttl, max_cache_entries) = match environment {
            Environment::Desktop => (Duration::from_secs(300), 2000),
            Environment::Web => (Duration::from_secs(120), 500),
            Environment::Test => (Duration::from_secs(60), 100),
        };
        Self {
            cache_ttl,
            max_cache_entries,
            impact_depth: 3,
            max_inheritance_depth: 10,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_max_cache_entries(mut self, max: usize) -> Self {
        self.max_cache_entries = max;
        self
    }
}
