//! Pipeline configuration, owned by the host.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// On-demand loading of type definitions that are not indexed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtifactLoadingSettings {
    /// The loading callback is only installed when set
    pub enabled: bool,
    /// How many levels of super types of a loaded artifact are chased
    pub max_depth: usize,
    /// Cap on load attempts per validation run
    pub max_artifacts: usize,
    /// Timeout of a load triggered by validation
    pub load_timeout: Duration,
    /// Timeout of a load the user asked for
    pub user_load_timeout: Duration,
}

impl Default for ArtifactLoadingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: 2,
            max_artifacts: 10,
            load_timeout: Duration::from_millis(500),
            user_load_timeout: Duration::from_secs(5),
        }
    }
}

impl ArtifactLoadingSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineSettings {
    pub artifact_loading: ArtifactLoadingSettings,
    /// Symbols analysed between two yields of the cross-file pass
    pub batch_size: usize,
    /// Items dispatched together by chunked bulk operations
    pub max_concurrency: usize,
    /// Total impact above which a symbol is reported
    pub high_impact_threshold: usize,
    pub cross_file_enhancement: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            artifact_loading: ArtifactLoadingSettings::default(),
            batch_size: 50,
            max_concurrency: 4,
            high_impact_threshold: 20,
            cross_file_enhancement: true,
        }
    }
}
