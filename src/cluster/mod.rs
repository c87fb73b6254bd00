pub mod error;
pub mod node_pool;
pub mod provider_config;

pub use error::ClusterSpecError;
pub use node_pool::NodePoolSpec;
pub use provider_config::{AksConfig, EksConfig, GkeConfig, Provider, ProviderConfig};

use serde::{Deserialize, Serialize};

/// Last-observed lifecycle phase of a hosted cluster as reported by the
/// management API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClusterPhase {
    #[default]
    Provisioning,
    Updating,
    Active,
    Error,
}

/// Observed status of a cluster. `observed_version` is only populated
/// once the cluster has been ready at least once; the readiness helpers
/// refetch the cluster after convergence precisely so callers see it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterState {
    pub phase: ClusterPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_version: Option<String>,
}

impl ClusterState {
    pub fn active() -> Self {
        ClusterState {
            phase: ClusterPhase::Active,
            ..Default::default()
        }
    }
}

/// Opaque id plus the last-observed spec and status of one hosted
/// cluster.
///
/// A handle is owned by exactly one test fixture for its lifetime and is
/// replaced wholesale, never mutated in place, on every successful
/// operation. That rules out the stale-aliasing traps that come with a
/// shared cluster variable captured by closures before an update lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterHandle {
    pub id: String,
    pub name: String,
    pub config: ProviderConfig,
    #[serde(default)]
    pub state: ClusterState,
}

impl ClusterHandle {
    pub fn provider(&self) -> Provider {
        self.config.provider()
    }

    pub fn is_active(&self) -> bool {
        self.state.phase == ClusterPhase::Active
    }
}
