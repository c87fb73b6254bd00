use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ClusterSpecError;
use super::node_pool::NodePoolSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aks,
    Eks,
    Gke,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Aks => write!(f, "aks"),
            Provider::Eks => write!(f, "eks"),
            Provider::Gke => write!(f, "gke"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AksConfig {
    pub kubernetes_version: String,
    pub resource_group: String,
    pub resource_location: String,
    pub dns_prefix: String,
    pub azure_credential_secret: String,
    pub node_pools: Vec<NodePoolSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EksConfig {
    pub kubernetes_version: String,
    pub region: String,
    pub amazon_credential_secret: String,
    pub node_pools: Vec<NodePoolSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GkeConfig {
    pub kubernetes_version: String,
    pub zone: String,
    pub project_id: String,
    pub google_credential_secret: String,
    pub node_pools: Vec<NodePoolSpec>,
}

/// Provider-specific sub-document of a cluster spec. Exactly one variant
/// is populated per cluster, and the watcher/mutator core only goes
/// through the common accessors below, so it is written once for the
/// three providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderConfig {
    Aks(AksConfig),
    Eks(EksConfig),
    Gke(GkeConfig),
}

impl ProviderConfig {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderConfig::Aks(_) => Provider::Aks,
            ProviderConfig::Eks(_) => Provider::Eks,
            ProviderConfig::Gke(_) => Provider::Gke,
        }
    }

    pub fn kubernetes_version(&self) -> &str {
        match self {
            ProviderConfig::Aks(c) => &c.kubernetes_version,
            ProviderConfig::Eks(c) => &c.kubernetes_version,
            ProviderConfig::Gke(c) => &c.kubernetes_version,
        }
    }

    pub fn set_kubernetes_version(&mut self, version: impl Into<String>) {
        let version = version.into();
        match self {
            ProviderConfig::Aks(c) => c.kubernetes_version = version,
            ProviderConfig::Eks(c) => c.kubernetes_version = version,
            ProviderConfig::Gke(c) => c.kubernetes_version = version,
        }
    }

    pub fn node_pools(&self) -> &[NodePoolSpec] {
        match self {
            ProviderConfig::Aks(c) => &c.node_pools,
            ProviderConfig::Eks(c) => &c.node_pools,
            ProviderConfig::Gke(c) => &c.node_pools,
        }
    }

    pub fn node_pools_mut(&mut self) -> &mut Vec<NodePoolSpec> {
        match self {
            ProviderConfig::Aks(c) => &mut c.node_pools,
            ProviderConfig::Eks(c) => &mut c.node_pools,
            ProviderConfig::Gke(c) => &mut c.node_pools,
        }
    }

    pub fn credential_secret(&self) -> &str {
        match self {
            ProviderConfig::Aks(c) => &c.azure_credential_secret,
            ProviderConfig::Eks(c) => &c.amazon_credential_secret,
            ProviderConfig::Gke(c) => &c.google_credential_secret,
        }
    }

    /// Checks the invariants a config must satisfy after creation: a
    /// non-empty pool list, unique pool names and valid per-pool sizing.
    pub fn validate(&self) -> Result<(), ClusterSpecError> {
        let pools = self.node_pools();
        if pools.is_empty() {
            return Err(ClusterSpecError::NoNodePools);
        }
        let mut seen = HashSet::new();
        for pool in pools {
            pool.validate()?;
            if !seen.insert(pool.name.as_str()) {
                return Err(ClusterSpecError::DuplicatePoolName {
                    name: pool.name.clone(),
                });
            }
        }
        Ok(())
    }
}
