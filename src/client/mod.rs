pub mod error;

pub use error::ClientError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::cluster::{ClusterHandle, Provider, ProviderConfig};

/// Field selector filtering a management watch to a single resource.
pub fn field_selector(id: &str) -> String {
    format!("metadata.name={}", id)
}

/// One entry of a cluster change feed.
#[derive(Debug, Clone)]
pub enum ClusterEvent {
    /// The cluster object changed; carries the full refreshed object.
    Changed(ClusterHandle),
    /// The cluster was removed from the management API.
    Removed(String),
}

/// Change-notification subscription for one cluster.
///
/// The feed owns its subscription: dropping it aborts the backing task on
/// every exit path (success, predicate failure, timeout, transport
/// error), so an early return can never leak the subscription.
pub struct WatchFeed {
    id: String,
    events: mpsc::Receiver<ClusterEvent>,
    subscription: Option<AbortHandle>,
}

impl WatchFeed {
    pub fn new(id: impl Into<String>, events: mpsc::Receiver<ClusterEvent>) -> Self {
        Self {
            id: id.into(),
            events,
            subscription: None,
        }
    }

    /// Attaches the task pumping events into this feed, to be aborted
    /// when the feed is dropped.
    pub fn with_subscription(mut self, subscription: AbortHandle) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Id of the watched resource, as used in the field selector.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Next event, or `None` once the feed is closed by the server side.
    pub async fn recv(&mut self) -> Option<ClusterEvent> {
        self.events.recv().await
    }
}

impl Drop for WatchFeed {
    fn drop(&mut self) {
        if let Some(subscription) = &self.subscription {
            subscription.abort();
        }
    }
}

/// Credential material for one cloud, assembled from config and
/// environment before being stored through the management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloudCredentialSpec {
    Azure {
        client_id: String,
        subscription_id: String,
        client_secret: String,
    },
    Amazon {
        access_key: String,
        secret_key: String,
        default_region: String,
    },
    Google {
        auth_encoded_json: String,
    },
}

impl CloudCredentialSpec {
    pub fn provider(&self) -> Provider {
        match self {
            CloudCredentialSpec::Azure { .. } => Provider::Aks,
            CloudCredentialSpec::Amazon { .. } => Provider::Eks,
            CloudCredentialSpec::Google { .. } => Provider::Gke,
        }
    }
}

/// A stored cloud credential, referenced from provider configs by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudCredential {
    pub id: String,
    pub name: String,
    pub provider: Provider,
}

/// Boundary to the cluster-management API. The real implementation is a
/// generated HTTP client and stays outside this crate; everything in the
/// harness is written against this trait so suites run against a mock or
/// an in-memory fake as well.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManagementClient: Send + Sync {
    async fn create_cluster(
        &self,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<ClusterHandle, ClientError>;

    /// Submits a partial update keyed by cluster name. The returned
    /// object is the server's view right after acceptance, not the
    /// converged one.
    async fn update_cluster(
        &self,
        id: &str,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<ClusterHandle, ClientError>;

    async fn cluster_by_id(&self, id: &str) -> Result<ClusterHandle, ClientError>;

    async fn delete_cluster(&self, id: &str) -> Result<(), ClientError>;

    /// Registers an existing, externally created cluster with the
    /// management API (import flow).
    async fn import_cluster(&self, name: &str) -> Result<ClusterHandle, ClientError>;

    /// Opens a change feed restricted to the given cluster id, i.e.
    /// `metadata.name=<id>`.
    async fn watch_cluster(&self, id: &str) -> Result<WatchFeed, ClientError>;

    /// Kubernetes versions the cluster can currently be upgraded to,
    /// sorted ascending by release order.
    async fn available_upgrades(&self, id: &str) -> Result<Vec<String>, ClientError>;

    async fn create_cloud_credential(
        &self,
        name: &str,
        spec: &CloudCredentialSpec,
    ) -> Result<CloudCredential, ClientError>;

    async fn delete_cloud_credential(&self, id: &str) -> Result<(), ClientError>;
}
