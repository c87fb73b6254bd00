//! In-memory management service used by the lifecycle suites. It accepts
//! cluster CRUD, publishes watch events and converges accepted updates
//! after a short simulated reconciliation delay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use hosted_cluster_e2e::client::{
    ClientError, CloudCredential, CloudCredentialSpec, ClusterEvent, ManagementClient, WatchFeed,
};
use hosted_cluster_e2e::cluster::{
    ClusterHandle, ClusterPhase, ClusterState, EksConfig, GkeConfig, NodePoolSpec, ProviderConfig,
};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Default)]
struct Inner {
    clusters: HashMap<String, ClusterHandle>,
    subscribers: HashMap<String, Vec<mpsc::Sender<ClusterEvent>>>,
    next_cluster: u64,
    next_credential: u64,
}

pub struct FakeManagement {
    inner: Arc<Mutex<Inner>>,
    converge_delay: Duration,
    /// When set, accepted updates stay in `Updating` forever. Lets the
    /// suites exercise convergence deadlines.
    hold_updates: bool,
    update_calls: AtomicUsize,
    upgrades: Vec<String>,
}

impl FakeManagement {
    pub fn new() -> Self {
        Self {
            inner: Arc::default(),
            converge_delay: Duration::from_millis(20),
            hold_updates: false,
            update_calls: AtomicUsize::new(0),
            upgrades: Vec::new(),
        }
    }

    pub fn holding_updates() -> Self {
        Self {
            hold_updates: true,
            ..Self::new()
        }
    }

    pub fn with_upgrades(mut self, upgrades: &[&str]) -> Self {
        self.upgrades = upgrades.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Number of update requests that reached the service.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn broadcast(inner: &mut Inner, id: &str, event: ClusterEvent) {
        if let Some(subscribers) = inner.subscribers.get_mut(id) {
            subscribers.retain(|tx| tx.try_send(event.clone()).is_ok());
        }
    }

    /// Flips the cluster to `Active` after the reconciliation delay and
    /// notifies watchers, unless it was deleted in between.
    fn converge_later(&self, id: String) {
        let inner = Arc::clone(&self.inner);
        let delay = self.converge_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = inner.lock().unwrap();
            let Some(cluster) = inner.clusters.get_mut(&id) else {
                return;
            };
            cluster.state = ClusterState {
                phase: ClusterPhase::Active,
                message: None,
                observed_version: Some(cluster.config.kubernetes_version().to_string()),
            };
            let event = ClusterEvent::Changed(cluster.clone());
            Self::broadcast(&mut inner, &id, event);
        });
    }
}

#[async_trait]
impl ManagementClient for FakeManagement {
    async fn create_cluster(
        &self,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<ClusterHandle, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_cluster += 1;
        let id = format!("c-{}", inner.next_cluster);
        let handle = ClusterHandle {
            id: id.clone(),
            name: name.to_string(),
            config: config.clone(),
            state: ClusterState::default(),
        };
        inner.clusters.insert(id.clone(), handle.clone());
        drop(inner);

        self.converge_later(id);
        Ok(handle)
    }

    async fn update_cluster(
        &self,
        id: &str,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<ClusterHandle, ClientError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.inner.lock().unwrap();
        let cluster = inner
            .clusters
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound { id: id.to_string() })?;
        if cluster.name != name {
            return Err(ClientError::Rejected {
                reason: format!("cluster `{}` is not named `{}`", id, name),
            });
        }
        cluster.config = config.clone();
        cluster.state.phase = ClusterPhase::Updating;
        let accepted = cluster.clone();
        let event = ClusterEvent::Changed(accepted.clone());
        Self::broadcast(&mut inner, id, event);
        drop(inner);

        if !self.hold_updates {
            self.converge_later(id.to_string());
        }
        Ok(accepted)
    }

    async fn cluster_by_id(&self, id: &str) -> Result<ClusterHandle, ClientError> {
        let inner = self.inner.lock().unwrap();
        inner
            .clusters
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound { id: id.to_string() })
    }

    async fn delete_cluster(&self, id: &str) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .clusters
            .remove(id)
            .ok_or_else(|| ClientError::NotFound { id: id.to_string() })?;
        Self::broadcast(&mut inner, id, ClusterEvent::Removed(id.to_string()));
        Ok(())
    }

    async fn import_cluster(&self, name: &str) -> Result<ClusterHandle, ClientError> {
        // an imported cluster shows up with the config discovered on the
        // cloud side, one pre-existing pool
        let discovered = ProviderConfig::Gke(GkeConfig {
            kubernetes_version: "1.26.3".to_string(),
            zone: "us-central1-c".to_string(),
            project_id: "imported".to_string(),
            google_credential_secret: "cc-import".to_string(),
            node_pools: vec![NodePoolSpec::new("default-pool", 3)],
        });
        self.create_cluster(name, &discovered).await
    }

    async fn watch_cluster(&self, id: &str) -> Result<WatchFeed, ClientError> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mut inner = self.inner.lock().unwrap();
        // seed the feed with the current object so a subscriber joining
        // after convergence still observes the terminal state
        if let Some(cluster) = inner.clusters.get(id) {
            let _ = tx.try_send(ClusterEvent::Changed(cluster.clone()));
        }
        inner
            .subscribers
            .entry(id.to_string())
            .or_default()
            .push(tx);
        Ok(WatchFeed::new(id, rx))
    }

    async fn available_upgrades(&self, id: &str) -> Result<Vec<String>, ClientError> {
        let inner = self.inner.lock().unwrap();
        if !inner.clusters.contains_key(id) {
            return Err(ClientError::NotFound { id: id.to_string() });
        }
        Ok(self.upgrades.clone())
    }

    async fn create_cloud_credential(
        &self,
        name: &str,
        spec: &CloudCredentialSpec,
    ) -> Result<CloudCredential, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_credential += 1;
        Ok(CloudCredential {
            id: format!("cc-{}", inner.next_credential),
            name: name.to_string(),
            provider: spec.provider(),
        })
    }

    async fn delete_cloud_credential(&self, _id: &str) -> Result<(), ClientError> {
        Ok(())
    }
}

pub fn gke_config(pools: Vec<NodePoolSpec>) -> ProviderConfig {
    ProviderConfig::Gke(GkeConfig {
        kubernetes_version: "1.26.3".to_string(),
        zone: "us-central1-c".to_string(),
        project_id: "e2e-project".to_string(),
        google_credential_secret: "cc-gke".to_string(),
        node_pools: pools,
    })
}

pub fn eks_config(pools: Vec<NodePoolSpec>) -> ProviderConfig {
    ProviderConfig::Eks(EksConfig {
        kubernetes_version: "1.25.0".to_string(),
        region: "us-east-2".to_string(),
        amazon_credential_secret: "cc-eks".to_string(),
        node_pools: pools,
    })
}
