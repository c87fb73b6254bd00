use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::client::ManagementClient;
use crate::cluster::{ClusterHandle, ProviderConfig};
use crate::mutate::{self, ConvergeError, Mutation, ScaleTarget};
use crate::versions;
use crate::watch::{self, predicates};

/// One hosted cluster under test, whatever the provider.
///
/// This is the capability surface the per-provider suites program
/// against: create, import, upgrade (both axes), node-pool add / remove /
/// scale, delete. It owns its [`ClusterHandle`] exclusively and replaces
/// it after every converged operation, so fixtures never share mutable
/// cluster state across tests.
pub struct HostedCluster<C> {
    client: Arc<C>,
    handle: ClusterHandle,
    timeout: Duration,
}

impl<C: ManagementClient> HostedCluster<C> {
    /// Requests cluster creation and blocks until initial provisioning
    /// completes, returning a fixture around the refreshed object.
    pub async fn create(
        client: Arc<C>,
        name: &str,
        config: ProviderConfig,
    ) -> Result<Self, ConvergeError> {
        Self::create_with_timeout(client, name, config, watch::DEFAULT_TIMEOUT).await
    }

    pub async fn create_with_timeout(
        client: Arc<C>,
        name: &str,
        config: ProviderConfig,
        timeout: Duration,
    ) -> Result<Self, ConvergeError> {
        config.validate()?;
        info!(cluster = %name, provider = %config.provider(), "creating hosted cluster");
        let created = client.create_cluster(name, &config).await?;
        let handle = watch::wait_until_cluster_ready(client.as_ref(), &created.id, timeout).await?;
        Ok(Self {
            client,
            handle,
            timeout,
        })
    }

    /// Registers an externally provisioned cluster (import flow) and
    /// waits until it reports ready.
    pub async fn import(client: Arc<C>, name: &str) -> Result<Self, ConvergeError> {
        Self::import_with_timeout(client, name, watch::DEFAULT_TIMEOUT).await
    }

    pub async fn import_with_timeout(
        client: Arc<C>,
        name: &str,
        timeout: Duration,
    ) -> Result<Self, ConvergeError> {
        info!(cluster = %name, "importing hosted cluster");
        let imported = client.import_cluster(name).await?;
        // imported clusters go through the same phase machine once
        // registered, so the provisioning wait applies as-is
        let handle = watch::wait_until_cluster_ready(client.as_ref(), &imported.id, timeout).await?;
        Ok(Self {
            client,
            handle,
            timeout,
        })
    }

    /// Narrows the convergence deadline for subsequent operations.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn handle(&self) -> &ClusterHandle {
        &self.handle
    }

    pub fn node_pool_count(&self) -> usize {
        self.handle.config.node_pools().len()
    }

    pub async fn upgrade_control_plane(&mut self, version: &str) -> Result<(), ConvergeError> {
        self.converge(Mutation::upgrade_control_plane(version)).await
    }

    pub async fn upgrade_node_pools(&mut self, version: &str) -> Result<(), ConvergeError> {
        self.converge(Mutation::upgrade_node_pools(version)).await
    }

    pub async fn add_node_pool(&mut self) -> Result<(), ConvergeError> {
        self.converge(Mutation::AddNodePool).await
    }

    pub async fn remove_node_pool(&mut self, index: usize) -> Result<(), ConvergeError> {
        self.converge(Mutation::RemoveNodePool { index }).await
    }

    pub async fn scale_node_pools(
        &mut self,
        count: i64,
        target: ScaleTarget,
    ) -> Result<(), ConvergeError> {
        self.converge(Mutation::scale_node_pools(count, target)).await
    }

    pub async fn list_upgrades(&self) -> Result<Vec<String>, versions::VersionError> {
        versions::list_available_upgrades(self.client.as_ref(), &self.handle.id).await
    }

    /// Tears the cluster down and waits until the management API reports
    /// it gone. Consumes the fixture; the handle cannot outlive the
    /// cluster.
    pub async fn delete(self) -> Result<(), ConvergeError> {
        info!(cluster = %self.handle.name, "deleting hosted cluster");
        // subscribe first so the removal event cannot be missed
        let feed = self.client.watch_cluster(&self.handle.id).await?;
        self.client.delete_cluster(&self.handle.id).await?;
        watch::await_condition(feed, predicates::cluster_removed(), self.timeout).await?;
        Ok(())
    }

    async fn converge(&mut self, mutation: Mutation) -> Result<(), ConvergeError> {
        self.handle = mutate::apply_and_converge(
            self.client.as_ref(),
            &self.handle,
            &mutation,
            predicates::cluster_ready(),
            self.timeout,
        )
        .await?;
        Ok(())
    }
}
