use std::sync::Arc;
use std::time::Duration;

use hosted_cluster_e2e::cluster::NodePoolSpec;
use hosted_cluster_e2e::provider::HostedCluster;

use crate::fake::{gke_config, FakeManagement};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn provisioned_cluster_comes_up_active_with_its_pools() {
    let client = Arc::new(FakeManagement::new());
    let cluster = HostedCluster::create_with_timeout(
        client,
        "e2e-gke-basic",
        gke_config(vec![NodePoolSpec::new("default-pool", 3)]),
        TIMEOUT,
    )
    .await
    .unwrap();

    let handle = cluster.handle();
    assert!(handle.is_active());
    assert_eq!(handle.name, "e2e-gke-basic");
    assert_eq!(cluster.node_pool_count(), 1);
    // the refetched object carries status only present after readiness
    assert_eq!(handle.state.observed_version.as_deref(), Some("1.26.3"));
}

#[tokio::test]
async fn add_then_remove_returns_the_pool_count_to_its_original_value() {
    let client = Arc::new(FakeManagement::new());
    let mut cluster = HostedCluster::create_with_timeout(
        client,
        "e2e-gke-pools",
        gke_config(vec![NodePoolSpec::new("default-pool", 2)]),
        TIMEOUT,
    )
    .await
    .unwrap();
    let original = cluster.node_pool_count();

    cluster.add_node_pool().await.unwrap();
    assert_eq!(cluster.node_pool_count(), original + 1);
    // the added pool clones sizing from pool 0 under a fresh name
    let pools = cluster.handle().config.node_pools();
    assert_ne!(pools[1].name, pools[0].name);
    assert_eq!(pools[1].desired_size, pools[0].desired_size);

    cluster.remove_node_pool(original).await.unwrap();
    assert_eq!(cluster.node_pool_count(), original);
}

#[tokio::test]
async fn deleted_cluster_disappears_from_the_api() {
    let client = Arc::new(FakeManagement::new());
    let cluster = HostedCluster::create_with_timeout(
        client.clone(),
        "e2e-gke-delete",
        gke_config(vec![NodePoolSpec::new("default-pool", 1)]),
        TIMEOUT,
    )
    .await
    .unwrap();
    let id = cluster.handle().id.clone();

    cluster.delete().await.unwrap();

    use hosted_cluster_e2e::client::{ClientError, ManagementClient};
    assert!(matches!(
        client.cluster_by_id(&id).await,
        Err(ClientError::NotFound { .. })
    ));
}

#[tokio::test]
async fn imported_cluster_reaches_ready_like_a_provisioned_one() {
    let client = Arc::new(FakeManagement::new());
    let cluster = HostedCluster::import_with_timeout(client, "e2e-gke-import", TIMEOUT)
        .await
        .unwrap();

    assert!(cluster.handle().is_active());
    assert_eq!(cluster.node_pool_count(), 1);
    // import ends with the same refetch as provisioning, so the handle
    // carries status only populated after readiness
    assert!(cluster.handle().state.observed_version.is_some());
}
