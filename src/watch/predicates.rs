//! Stock readiness predicates for cluster waits. Each call returns a
//! fresh closure; a predicate lives for exactly one `await_condition`.

use crate::client::ClusterEvent;
use crate::cluster::ClusterPhase;

use super::Readiness;

/// Ready once the cluster reports `Active`; an `Error` phase or the
/// cluster vanishing mid-wait are terminal failures.
pub fn cluster_ready() -> impl Fn(&ClusterEvent) -> Readiness {
    |event| match event {
        ClusterEvent::Changed(cluster) => match cluster.state.phase {
            ClusterPhase::Active => Readiness::Ready,
            ClusterPhase::Error => Readiness::Failed(
                cluster
                    .state
                    .message
                    .clone()
                    .unwrap_or_else(|| "cluster entered error state".to_string()),
            ),
            ClusterPhase::Provisioning | ClusterPhase::Updating => Readiness::NotReady,
        },
        ClusterEvent::Removed(_) => {
            Readiness::Failed("cluster was removed while waiting for readiness".to_string())
        }
    }
}

/// Ready once the cluster is gone from the management API.
pub fn cluster_removed() -> impl Fn(&ClusterEvent) -> Readiness {
    |event| match event {
        ClusterEvent::Removed(_) => Readiness::Ready,
        ClusterEvent::Changed(_) => Readiness::NotReady,
    }
}
