pub mod predicates;

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::client::{ClientError, ClusterEvent, ManagementClient, WatchFeed};
use crate::cluster::ClusterHandle;

/// Default deadline for a single wait-for-convergence call. Hosted
/// control planes routinely take tens of minutes to reconcile.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Tri-state classification a readiness predicate assigns to each feed
/// event. Predicates are constructed per wait call and discarded after
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
    Failed(String),
}

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    /// The deadline elapsed without a terminal classification. Kept as a
    /// dedicated variant so infrastructure flakiness can be triaged apart
    /// from real failures.
    #[error("watch on `{id}` timed out after {elapsed:?}")]
    TimedOut { id: String, elapsed: Duration },

    #[error("watch feed for `{id}` closed before a terminal state was seen")]
    FeedClosed { id: String },

    #[error("condition on `{id}` failed: {reason}")]
    Failed { id: String, reason: String },

    #[error("management client error: `{0}`")]
    Client(#[from] ClientError),
}

impl WatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WatchError::TimedOut { .. })
    }
}

/// Consumes `feed` until `predicate` reports a terminal state or
/// `timeout` elapses, returning the terminal event.
///
/// The feed is dropped on every exit path, which releases its
/// subscription; a timeout is a normal error return, never a panic, so
/// callers decide whether to retry or fail the test.
pub async fn await_condition<P>(
    mut feed: WatchFeed,
    predicate: P,
    timeout: Duration,
) -> Result<ClusterEvent, WatchError>
where
    P: Fn(&ClusterEvent) -> Readiness,
{
    let id = feed.id().to_string();
    let deadline = Instant::now() + timeout;
    debug!(resource = %id, ?timeout, "waiting for condition");

    loop {
        let event = tokio::time::timeout_at(deadline, feed.recv())
            .await
            .map_err(|_| WatchError::TimedOut {
                id: id.clone(),
                elapsed: timeout,
            })?
            .ok_or(WatchError::FeedClosed { id: id.clone() })?;

        match predicate(&event) {
            Readiness::NotReady => continue,
            Readiness::Ready => {
                debug!(resource = %id, "condition reached");
                return Ok(event);
            }
            Readiness::Failed(reason) => {
                return Err(WatchError::Failed { id, reason });
            }
        }
    }
}

/// Waits until the cluster reports ready, then fetches it again so the
/// returned handle carries everything that is only populated after
/// readiness (e.g. the observed Kubernetes version).
pub async fn wait_until_cluster_ready<C>(
    client: &C,
    id: &str,
    timeout: Duration,
) -> Result<ClusterHandle, WatchError>
where
    C: ManagementClient + ?Sized,
{
    let feed = client.watch_cluster(id).await?;
    await_condition(feed, predicates::cluster_ready(), timeout).await?;
    Ok(client.cluster_by_id(id).await?)
}
