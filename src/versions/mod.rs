use semver::Version;
use tracing::debug;

use crate::client::{ClientError, ManagementClient};

#[derive(thiserror::Error, Debug)]
pub enum VersionError {
    #[error("cannot parse version `{version}`: `{source}`")]
    Parse {
        version: String,
        source: semver::Error,
    },

    #[error("management client error: `{0}`")]
    Client(#[from] ClientError),
}

/// Upgrade candidates for a cluster, ascending by release order.
///
/// The cluster is fetched again first: parts of its status the backend
/// needs to compute candidates are only populated once the cluster has
/// been ready, so a stale handle is not good enough here.
pub async fn list_available_upgrades<C>(
    client: &C,
    cluster_id: &str,
) -> Result<Vec<String>, VersionError>
where
    C: ManagementClient + ?Sized,
{
    let cluster = client.cluster_by_id(cluster_id).await?;
    let versions = client.available_upgrades(&cluster.id).await?;
    debug!(cluster = %cluster.name, candidates = versions.len(), "listed upgrade candidates");
    Ok(versions)
}

/// Collapses an ascending version list to the first version seen per
/// distinct minor, preserving first-seen order. Used to keep the
/// support-matrix population to one variant per minor.
pub fn collapse_to_one_per_minor(versions: &[String]) -> Result<Vec<String>, VersionError> {
    let mut collapsed = Vec::new();
    let mut last_minor: Option<u64> = None;

    for version in versions {
        let parsed =
            Version::parse(version.trim_start_matches('v')).map_err(|source| {
                VersionError::Parse {
                    version: version.clone(),
                    source,
                }
            })?;
        if last_minor != Some(parsed.minor) {
            collapsed.push(version.clone());
            last_minor = Some(parsed.minor);
        }
    }

    Ok(collapsed)
}
