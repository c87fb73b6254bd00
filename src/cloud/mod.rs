//! Out-of-band cluster lifecycle through the provider CLIs (`az`,
//! `eksctl`, `gcloud`), used by the import-flow suites to stand up and
//! tear down clusters the management API only learns about afterwards.
//!
//! Contract with the CLIs is exit code zero on success; combined
//! stdout/stderr is captured and carried in the error otherwise.

use std::process::Command;

use tracing::info;

/// gcloud refuses kubectl-style auth without this opt-in.
const GKE_AUTH_PLUGIN_ENV: (&str, &str) = ("USE_GKE_GCLOUD_AUTH_PLUGIN", "true");

#[derive(thiserror::Error, Debug)]
pub enum CloudCliError {
    #[error("cannot run `{program}`: `{source}`")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` failed ({status}): {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },
}

fn run_captured(
    program: &str,
    args: &[&str],
    envs: &[(&str, &str)],
) -> Result<String, CloudCliError> {
    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .output()
        .map_err(|source| CloudCliError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(CloudCliError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            output: combined,
        });
    }
    Ok(combined)
}

/// Creates an AKS cluster inside a resource group of the same name.
pub fn create_cluster_aks(
    location: &str,
    cluster_name: &str,
    k8s_version: &str,
    nodes: &str,
) -> Result<(), CloudCliError> {
    info!(cluster = %cluster_name, "creating AKS resource group");
    run_captured(
        "az",
        &[
            "group", "create", "--location", location, "--resource-group", cluster_name,
        ],
        &[],
    )?;

    info!(cluster = %cluster_name, "creating AKS cluster");
    run_captured(
        "az",
        &[
            "aks",
            "create",
            "--resource-group",
            cluster_name,
            "--kubernetes-version",
            k8s_version,
            "--enable-managed-identity",
            "--name",
            cluster_name,
            "--node-count",
            nodes,
        ],
        &[],
    )?;

    info!(cluster = %cluster_name, "created AKS cluster");
    Ok(())
}

/// Deletes the resource group, which takes the cluster with it.
pub fn delete_cluster_aks(cluster_name: &str) -> Result<(), CloudCliError> {
    info!(cluster = %cluster_name, "deleting AKS resource group");
    run_captured(
        "az",
        &["group", "delete", "--name", cluster_name, "--yes"],
        &[],
    )?;
    info!(cluster = %cluster_name, "deleted AKS resource group");
    Ok(())
}

pub fn create_cluster_eks(
    region: &str,
    cluster_name: &str,
    k8s_version: &str,
    nodes: &str,
) -> Result<(), CloudCliError> {
    info!(cluster = %cluster_name, "creating EKS cluster");
    run_captured(
        "eksctl",
        &[
            "create",
            "cluster",
            &format!("--region={}", region),
            &format!("--name={}", cluster_name),
            &format!("--version={}", k8s_version),
            "--nodegroup-name",
            "ranchernodes",
            "--nodes",
            nodes,
            "--managed",
        ],
        &[],
    )?;
    info!(cluster = %cluster_name, "created EKS cluster");
    Ok(())
}

pub fn delete_cluster_eks(region: &str, cluster_name: &str) -> Result<(), CloudCliError> {
    info!(cluster = %cluster_name, "deleting EKS cluster");
    run_captured(
        "eksctl",
        &[
            "delete",
            "cluster",
            &format!("--region={}", region),
            &format!("--name={}", cluster_name),
        ],
        &[],
    )?;
    info!(cluster = %cluster_name, "deleted EKS cluster");
    Ok(())
}

pub fn create_cluster_gke(
    cluster_name: &str,
    zone: &str,
    k8s_version: &str,
    nodes: &str,
) -> Result<(), CloudCliError> {
    info!(cluster = %cluster_name, "creating GKE cluster");
    run_captured(
        "gcloud",
        &[
            "container",
            "clusters",
            "create",
            cluster_name,
            "--zone",
            zone,
            "--cluster-version",
            k8s_version,
            "--num-nodes",
            nodes,
            "--quiet",
        ],
        &[GKE_AUTH_PLUGIN_ENV],
    )?;
    info!(cluster = %cluster_name, "created GKE cluster");
    Ok(())
}

pub fn delete_cluster_gke(cluster_name: &str, zone: &str) -> Result<(), CloudCliError> {
    info!(cluster = %cluster_name, "deleting GKE cluster");
    run_captured(
        "gcloud",
        &[
            "container", "clusters", "delete", cluster_name, "--zone", zone, "--quiet",
        ],
        &[GKE_AUTH_PLUGIN_ENV],
    )?;
    info!(cluster = %cluster_name, "deleted GKE cluster");
    Ok(())
}
