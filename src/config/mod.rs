use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use duration_str::deserialize_duration;
use serde::Deserialize;
use thiserror::Error;

use crate::client::CloudCredentialSpec;
use crate::cluster::Provider;
use crate::watch;

/// Environment variable holding the path of the test configuration file.
pub const CONFIG_PATH_ENV: &str = "CATTLE_TEST_CONFIG";

pub const RANCHER_PASSWORD_ENV: &str = "RANCHER_PASSWORD";
pub const HOSTNAME_ENV: &str = "MY_HOSTNAME";
pub const GKE_ZONE_ENV: &str = "GKE_ZONE";
pub const AKS_CLIENT_ID_ENV: &str = "AKS_CLIENT_ID";
pub const AKS_SUBSCRIPTION_ID_ENV: &str = "AKS_SUBSCRIPTION_ID";
pub const AKS_CLIENT_SECRET_ENV: &str = "AKS_CLIENT_SECRET";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error loading config: `{0}`")]
    IOError(#[from] std::io::Error),

    #[error("error loading config: `{0}`")]
    SerdeYamlError(#[from] serde_yaml::Error),

    #[error("`{0}` is not set and no config file path was given")]
    MissingPath(&'static str),

    #[error("environment variable `{var}` is required but not set")]
    MissingEnv { var: &'static str },

    #[error("config key `{key}` is required for {provider} but not set")]
    MissingKey { key: &'static str, provider: Provider },
}

/// Convergence deadline as written in the config file, e.g. `30m` or
/// `90s`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimeout(#[serde(deserialize_with = "deserialize_duration")] Duration);

impl Default for WaitTimeout {
    fn default() -> Self {
        WaitTimeout(watch::DEFAULT_TIMEOUT)
    }
}

impl From<WaitTimeout> for Duration {
    fn from(value: WaitTimeout) -> Self {
        value.0
    }
}

/// Per-run configuration for the harness: management host and admin
/// password, provider placement (resource group / region / zone), the
/// Kubernetes version to provision and naming.
///
/// Values present in the environment win over the file, mirroring how
/// pipelines inject credentials without editing the checked-in config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarnessConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub resource_group: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub dns_prefix: Option<String>,
    #[serde(default)]
    pub kubernetes_version: Option<String>,
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub wait_timeout: Option<WaitTimeout>,
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    #[serde(default)]
    pub google_auth_encoded_json: Option<String>,
}

impl HarnessConfig {
    /// Loads the file named by `CATTLE_TEST_CONFIG` and applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .map_err(|_| ConfigError::MissingPath(CONFIG_PATH_ENV))?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let f = std::fs::File::open(path)?;
        let config: HarnessConfig = serde_yaml::from_reader(f)?;
        Ok(config.with_overrides(|var| env::var(var).ok()))
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout.unwrap_or_default().into()
    }

    pub fn name_prefix(&self) -> &str {
        self.name_prefix.as_deref().unwrap_or("e2e")
    }

    /// Builds the credential material for `provider` from config plus
    /// environment, failing fast on anything missing.
    pub fn credential_spec(&self, provider: Provider) -> Result<CloudCredentialSpec, ConfigError> {
        self.credential_spec_from(provider, |var| env::var(var).ok())
    }

    fn with_overrides(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = get(HOSTNAME_ENV) {
            self.host = Some(host);
        }
        if let Some(password) = get(RANCHER_PASSWORD_ENV) {
            self.admin_password = Some(password);
        }
        if let Some(zone) = get(GKE_ZONE_ENV) {
            self.zone = Some(zone);
        }
        self
    }

    fn credential_spec_from(
        &self,
        provider: Provider,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<CloudCredentialSpec, ConfigError> {
        let require_env = |var: &'static str| {
            get(var).ok_or(ConfigError::MissingEnv { var })
        };
        let require_key = |key: &'static str, value: &Option<String>| {
            value
                .clone()
                .ok_or(ConfigError::MissingKey { key, provider })
        };

        match provider {
            Provider::Aks => Ok(CloudCredentialSpec::Azure {
                client_id: require_env(AKS_CLIENT_ID_ENV)?,
                subscription_id: require_env(AKS_SUBSCRIPTION_ID_ENV)?,
                client_secret: require_env(AKS_CLIENT_SECRET_ENV)?,
            }),
            Provider::Eks => Ok(CloudCredentialSpec::Amazon {
                access_key: require_key("awsAccessKeyId", &self.aws_access_key_id)?,
                secret_key: require_key("awsSecretAccessKey", &self.aws_secret_access_key)?,
                default_region: require_key("region", &self.region)?,
            }),
            Provider::Gke => Ok(CloudCredentialSpec::Google {
                auth_encoded_json: require_key(
                    "googleAuthEncodedJson",
                    &self.google_auth_encoded_json,
                )?,
            }),
        }
    }
}
