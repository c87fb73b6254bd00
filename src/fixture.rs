use std::sync::Arc;

use tracing::info;

use crate::client::{ClientError, CloudCredential, ManagementClient};
use crate::cluster::Provider;
use crate::config::{ConfigError, HarnessConfig};
use crate::namegen;

#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    #[error("fixture configuration error: `{0}`")]
    Config(#[from] ConfigError),

    #[error("management client error: `{0}`")]
    Client(#[from] ClientError),
}

/// Per-test bundle of everything a spec needs before touching clusters:
/// the management client and a stored cloud credential for the provider
/// under test.
///
/// One context per test case, owned by it for its whole lifetime. Suites
/// that used to share a package-level context serialize on nothing here;
/// independent lifecycles can run in parallel.
pub struct TestContext<C> {
    client: Arc<C>,
    credential: CloudCredential,
    name_prefix: String,
}

impl<C: ManagementClient> TestContext<C> {
    /// Creates the cloud credential for `provider` out of config and
    /// environment, returning a context that owns it.
    pub async fn bootstrap(
        client: Arc<C>,
        provider: Provider,
        config: &HarnessConfig,
    ) -> Result<Self, FixtureError> {
        let spec = config.credential_spec(provider)?;
        let name = namegen::append_random_suffix(&format!("{}-{}", config.name_prefix(), provider));
        let credential = client.create_cloud_credential(&name, &spec).await?;
        info!(credential = %credential.id, provider = %provider, "cloud credential created");

        Ok(Self {
            client,
            credential,
            name_prefix: config.name_prefix().to_string(),
        })
    }

    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    pub fn credential(&self) -> &CloudCredential {
        &self.credential
    }

    /// A unique cluster name under the configured prefix.
    pub fn generate_cluster_name(&self) -> String {
        namegen::append_random_suffix(&self.name_prefix)
    }

    /// Removes the credential created at bootstrap. Consumes the context
    /// so nothing can use the credential after teardown.
    pub async fn teardown(self) -> Result<(), FixtureError> {
        self.client
            .delete_cloud_credential(&self.credential.id)
            .await?;
        info!(credential = %self.credential.id, "cloud credential removed");
        Ok(())
    }
}
