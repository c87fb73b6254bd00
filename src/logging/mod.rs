use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Suites run at INFO while the harness's own modules log at DEBUG, so
/// convergence waits and update submissions stay visible without cloud
/// client noise. `RUST_LOG` replaces the whole set when present.
const DEFAULT_DIRECTIVES: &str = "info,hosted_cluster_e2e=debug";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("unable to install the harness logging subscriber: `{0}`")]
    SubscriberInstall(String),
}

/// Installs the global subscriber for a suite run.
///
/// Output goes through the test writer so the runner keeps log lines
/// attached to the test that produced them.
pub fn try_init() -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init()
        .map_err(|e| LoggingError::SubscriberInstall(e.to_string()))
}
