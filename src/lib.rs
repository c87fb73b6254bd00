//! Test harness for hosted Kubernetes clusters (AKS, EKS, GKE) driven
//! through a cluster-management API.
//!
//! The reusable core is small: a readiness watcher that blocks on a
//! change feed until a predicate reports a terminal state
//! ([`watch::await_condition`]), and a convergent mutator that applies a
//! partial update to a cluster spec and waits for the backend to catch up
//! ([`mutate::apply_and_converge`]). Everything else is the glue a suite
//! needs around those two: the cluster data model, the management-client
//! boundary, cloud CLI helpers for import flows and per-run configuration.

pub mod client;
pub mod cloud;
pub mod cluster;
pub mod config;
pub mod fixture;
pub mod logging;
pub mod mutate;
pub mod namegen;
pub mod provider;
pub mod versions;
pub mod watch;
