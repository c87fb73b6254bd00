use serde::{Deserialize, Serialize};

use super::error::ClusterSpecError;

/// A named, independently scalable set of worker nodes within a hosted
/// cluster. `min_size`/`max_size` are only carried by providers that
/// expose autoscaling bounds (EKS node groups); `version: None` means the
/// pool inherits the control-plane Kubernetes version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolSpec {
    pub name: String,
    pub desired_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl NodePoolSpec {
    pub fn new(name: impl Into<String>, desired_size: i64) -> Self {
        Self {
            name: name.into(),
            desired_size,
            min_size: None,
            max_size: None,
            version: None,
        }
    }

    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min_size = Some(min);
        self.max_size = Some(max);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Clones sizing and version fields into a new pool under a different
    /// name, the shape used when appending a pool modeled on an existing
    /// one.
    pub fn cloned_with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Sets the desired size, dragging min/max along when present so the
    /// bounds invariant keeps holding.
    pub fn set_size(&mut self, count: i64) {
        self.desired_size = count;
        if self.min_size.is_some() {
            self.min_size = Some(count);
        }
        if self.max_size.is_some() {
            self.max_size = Some(count);
        }
    }

    pub fn validate(&self) -> Result<(), ClusterSpecError> {
        if self.name.is_empty() {
            return Err(ClusterSpecError::EmptyPoolName);
        }
        let min = self.min_size.unwrap_or(self.desired_size);
        let max = self.max_size.unwrap_or(self.desired_size);
        if !(min <= self.desired_size && self.desired_size <= max) {
            return Err(ClusterSpecError::InvalidSizeBounds {
                name: self.name.clone(),
                min,
                desired: self.desired_size,
                max,
            });
        }
        Ok(())
    }
}
