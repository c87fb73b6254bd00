#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ClusterSpecError {
    #[error("node pool name cannot be empty")]
    EmptyPoolName,

    #[error("node pool `{name}` has invalid size bounds: min {min} <= desired {desired} <= max {max} does not hold")]
    InvalidSizeBounds {
        name: String,
        min: i64,
        desired: i64,
        max: i64,
    },

    #[error("duplicated node pool name `{name}`")]
    DuplicatePoolName { name: String },

    #[error("cluster config must keep at least one node pool")]
    NoNodePools,

    #[error("cannot remove the last remaining node pool")]
    LastNodePool,

    #[error("node pool index {index} out of range, the cluster has {len} pools")]
    PoolIndexOutOfRange { index: usize, len: usize },

    #[error("invalid node count `{count}`, must be at least 1")]
    InvalidNodeCount { count: i64 },
}
