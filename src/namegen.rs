use ulid::Ulid;

const SUFFIX_LEN: usize = 8;

/// Appends a random lowercase suffix to `base`, keeping the result usable
/// as a cloud resource name (node pools, clusters, credentials).
///
/// The random part of a ULID is its tail, so taking the last characters
/// keeps collisions unlikely within a run.
pub fn append_random_suffix(base: &str) -> String {
    let id = Ulid::new().to_string().to_lowercase();
    format!("{}-{}", base, &id[id.len() - SUFFIX_LEN..])
}
