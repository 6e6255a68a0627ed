use crate::error::StoreResult;
use crate::store::Snapshot;

const SAMPLE_YAML: &str = include_str!("../data/sample.yaml");

/// Demo data shown when no remote backend is configured.
pub fn sample_snapshot() -> StoreResult<Snapshot> {
    Ok(serde_yaml::from_str(SAMPLE_YAML)?)
}
