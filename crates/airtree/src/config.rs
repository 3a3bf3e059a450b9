//! Pipeline configuration.

use airtree_core::prune::PruneParams;
use airtree_core::radius::RadiusParams;

/// Full pipeline configuration with per-stage sections.
///
/// The defaults match the clinical airway use case: a 150-voxel pruning
/// threshold and 16 rays per point capped at three times the coarse
/// radius prior.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Endpoint pruning controls.
    pub prune: PruneParams,
    /// Radius estimation controls.
    pub radius: RadiusParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_documented_constants() {
        let c = PipelineConfig::default();
        assert_eq!(c.prune.min_leaf_voxels, 150);
        assert_eq!(c.radius.n_rays, 16);
        assert_eq!(c.radius.max_radius_factor, 3.0);
        assert_eq!(c.radius.min_valid_fraction, 0.5);
    }

    #[test]
    fn partial_config_deserializes_over_defaults() {
        let c: PipelineConfig =
            serde_json::from_str(r#"{"prune": {"min_leaf_voxels": 40}}"#).unwrap();
        assert_eq!(c.prune.min_leaf_voxels, 40);
        assert_eq!(c.radius.n_rays, 16);
    }
}
