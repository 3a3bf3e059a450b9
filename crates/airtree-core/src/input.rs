//! Externally produced segmentation input.
//!
//! The upstream segmentation delivers the airway mask as a hierarchy of
//! branch voxel sets together with a coarse per-branch radius prior
//! (typically from a distance transform) and a seed voxel near the
//! trachea. The hierarchy itself is coarse; the skeletonizer derives its
//! own, finer branch tree from the thinned voxel graph.

use crate::geom::Voxel;

/// One segmented branch: its voxel set plus a coarse radius prior.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputBranch {
    /// Voxels of the binary mask belonging to this branch.
    pub voxels: Vec<Voxel>,
    /// Coarse local radius in millimetres; caps ray length during
    /// radius estimation.
    pub radius_prior_mm: f64,
}

/// Complete segmentation input for one airway tree.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SegmentedTreeInput {
    /// Segmented branches; may be empty (yields an empty result).
    pub branches: Vec<InputBranch>,
    /// Seed voxel near the trachea; the skeleton endpoint closest to it
    /// becomes the start point of the result tree.
    pub seed: Voxel,
}

impl SegmentedTreeInput {
    /// True when no branch carries any voxel.
    pub fn is_empty(&self) -> bool {
        self.branches.iter().all(|b| b.voxels.is_empty())
    }

    /// Largest radius prior over all branches; fallback for skeleton
    /// voxels whose source branch cannot be identified.
    pub fn max_prior_mm(&self) -> f64 {
        self.branches
            .iter()
            .map(|b| b.radius_prior_mm)
            .fold(0.0, f64::max)
    }
}
