//! Endpoint pruning: removal of short trailing branches.
//!
//! A single non-cascading pass: only leaves present at pass entry are
//! examined, so a parent that becomes a leaf through a removal is NOT
//! re-evaluated in the same pass. The decision is local to each leaf's
//! own length, so the outcome does not depend on traversal order, and
//! the pass is idempotent at a fixed threshold.

use tracing::debug;

use crate::tree::{BranchTree, PointClass, SkeletonPoint};

/// Pruning controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PruneParams {
    /// Leaves with fewer voxels than this are removed.
    pub min_leaf_voxels: usize,
}

impl Default for PruneParams {
    fn default() -> Self {
        Self {
            min_leaf_voxels: 150,
        }
    }
}

/// Points removed by one pruning pass.
#[derive(Debug, Clone, Default)]
pub struct PruneOutcome {
    /// All points of the pruned leaves, tagged `Removed`.
    pub removed: Vec<SkeletonPoint>,
    pub n_pruned_branches: usize,
}

/// Remove short trailing leaves from the tree.
///
/// The root and the branch holding the start point are never pruned,
/// whatever their length.
pub fn prune_short_leaves(tree: &mut BranchTree, params: &PruneParams) -> PruneOutcome {
    let mut outcome = PruneOutcome::default();
    let leaves = tree.leaves();
    for id in leaves {
        if Some(id) == tree.root() {
            continue;
        }
        let branch = tree.get(id).expect("leaf ids are valid");
        if branch.points.len() >= params.min_leaf_voxels {
            continue;
        }
        // True trailing branches carry neither the start nor a junction
        // voxel; a leaf exposed by an earlier removal ends at its former
        // bifurcation and is therefore never prunable, which is what
        // makes the pass idempotent.
        if branch
            .points
            .iter()
            .any(|p| matches!(p.class, PointClass::Start | PointClass::Bifurcation))
        {
            continue;
        }
        let branch = tree.get_mut(id).expect("leaf ids are valid");
        for p in &mut branch.points {
            p.class = PointClass::Removed;
        }
        outcome.removed.extend(branch.points.iter().copied());
        tree.detach(id);
        outcome.n_pruned_branches += 1;
    }
    debug!(
        n_pruned = outcome.n_pruned_branches,
        n_points = outcome.removed.len(),
        "pruned short leaves"
    );
    outcome
}
