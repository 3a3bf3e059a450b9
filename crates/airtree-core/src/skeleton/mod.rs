//! Centreline skeletonization.
//!
//! `thinning` erodes each segmented branch's voxel set to a one-voxel-wide
//! skeleton while preserving 26-connectivity; `decompose` classifies the
//! combined skeleton graph, breaks residual cycles, and assembles the
//! arena branch tree rooted at the endpoint nearest the seed.

mod decompose;
mod thinning;

pub use decompose::{decompose, DecomposeOutcome};
pub use thinning::{components26, thin_branch};

use std::collections::HashMap;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::CoreError;
use crate::geom::{Spacing, Voxel};
use crate::input::SegmentedTreeInput;

/// Thin every input branch, audit topology, and decompose the combined
/// skeleton into a branch tree.
///
/// The cancellation token is checked between input branches; a branch is
/// either fully thinned or not started.
pub fn skeletonize(
    input: &SegmentedTreeInput,
    spacing: Spacing,
    cancel: &CancelToken,
) -> Result<DecomposeOutcome, CoreError> {
    if input.is_empty() {
        return Ok(DecomposeOutcome::empty());
    }

    let fallback_prior = input.max_prior_mm();
    let mut skeleton: Vec<Voxel> = Vec::new();
    let mut priors: HashMap<Voxel, f64> = HashMap::new();

    for (branch_idx, branch) in input.branches.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        if branch.voxels.is_empty() {
            continue;
        }
        let skel = thin_branch(&branch.voxels);
        audit_topology(branch_idx, &branch.voxels, &skel)?;
        debug!(
            branch = branch_idx,
            input_voxels = branch.voxels.len(),
            skeleton_voxels = skel.len(),
            "thinned input branch"
        );
        for &v in &skel {
            priors.entry(v).or_insert(branch.radius_prior_mm);
        }
        skeleton.extend(skel);
    }

    Ok(decompose(
        &skeleton,
        input.seed,
        spacing,
        &priors,
        fallback_prior,
    ))
}

/// Thinning must never split a connected component. A violation is an
/// implementation defect, reported with the input branch id and a witness
/// voxel from the spurious component.
fn audit_topology(branch_idx: usize, input: &[Voxel], skel: &[Voxel]) -> Result<(), CoreError> {
    let expected = components26(input).len();
    let got = components26(skel);
    if got.len() > expected {
        let voxel = got[expected][0];
        return Err(CoreError::ThinningTopologyViolation {
            branch: branch_idx,
            voxel,
        });
    }
    Ok(())
}
