//! Pipeline orchestrator: skeletonize -> prune -> radius -> assemble.

use tracing::{debug, info};

use airtree_core::prune::prune_short_leaves;
use airtree_core::radius::estimate_radii;
use airtree_core::skeleton::skeletonize;
use airtree_core::{
    CancelToken, MaskVolume, PointClass, ScalarVolume, SegmentedTreeInput, Voxel,
};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

use super::result::{AirwayTreeResult, PipelineDiagnostics};

/// Run the full analysis pipeline.
///
/// The cancellation token is checked between per-branch units of work in
/// the skeletonization and radius stages; on cancellation no partial
/// result escapes. Empty input yields an empty result, not an error.
pub fn run_pipeline(
    input: &SegmentedTreeInput,
    intensity: &ScalarVolume,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<AirwayTreeResult, PipelineError> {
    let dims = intensity.dims();
    let spacing = intensity.spacing();

    if input.is_empty() {
        info!("empty segmentation input, returning empty result");
        return Ok(AirwayTreeResult::empty(dims, spacing));
    }

    // Input contract: segmentation and volume share one coordinate space.
    let mask = MaskVolume::from_voxels(
        dims,
        spacing,
        input.branches.iter().flat_map(|b| b.voxels.iter()),
    )
    .map_err(|voxel| PipelineError::InputOutOfBounds { voxel, dims })?;
    debug!(mask_voxels = mask.count(), n_branches = input.branches.len(), "validated input");

    let skel = skeletonize(input, spacing, cancel)?;
    let mut tree = skel.tree;

    // Everything the skeletonizer produced, cycle voxels included, is
    // part of the original centreline.
    let mut original_centreline_points: Vec<Voxel> =
        tree.flatten().iter().map(|p| p.point.voxel).collect();
    original_centreline_points.extend_from_slice(&skel.cycle_voxels);
    let mut removed_points = skel.cycle_voxels;

    let pruned = prune_short_leaves(&mut tree, &config.prune);
    removed_points.extend(pruned.removed.iter().map(|p| p.voxel));

    let radius = estimate_radii(&tree, intensity, &config.radius, cancel)?;

    let points = tree.flatten();
    let centreline_points: Vec<Voxel> = points.iter().map(|p| p.point.voxel).collect();
    let bifurcation_points: Vec<Voxel> = points
        .iter()
        .filter(|p| p.point.class == PointClass::Bifurcation)
        .map(|p| p.point.voxel)
        .collect();
    let start_point = points
        .iter()
        .find(|p| p.point.class == PointClass::Start)
        .map(|p| p.point.voxel);

    let diagnostics = PipelineDiagnostics {
        empty_input: false,
        n_components: skel.n_components,
        n_cycles_broken: skel.n_cycles_broken,
        n_pruned_branches: pruned.n_pruned_branches,
        n_radius_absent: radius.n_absent,
        n_rays_discarded: radius.n_rays_discarded,
    };
    info!(
        n_points = centreline_points.len(),
        n_bifurcations = bifurcation_points.len(),
        n_removed = removed_points.len(),
        ?diagnostics,
        "pipeline finished"
    );

    Ok(AirwayTreeResult {
        tree,
        points,
        original_centreline_points,
        centreline_points,
        bifurcation_points,
        removed_points,
        start_point,
        radii_mm: radius.radii_mm,
        dims,
        spacing,
        diagnostics,
    })
}
