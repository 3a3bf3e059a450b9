//! Assembled analysis result.

use airtree_core::{BranchTree, FlatPoint, Spacing, Voxel};

/// Non-fatal conditions accumulated while the pipeline ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PipelineDiagnostics {
    /// The segmentation carried no voxels; the result is empty.
    pub empty_input: bool,
    /// Connected skeleton components (1 for a clean tree; more when the
    /// input was disconnected).
    pub n_components: usize,
    /// Residual thinning cycles broken.
    pub n_cycles_broken: usize,
    /// Short trailing branches removed by pruning.
    pub n_pruned_branches: usize,
    /// Points whose radius estimate was ambiguous and recorded absent.
    pub n_radius_absent: usize,
    /// Rays discarded for leaving the volume.
    pub n_rays_discarded: usize,
}

/// Final result: the pruned branch tree plus flattened collections and
/// the per-point radius mapping.
///
/// The flattened collections are built by a stable depth-first traversal,
/// so point ids are reproducible across runs. Set identity maintained by
/// construction: `centreline_points` equals `original_centreline_points`
/// minus `removed_points`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AirwayTreeResult {
    /// The pruned branch tree (detached branches stay in the arena but
    /// are unreachable).
    pub tree: BranchTree,
    /// Flattened points of the pruned tree; the vector index is the
    /// point id used by `radii_mm`.
    pub points: Vec<FlatPoint>,
    /// Every skeleton voxel before cycle breaking and pruning.
    pub original_centreline_points: Vec<Voxel>,
    /// Skeleton voxels surviving in the pruned tree, depth-first order.
    pub centreline_points: Vec<Voxel>,
    /// Junction voxels (3+ skeleton-graph neighbors).
    pub bifurcation_points: Vec<Voxel>,
    /// Voxels dropped by cycle breaking or pruning.
    pub removed_points: Vec<Voxel>,
    /// The unique tree root point; `None` only for an empty result.
    pub start_point: Option<Voxel>,
    /// Radius in millimetres per point id; `None` where estimation was
    /// ambiguous.
    pub radii_mm: Vec<Option<f64>>,
    /// Dimensions of the analyzed volume.
    pub dims: [usize; 3],
    /// Voxel spacing of the analyzed volume.
    pub spacing: Spacing,
    pub diagnostics: PipelineDiagnostics,
}

impl AirwayTreeResult {
    /// Construct an empty result for the provided volume geometry.
    pub fn empty(dims: [usize; 3], spacing: Spacing) -> Self {
        Self {
            tree: BranchTree::new(),
            points: Vec::new(),
            original_centreline_points: Vec::new(),
            centreline_points: Vec::new(),
            bifurcation_points: Vec::new(),
            removed_points: Vec::new(),
            start_point: None,
            radii_mm: Vec::new(),
            dims,
            spacing,
            diagnostics: PipelineDiagnostics {
                empty_input: true,
                ..Default::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.centreline_points.is_empty()
    }

    /// Radius of a point id, when it was estimated.
    pub fn radius_of(&self, point_id: usize) -> Option<f64> {
        self.radii_mm.get(point_id).copied().flatten()
    }
}
