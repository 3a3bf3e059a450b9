//! airtree: airway-tree centreline extraction and radius quantification.
//!
//! Takes a pre-segmented airway mask (as a per-branch voxel hierarchy)
//! together with its source intensity volume, and produces a branch tree
//! with per-point sub-voxel radii. The pipeline stages are:
//!
//! 1. **Skeletonize**: topological thinning of each segmented branch,
//!    skeleton-graph decomposition with bifurcation detection, residual
//!    cycle breaking, start-point selection near the trachea seed.
//! 2. **Prune**: single-pass removal of short trailing branches.
//! 3. **Radius**: per-point FWHM radius from rays cast in the plane
//!    orthogonal to the local centreline tangent.
//! 4. **Assemble**: flattened point collections and diagnostics on
//!    [`AirwayTreeResult`]; [`render_labels`] maps the result onto a
//!    label volume for an external display component.
//!
//! # Public API
//! - [`Analyzer`] as the primary entry point
//! - [`PipelineConfig`] for tuning, [`run_pipeline`] for full control
//! - [`AirwayTreeResult`] and [`render_labels`] as the two outputs
//!
//! Algorithmic primitives live in `airtree-core` and are re-exported
//! where they appear in this crate's signatures.

mod analyzer;
mod config;
mod error;
mod pipeline;
mod render;

#[doc(hidden)]
pub mod test_utils;

pub use analyzer::Analyzer;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{run_pipeline, AirwayTreeResult, PipelineDiagnostics};
pub use render::{
    render_labels, LABEL_BACKGROUND, LABEL_BIFURCATION, LABEL_CENTRELINE, LABEL_ORIGINAL,
    LABEL_REMOVED, LABEL_START,
};

pub use airtree_core::{
    BranchTree, CancelToken, CoreError, FlatPoint, InputBranch, LabelVolume, MaskVolume,
    PointClass, ScalarVolume, SegmentedTreeInput, SkeletonPoint, Spacing, Voxel,
};
pub use airtree_core::prune::PruneParams;
pub use airtree_core::radius::RadiusParams;
