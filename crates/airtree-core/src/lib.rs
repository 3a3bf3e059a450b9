//! airtree-core: algorithms for airway-tree centreline extraction and
//! sub-voxel radius estimation from segmented CT volumes.
//!
//! The pipeline stages are:
//!
//! 1. **Thinning**: iterative topological thinning of each segmented
//!    branch's voxel set down to a one-voxel-wide skeleton.
//! 2. **Decompose**: skeleton-graph classification (endpoint / path /
//!    bifurcation), decomposition into an arena branch tree, residual
//!    cycle breaking, start-point selection.
//! 3. **Prune**: single-pass removal of short trailing branches.
//! 4. **Radius**: per-point FWHM radius from rays cast in the plane
//!    orthogonal to the local centreline tangent.
//!
//! Orchestration, result assembly and label rendering live in the
//! `airtree` crate; this crate holds the algorithmic primitives.

pub mod cancel;
pub mod error;
pub mod geom;
pub mod input;
pub mod prune;
pub mod radius;
pub mod skeleton;
pub mod tree;
pub mod volume;

pub use cancel::CancelToken;
pub use error::CoreError;
pub use geom::{Spacing, Voxel};
pub use input::{InputBranch, SegmentedTreeInput};
pub use tree::{Branch, BranchId, BranchTree, FlatPoint, PointClass, SkeletonPoint};
pub use volume::{LabelVolume, MaskVolume, ScalarVolume};
