//! Fatal error conditions.
//!
//! Non-fatal conditions (empty input, disconnected components, ambiguous
//! per-point radius, out-of-bounds rays) are not errors: they are recorded
//! as data on the outcome structs and the pipeline diagnostics.

use crate::geom::Voxel;

/// Errors that abort processing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Thinning produced a disconnected skeleton from a connected input;
    /// this indicates an implementation defect, not bad data.
    #[error("thinning broke topology in input branch {branch}: skeleton disconnected near {voxel}")]
    ThinningTopologyViolation { branch: usize, voxel: Voxel },

    /// The cooperative cancellation token was triggered between units of work.
    #[error("processing cancelled")]
    Cancelled,
}
