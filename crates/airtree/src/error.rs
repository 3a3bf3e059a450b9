//! Pipeline-level fatal errors.

use airtree_core::{CoreError, Voxel};

/// Errors that abort the pipeline. Non-fatal conditions are reported via
/// [`crate::PipelineDiagnostics`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Fatal core condition: topology violation or cancellation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A segmented input voxel lies outside the intensity volume; the
    /// segmentation and the volume do not share a coordinate space.
    #[error("input voxel {voxel} lies outside the volume of dims {dims:?}")]
    InputOutOfBounds { voxel: Voxel, dims: [usize; 3] },
}

impl PipelineError {
    /// True when the pipeline stopped because the caller cancelled it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Core(CoreError::Cancelled))
    }
}
