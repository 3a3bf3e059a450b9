//! High-level analysis API.
//!
//! [`Analyzer`] is the primary entry point: it wraps a
//! [`PipelineConfig`] and provides convenience methods for the common
//! analysis scenarios (with/without cancellation). Create once, analyze
//! many cases.

use airtree_core::{CancelToken, ScalarVolume, SegmentedTreeInput};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::pipeline::{run_pipeline, AirwayTreeResult};

/// Primary analysis interface.
///
/// # Examples
///
/// ```no_run
/// use airtree::{Analyzer, ScalarVolume, SegmentedTreeInput, Spacing, Voxel};
///
/// let analyzer = Analyzer::new();
/// let volume = ScalarVolume::new([64, 64, 64], Spacing::isotropic(0.5), 0.0);
/// let input = SegmentedTreeInput { branches: vec![], seed: Voxel::new(32, 32, 0) };
/// let result = analyzer.analyze(&input, &volume)?;
/// println!("{} centreline points", result.centreline_points.len());
/// # Ok::<(), airtree::PipelineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: PipelineConfig,
}

impl Analyzer {
    /// Analyzer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with full config control.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline to completion.
    pub fn analyze(
        &self,
        input: &SegmentedTreeInput,
        intensity: &ScalarVolume,
    ) -> Result<AirwayTreeResult, PipelineError> {
        run_pipeline(input, intensity, &self.config, &CancelToken::new())
    }

    /// Run the pipeline with a caller-held cancellation token.
    pub fn analyze_with_cancel(
        &self,
        input: &SegmentedTreeInput,
        intensity: &ScalarVolume,
        cancel: &CancelToken,
    ) -> Result<AirwayTreeResult, PipelineError> {
        run_pipeline(input, intensity, &self.config, cancel)
    }
}
