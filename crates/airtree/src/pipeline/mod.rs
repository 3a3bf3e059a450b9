//! High-level analysis pipeline.
//!
//! The glue layer wiring the core stages together:
//! skeletonize -> prune -> radius -> assemble. Algorithmic primitives
//! live in `airtree_core`; this module owns stage order, cancellation
//! points, and result assembly.

mod result;
mod run;

pub use result::{AirwayTreeResult, PipelineDiagnostics};
pub use run::run_pipeline;
