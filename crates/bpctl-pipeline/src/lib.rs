//! Buildpack creation-and-upload pipeline.
//!
//! Sequences session validation, artifact staging, registration and upload,
//! stopping at the first failure and surfacing every warning collected.

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::{CreateBuildpackPipeline, PipelineRequest};
pub use outcome::{PipelineOutcome, PipelineStage};
