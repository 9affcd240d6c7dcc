//! Control plane HTTP client for bpctl.
//!
//! Implements the registrar and uploader collaborators of the pipeline on top
//! of the v3 buildpacks API, collecting warnings from every response.

pub mod buildpacks;
pub mod client;
pub mod jobs;

pub use client::ControlPlaneClient;
pub use jobs::{Job, JobState};
