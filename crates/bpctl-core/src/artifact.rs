//! Artifact staging abstraction.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::Result;

/// Turns a user-supplied source into a single local archive.
///
/// The source may be a local directory, a local archive or a remote URL.
/// Staging produces no warnings since nothing has been registered yet.
#[async_trait]
pub trait ArtifactStager: Send + Sync {
    /// Resolve `source` to a local archive path ready for upload.
    async fn stage(&self, source: &str) -> Result<PathBuf>;
}
