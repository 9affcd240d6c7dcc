//! Buildpack resource types and the control-plane traits that manage them.
//!
//! A buildpack is registered first ([`ResourceRegistrar`]) and receives its
//! bits afterwards ([`ArtifactUploader`]). Both calls return warnings on the
//! success and the failure path, so they report `(Result<_>, Warnings)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Guid, Result, Warnings};

/// A buildpack as registered with the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildpack {
    /// Identifier assigned by the control plane.
    pub guid: Guid,
    /// Unique name within the target.
    pub name: String,
    /// Evaluation order among buildpacks (1 is first).
    pub position: u32,
    /// Whether the buildpack takes part in detection.
    pub enabled: bool,
    /// Whether the bits may be replaced after creation.
    #[serde(default)]
    pub locked: bool,
    /// Stack the buildpack is bound to; `None` means any stack.
    #[serde(default)]
    pub stack: Option<String>,
    /// Name of the uploaded artifact; only set once bits were uploaded.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub state: BuildpackState,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Buildpack {
    pub fn has_bits(&self) -> bool {
        self.filename.as_deref().is_some_and(|f| !f.is_empty())
    }
}

/// Lifecycle state reported by the control plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildpackState {
    #[default]
    AwaitingUpload,
    Processing,
    Ready,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Attributes sent to the control plane when registering a buildpack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub position: u32,
    pub enabled: bool,
}

/// Creates buildpack records on the control plane.
#[async_trait]
pub trait ResourceRegistrar: Send + Sync {
    /// Register a new buildpack.
    ///
    /// Fails with [`crate::Error::NameTaken`] when a buildpack with the same
    /// name and an overlapping stack already exists.
    async fn register(&self, spec: &BuildpackSpec) -> (Result<Buildpack>, Warnings);
}

/// Transfers staged bits to a registered buildpack.
#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    /// Upload the archive at `path` as the bits of buildpack `guid`.
    ///
    /// Fails with [`crate::Error::StackChange`] when the archive targets a
    /// different stack than the registered one and with
    /// [`crate::Error::Transfer`] on I/O or transport failures.
    async fn upload(&self, guid: &Guid, path: &Path) -> (Result<()>, Warnings);
}
