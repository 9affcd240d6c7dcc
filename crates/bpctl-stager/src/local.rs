//! Staging from the local filesystem and remote URLs.

use async_trait::async_trait;
use bpctl_core::artifact::ArtifactStager;
use bpctl_core::{Result, StagingError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::archive::{is_empty_dir, is_zip_archive, zip_directory};
use crate::download::{Downloader, is_http_url};

/// Stages buildpack sources into a private temporary directory.
///
/// The directory and everything staged into it is removed when the stager is
/// dropped.
pub struct LocalStager {
    staging_dir: TempDir,
    downloader: Downloader,
}

impl LocalStager {
    pub fn new() -> Result<Self> {
        let staging_dir = tempfile::Builder::new()
            .prefix("buildpack-dir-")
            .tempdir()
            .map_err(|e| StagingError::Unreadable {
                path: std::env::temp_dir().display().to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            staging_dir,
            downloader: Downloader::new()?,
        })
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging_dir.path()
    }

    async fn stage_directory(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.display().to_string();

        let empty = is_empty_dir(dir).map_err(|e| StagingError::Unreadable {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if empty {
            return Err(StagingError::EmptyDirectory { path }.into());
        }

        let dir_name = dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "buildpack".to_string());
        let archive = self.staging_dir().join(format!("{}.zip", dir_name));

        let source = dir.to_path_buf();
        let target = archive.clone();
        tokio::task::spawn_blocking(move || zip_directory(&source, &target))
            .await
            .map_err(|e| StagingError::Archive {
                path: path.clone(),
                message: e.to_string(),
            })?
            .map_err(|e| StagingError::Archive {
                path: path.clone(),
                message: e.to_string(),
            })?;

        info!(dir = %path, archive = %archive.display(), "Zipped buildpack directory");
        Ok(archive)
    }
}

#[async_trait]
impl ArtifactStager for LocalStager {
    async fn stage(&self, source: &str) -> Result<PathBuf> {
        if is_http_url(source) {
            return self.downloader.download(source, self.staging_dir()).await;
        }

        let path = Path::new(source);
        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StagingError::NotFound {
                path: source.to_string(),
            },
            _ => StagingError::Unreadable {
                path: source.to_string(),
                message: e.to_string(),
            },
        })?;

        if metadata.is_dir() {
            return self.stage_directory(path).await;
        }

        let file = path.to_path_buf();
        let is_archive = tokio::task::spawn_blocking(move || is_zip_archive(&file))
            .await
            .map_err(|e| StagingError::Unreadable {
                path: source.to_string(),
                message: e.to_string(),
            })?
            .map_err(|e| StagingError::Unreadable {
                path: source.to_string(),
                message: e.to_string(),
            })?;

        if !is_archive {
            return Err(StagingError::UnrecognizedFormat {
                path: source.to_string(),
            }
            .into());
        }

        debug!(%source, "Using archive as-is");
        Ok(path.to_path_buf())
    }
}
