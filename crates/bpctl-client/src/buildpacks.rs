//! Buildpack endpoints: registration and bits upload.

use async_trait::async_trait;
use bpctl_core::buildpack::{ArtifactUploader, Buildpack, BuildpackSpec, ResourceRegistrar};
use bpctl_core::{Error, Guid, Result, Warnings};
use regex::Regex;
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, StatusCode};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::ControlPlaneClient;
use crate::client::RequestFailure;
use crate::jobs::{Job, JobState};

/// Error code the control plane uses when uploaded bits target another stack.
pub const STACKS_DONT_MATCH_CODE: i64 = 390011;

static NAME_TAKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)buildpack with name .+ already exists|name .+ is already taken").unwrap()
});

static STACK_MISMATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)stack .*(does not match|cannot be changed)").unwrap()
});

/// How an upload failure reported by the control plane should surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFailureKind {
    StackChange,
    AlreadyExistsForStack,
    Other,
}

/// Classify an upload or upload-job error by its code and detail.
pub fn classify_upload_failure(code: Option<i64>, detail: &str) -> UploadFailureKind {
    if code == Some(STACKS_DONT_MATCH_CODE) || STACK_MISMATCH.is_match(detail) {
        UploadFailureKind::StackChange
    } else if detail.contains("already exists") {
        UploadFailureKind::AlreadyExistsForStack
    } else {
        UploadFailureKind::Other
    }
}

/// Whether a registration error detail reports a name collision.
pub fn is_name_taken(detail: &str) -> bool {
    NAME_TAKEN.is_match(detail)
}

impl ControlPlaneClient {
    /// Create a buildpack record awaiting its bits.
    pub async fn create_buildpack(&self, spec: &BuildpackSpec) -> (Result<Buildpack>, Warnings) {
        let url = match self.url("/v3/buildpacks") {
            Ok(url) => url,
            Err(e) => return (Err(e), Warnings::new()),
        };

        info!(buildpack = %spec.name, position = spec.position, enabled = spec.enabled, "Creating buildpack");
        let request = self.request(Method::POST, url).json(spec);
        let (created, warnings) = self.send_json::<Buildpack>(request).await;

        let result = created.map_err(|failure| {
            let taken = failure.status() == Some(StatusCode::UNPROCESSABLE_ENTITY)
                && failure.detail().is_some_and(is_name_taken);
            if taken {
                Error::NameTaken {
                    name: spec.name.clone(),
                }
            } else {
                failure.into()
            }
        });

        match &result {
            Ok(buildpack) => info!(buildpack = %buildpack.name, guid = %buildpack.guid, "Buildpack created"),
            Err(e) => warn!(buildpack = %spec.name, error = %e, "Buildpack creation failed"),
        }

        (result, warnings)
    }

    /// Fetch a single buildpack by guid.
    pub async fn get_buildpack(&self, guid: &Guid) -> (Result<Buildpack>, Warnings) {
        let url = match self.url(&format!("/v3/buildpacks/{}", guid)) {
            Ok(url) => url,
            Err(e) => return (Err(e), Warnings::new()),
        };

        let (buildpack, warnings) = self.send_json::<Buildpack>(self.request(Method::GET, url)).await;
        (buildpack.map_err(Error::from), warnings)
    }

    /// Upload the archive at `path` as the bits of buildpack `guid`.
    ///
    /// The control plane processes uploads asynchronously; when it answers
    /// with a job location the job is polled to completion.
    pub async fn upload_buildpack(&self, guid: &Guid, path: &Path) -> (Result<()>, Warnings) {
        let mut warnings = Warnings::new();

        let (file, length) = match open_bits(path).await {
            Ok(opened) => opened,
            Err(e) => {
                let err = Error::Transfer(format!("unable to read {}: {}", path.display(), e));
                return (Err(err), warnings);
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "buildpack.zip".to_string());

        let url = match self.url(&format!("/v3/buildpacks/{}/upload", guid)) {
            Ok(url) => url,
            Err(e) => return (Err(e), warnings),
        };

        info!(%guid, file = %file_name, bytes = length, "Uploading buildpack bits");
        let bits = Part::stream_with_length(Body::from(file), length).file_name(file_name);
        let form = Form::new().part("bits", bits);
        let request = self.request(Method::POST, url).multipart(form);

        let (response, upload_warnings) = self.send(request).await;
        warnings.append(upload_warnings);

        let response = match response {
            Ok(response) => response,
            Err(failure) => {
                let err = self.upload_failure(guid, failure, &mut warnings).await;
                return (Err(err), warnings);
            }
        };

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let Some(location) = location else {
            return (Ok(()), warnings);
        };

        let job_url = match self.resolve(&location) {
            Ok(url) => url,
            Err(e) => return (Err(e), warnings),
        };

        let (job, job_warnings) = self.poll_job(&job_url).await;
        warnings.append(job_warnings);

        match job {
            Ok(job) if job.state == JobState::Complete => (Ok(()), warnings),
            Ok(job) => {
                let err = self.job_failure(guid, &job, &mut warnings).await;
                (Err(err), warnings)
            }
            Err(e) => (Err(e), warnings),
        }
    }

    async fn upload_failure(
        &self,
        guid: &Guid,
        failure: RequestFailure,
        warnings: &mut Warnings,
    ) -> Error {
        let code = match &failure {
            RequestFailure::Status { errors, .. } => errors.first().and_then(|e| e.code),
            RequestFailure::Transport(_) => None,
        };
        let detail = failure.detail().unwrap_or_default().to_string();

        match classify_upload_failure(code, &detail) {
            UploadFailureKind::StackChange => self.stack_change(guid, warnings).await,
            UploadFailureKind::AlreadyExistsForStack
                if failure.status() == Some(StatusCode::UNPROCESSABLE_ENTITY) =>
            {
                Error::AlreadyExistsForStack { message: detail }
            }
            _ => failure.into(),
        }
    }

    async fn job_failure(&self, guid: &Guid, job: &Job, warnings: &mut Warnings) -> Error {
        let first = job.errors.first().cloned().unwrap_or_default();

        match classify_upload_failure(first.code, &first.detail) {
            UploadFailureKind::StackChange => self.stack_change(guid, warnings).await,
            UploadFailureKind::AlreadyExistsForStack => Error::AlreadyExistsForStack {
                message: first.detail,
            },
            UploadFailureKind::Other => Error::JobFailed {
                detail: first.detail,
            },
        }
    }

    /// Build a stack-change error, looking up the buildpack name for the message.
    async fn stack_change(&self, guid: &Guid, warnings: &mut Warnings) -> Error {
        let (buildpack, lookup_warnings) = self.get_buildpack(guid).await;
        warnings.append(lookup_warnings);

        let buildpack_name = match buildpack {
            Ok(buildpack) => buildpack.name,
            Err(e) => {
                warn!(%guid, error = %e, "Could not look up buildpack name");
                guid.to_string()
            }
        };

        Error::StackChange {
            buildpack_name,
            binary_name: self.binary_name.clone(),
        }
    }
}

/// Open the archive for streaming, with its size for the multipart length.
async fn open_bits(path: &Path) -> std::io::Result<(tokio::fs::File, u64)> {
    let file = tokio::fs::File::open(path).await?;
    let length = file.metadata().await?.len();
    Ok((file, length))
}

#[async_trait]
impl ResourceRegistrar for ControlPlaneClient {
    async fn register(&self, spec: &BuildpackSpec) -> (Result<Buildpack>, Warnings) {
        self.create_buildpack(spec).await
    }
}

#[async_trait]
impl ArtifactUploader for ControlPlaneClient {
    async fn upload(&self, guid: &Guid, path: &Path) -> (Result<()>, Warnings) {
        self.upload_buildpack(guid, path).await
    }
}
