//! Pipeline orchestrator - stages, registers and uploads a buildpack in order.

use bpctl_core::Warnings;
use bpctl_core::artifact::ArtifactStager;
use bpctl_core::buildpack::{ArtifactUploader, BuildpackSpec, ResourceRegistrar};
use bpctl_core::notify::Notifier;
use bpctl_core::session::{IdentityProvider, SessionChecker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::outcome::{PipelineOutcome, PipelineStage};

/// Input of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Name to register the buildpack under.
    pub name: String,
    /// Local directory, local archive or remote URL.
    pub path: String,
    pub stack: Option<String>,
    pub position: u32,
    /// Register the buildpack disabled.
    pub disabled: bool,
}

impl PipelineRequest {
    /// Attributes sent to the registrar.
    pub fn spec(&self) -> BuildpackSpec {
        BuildpackSpec {
            name: self.name.clone(),
            stack: self.stack.clone(),
            position: self.position,
            enabled: !self.disabled,
        }
    }
}

/// Orchestrates the creation of one buildpack.
pub struct CreateBuildpackPipeline {
    session: Arc<dyn SessionChecker>,
    identity: Arc<dyn IdentityProvider>,
    stager: Arc<dyn ArtifactStager>,
    registrar: Arc<dyn ResourceRegistrar>,
    uploader: Arc<dyn ArtifactUploader>,
    notifier: Arc<dyn Notifier>,
}

impl CreateBuildpackPipeline {
    pub fn new(
        session: Arc<dyn SessionChecker>,
        identity: Arc<dyn IdentityProvider>,
        stager: Arc<dyn ArtifactStager>,
        registrar: Arc<dyn ResourceRegistrar>,
        uploader: Arc<dyn ArtifactUploader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            identity,
            stager,
            registrar,
            uploader,
            notifier,
        }
    }

    /// Run the pipeline to a terminal outcome.
    ///
    /// Each stage is awaited before the next begins and the first failure
    /// ends the run. Warnings are shown on the notifier as soon as a stage
    /// returns them and are also carried in the outcome.
    pub async fn run(&self, request: &PipelineRequest) -> PipelineOutcome {
        // Only identity matters here; buildpacks are not scoped to an org or space.
        if let Err(e) = self.session.check_target(false, false) {
            warn!(error = %e, "Session check failed");
            return failure(PipelineStage::Session, e, Warnings::new());
        }

        let user = match self.identity.current_user() {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Could not determine current user");
                return failure(PipelineStage::Session, e, Warnings::new());
            }
        };

        self.notifier.info(&format!(
            "Creating buildpack {} as {}...",
            request.name, user.name
        ));

        info!(buildpack = %request.name, source = %request.path, "Staging buildpack");
        let staged = match self.stager.stage(&request.path).await {
            Ok(path) => path,
            Err(e) => {
                warn!(buildpack = %request.name, error = %e, "Staging failed");
                return failure(PipelineStage::Stage, e, Warnings::new());
            }
        };

        let mut warnings = Warnings::new();

        let (created, create_warnings) = self.registrar.register(&request.spec()).await;
        self.notifier.warnings(&create_warnings);
        warnings.append(create_warnings);

        let mut buildpack = match created {
            Ok(buildpack) => buildpack,
            Err(e) => {
                warn!(buildpack = %request.name, error = %e, "Registration failed");
                return failure(PipelineStage::Register, e, warnings);
            }
        };

        self.notifier.info("OK");
        self.notifier.info("");
        self.notifier.info(&format!(
            "Uploading buildpack {} as {}...",
            request.name, user.name
        ));

        info!(buildpack = %buildpack.name, guid = %buildpack.guid, archive = %staged.display(), "Uploading buildpack");
        let (uploaded, upload_warnings) = self.uploader.upload(&buildpack.guid, &staged).await;
        self.notifier.warnings(&upload_warnings);
        warnings.append(upload_warnings);

        if let Err(e) = uploaded {
            warn!(buildpack = %buildpack.name, guid = %buildpack.guid, error = %e, "Upload failed");
            return failure(PipelineStage::Upload, e, warnings);
        }

        buildpack.filename = Some(
            staged
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| staged.display().to_string()),
        );

        self.notifier.info("");
        self.notifier.info("Done uploading");
        self.notifier.info("OK");

        info!(buildpack = %buildpack.name, guid = %buildpack.guid, warnings = warnings.len(), "Buildpack created");
        PipelineOutcome::Success {
            buildpack,
            warnings,
        }
    }
}

fn failure(stage: PipelineStage, error: bpctl_core::Error, warnings: Warnings) -> PipelineOutcome {
    PipelineOutcome::Failure {
        stage,
        error,
        warnings,
    }
}
