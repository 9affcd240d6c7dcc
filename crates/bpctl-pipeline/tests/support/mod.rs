//! Fake collaborators recording how the pipeline calls them.

#![allow(dead_code)]

use async_trait::async_trait;
use bpctl_core::artifact::ArtifactStager;
use bpctl_core::buildpack::{
    ArtifactUploader, Buildpack, BuildpackSpec, BuildpackState, ResourceRegistrar,
};
use bpctl_core::notify::Notifier;
use bpctl_core::session::{IdentityProvider, SessionChecker, User};
use bpctl_core::{Error, Guid, Result, Warnings};
use bpctl_pipeline::{CreateBuildpackPipeline, PipelineRequest};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub struct FakeSession {
    pub result: Result<()>,
    pub calls: Mutex<Vec<(bool, bool)>>,
}

impl SessionChecker for FakeSession {
    fn check_target(&self, require_org: bool, require_space: bool) -> Result<()> {
        self.calls.lock().unwrap().push((require_org, require_space));
        self.result.clone()
    }
}

pub struct FakeIdentity {
    pub result: Result<User>,
}

impl IdentityProvider for FakeIdentity {
    fn current_user(&self) -> Result<User> {
        self.result.clone()
    }
}

pub struct FakeStager {
    pub result: Result<PathBuf>,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ArtifactStager for FakeStager {
    async fn stage(&self, source: &str) -> Result<PathBuf> {
        self.calls.lock().unwrap().push(source.to_string());
        self.result.clone()
    }
}

pub struct FakeRegistrar {
    pub result: Result<Buildpack>,
    pub warnings: Warnings,
    pub calls: Mutex<Vec<BuildpackSpec>>,
}

#[async_trait]
impl ResourceRegistrar for FakeRegistrar {
    async fn register(&self, spec: &BuildpackSpec) -> (Result<Buildpack>, Warnings) {
        self.calls.lock().unwrap().push(spec.clone());
        (self.result.clone(), self.warnings.clone())
    }
}

pub struct FakeUploader {
    pub result: Result<()>,
    pub warnings: Warnings,
    pub calls: Mutex<Vec<(Guid, PathBuf)>>,
}

#[async_trait]
impl ArtifactUploader for FakeUploader {
    async fn upload(&self, guid: &Guid, path: &Path) -> (Result<()>, Warnings) {
        self.calls
            .lock()
            .unwrap()
            .push((guid.clone(), path.to_path_buf()));
        (self.result.clone(), self.warnings.clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub info: Mutex<Vec<String>>,
    pub warn: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn info_lines(&self) -> Vec<String> {
        self.info.lock().unwrap().clone()
    }

    pub fn warn_lines(&self) -> Vec<String> {
        self.warn.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, line: &str) {
        self.info.lock().unwrap().push(line.to_string());
    }

    fn warn(&self, line: &str) {
        self.warn.lock().unwrap().push(line.to_string());
    }
}

pub fn registered_buildpack(enabled: bool) -> Buildpack {
    Buildpack {
        guid: Guid::from("some-guid"),
        name: "some-buildpack".to_string(),
        position: 7,
        enabled,
        locked: false,
        stack: Some("buildpack-1-stack".to_string()),
        filename: None,
        state: BuildpackState::AwaitingUpload,
        created_at: None,
        updated_at: None,
    }
}

pub fn request() -> PipelineRequest {
    PipelineRequest {
        name: "some-buildpack".to_string(),
        path: "/path/to/buildpack.zip".to_string(),
        stack: None,
        position: 7,
        disabled: false,
    }
}

/// A pipeline whose collaborators all succeed; tests override what they need.
pub struct Harness {
    pub session: Arc<FakeSession>,
    pub identity: Arc<FakeIdentity>,
    pub stager: Arc<FakeStager>,
    pub registrar: Arc<FakeRegistrar>,
    pub uploader: Arc<FakeUploader>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            session: Arc::new(FakeSession {
                result: Ok(()),
                calls: Mutex::default(),
            }),
            identity: Arc::new(FakeIdentity {
                result: Ok(User {
                    name: "the-user".to_string(),
                }),
            }),
            stager: Arc::new(FakeStager {
                result: Ok(PathBuf::from("buildpack.zip")),
                calls: Mutex::default(),
            }),
            registrar: Arc::new(FakeRegistrar {
                result: Ok(registered_buildpack(true)),
                warnings: Warnings::from(["some-create-warning-1"]),
                calls: Mutex::default(),
            }),
            uploader: Arc::new(FakeUploader {
                result: Ok(()),
                warnings: Warnings::from(["some-upload-warning-1"]),
                calls: Mutex::default(),
            }),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }
}

impl Harness {
    pub fn with_session(mut self, result: Result<()>) -> Self {
        self.session = Arc::new(FakeSession {
            result,
            calls: Mutex::default(),
        });
        self
    }

    pub fn with_identity(mut self, result: Result<User>) -> Self {
        self.identity = Arc::new(FakeIdentity { result });
        self
    }

    pub fn with_stager(mut self, result: Result<PathBuf>) -> Self {
        self.stager = Arc::new(FakeStager {
            result,
            calls: Mutex::default(),
        });
        self
    }

    pub fn with_registrar<const N: usize>(
        mut self,
        result: Result<Buildpack>,
        warnings: [&str; N],
    ) -> Self {
        self.registrar = Arc::new(FakeRegistrar {
            result,
            warnings: Warnings::from(warnings),
            calls: Mutex::default(),
        });
        self
    }

    pub fn with_uploader<const N: usize>(mut self, result: Result<()>, warnings: [&str; N]) -> Self {
        self.uploader = Arc::new(FakeUploader {
            result,
            warnings: Warnings::from(warnings),
            calls: Mutex::default(),
        });
        self
    }

    pub fn pipeline(&self) -> CreateBuildpackPipeline {
        CreateBuildpackPipeline::new(
            self.session.clone(),
            self.identity.clone(),
            self.stager.clone(),
            self.registrar.clone(),
            self.uploader.clone(),
            self.notifier.clone(),
        )
    }

    pub fn register_calls(&self) -> Vec<BuildpackSpec> {
        self.registrar.calls.lock().unwrap().clone()
    }

    pub fn upload_calls(&self) -> Vec<(Guid, PathBuf)> {
        self.uploader.calls.lock().unwrap().clone()
    }

    pub fn stage_calls(&self) -> Vec<String> {
        self.stager.calls.lock().unwrap().clone()
    }
}

pub fn name_taken(name: &str) -> Error {
    Error::NameTaken {
        name: name.to_string(),
    }
}
