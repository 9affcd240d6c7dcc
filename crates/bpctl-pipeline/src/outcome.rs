//! Terminal results of a pipeline run.

use bpctl_core::buildpack::Buildpack;
use bpctl_core::{Error, Result, Warnings};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The step a failed run stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PipelineStage {
    #[display("session check")]
    Session,
    #[display("staging")]
    Stage,
    #[display("registration")]
    Register,
    #[display("upload")]
    Upload,
}

/// Result of one pipeline run.
///
/// `warnings` holds everything collected up to the end of the run, in the
/// order the stages returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success {
        buildpack: Buildpack,
        warnings: Warnings,
    },
    Failure {
        stage: PipelineStage,
        error: Error,
        warnings: Warnings,
    },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    pub fn warnings(&self) -> &Warnings {
        match self {
            PipelineOutcome::Success { warnings, .. } | PipelineOutcome::Failure { warnings, .. } => {
                warnings
            }
        }
    }

    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineOutcome::Success { .. } => None,
            PipelineOutcome::Failure { stage, .. } => Some(*stage),
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            PipelineOutcome::Success { .. } => None,
            PipelineOutcome::Failure { error, .. } => Some(error),
        }
    }

    /// Drop the warnings and keep the buildpack or the propagated error.
    pub fn into_result(self) -> Result<Buildpack> {
        match self {
            PipelineOutcome::Success { buildpack, .. } => Ok(buildpack),
            PipelineOutcome::Failure { error, .. } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_error_verbatim() {
        let error = Error::NameTaken {
            name: "x".to_string(),
        };
        let outcome = PipelineOutcome::Failure {
            stage: PipelineStage::Register,
            error: error.clone(),
            warnings: Warnings::from(["warning-1"]),
        };

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_stage(), Some(PipelineStage::Register));
        assert_eq!(outcome.warnings().as_slice(), &["warning-1"]);
        assert_eq!(outcome.into_result(), Err(error));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Session.to_string(), "session check");
        assert_eq!(PipelineStage::Upload.to_string(), "upload");
    }
}
