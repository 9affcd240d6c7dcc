//! Error types for bpctl.
//!
//! Every collaborator of the pipeline reports failures through [`Error`], and
//! the pipeline hands them back to the caller untouched. The variants are the
//! distinguishable kinds the command layer renders specific messages for.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("Buildpack {name} already exists")]
    NameTaken { name: String },

    #[error(
        "Buildpack {buildpack_name} already exists with a different stack. \
         Use '{binary_name} delete-buildpack' and recreate it to change the stack."
    )]
    StackChange {
        buildpack_name: String,
        binary_name: String,
    },

    #[error("{message}")]
    AlreadyExistsForStack { message: String },

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("control plane returned {status}: {detail}")]
    Api {
        status: u16,
        code: Option<i64>,
        detail: String,
    },

    #[error("job failed: {detail}")]
    JobFailed { detail: String },
}

impl Error {
    /// Whether this error came from the session/identity precondition.
    pub fn is_session(&self) -> bool {
        matches!(self, Error::Session(_))
    }

    /// Whether this error came from staging the local artifact.
    pub fn is_staging(&self) -> bool {
        matches!(self, Error::Staging(_))
    }
}

/// Session or identity is unusable; raised before any stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Not logged in. Use '{binary_name} login' to log in.")]
    NotLoggedIn { binary_name: String },

    #[error("No API endpoint set. Use '{binary_name} api' to set an endpoint.")]
    NoApiEndpoint { binary_name: String },

    #[error("No org targeted, use '{binary_name} target -o ORG' to target an org.")]
    NoOrganizationTargeted { binary_name: String },

    #[error("No space targeted, use '{binary_name} target -s SPACE' to target a space.")]
    NoSpaceTargeted { binary_name: String },
}

/// The local artifact could not be turned into an uploadable archive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    #[error("The specified path '{path}' does not exist.")]
    NotFound { path: String },

    #[error("The specified path '{path}' cannot be an empty directory.")]
    EmptyDirectory { path: String },

    #[error("The specified path '{path}' is not a directory or a zip archive.")]
    UnrecognizedFormat { path: String },

    #[error("unable to read '{path}': {message}")]
    Unreadable { path: String, message: String },

    #[error("download of '{url}' failed: {message}")]
    Download { url: String, message: String },

    #[error("unable to archive '{path}': {message}")]
    Archive { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
