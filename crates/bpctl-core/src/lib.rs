//! Core domain types and traits for bpctl.
//!
//! This crate contains:
//! - Buildpack resource types and identifiers
//! - The warning accumulator returned alongside control-plane calls
//! - Collaborator traits (session, identity, staging, registration, upload, notices)
//! - The shared error taxonomy

pub mod artifact;
pub mod buildpack;
pub mod error;
pub mod id;
pub mod notify;
pub mod session;
pub mod warnings;

pub use error::{Error, Result, SessionError, StagingError};
pub use id::Guid;
pub use warnings::Warnings;
