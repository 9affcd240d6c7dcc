//! Artifact staging for bpctl.
//!
//! Resolves the operator-supplied buildpack source to one local archive:
//! - remote `http(s)` URLs are downloaded
//! - existing zip archives are used as-is, whatever their extension
//! - directories are zipped into the staging directory

pub mod archive;
pub mod download;
pub mod local;

pub use download::Downloader;
pub use local::LocalStager;
