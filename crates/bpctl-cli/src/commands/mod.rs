//! CLI command implementations.

pub mod create_buildpack;
