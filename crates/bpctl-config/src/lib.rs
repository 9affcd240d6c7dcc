//! KDL configuration for bpctl.
//!
//! This crate handles:
//! - Locating and parsing the CLI config file (config.kdl)
//! - Session and identity checks backed by the stored credentials

pub mod error;
pub mod session;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{CliConfig, DEFAULT_BINARY_NAME, default_config_path, parse_config};
