//! CLI configuration parsing.
//!
//! The config file is a flat KDL document written by the login flow:
//!
//! ```kdl
//! api "https://api.example.com"
//! token "bearer eyJhbGciOi..."
//! user "admin"
//! org "my-org"
//! space "dev"
//! skip-ssl-validation #false
//! poll-interval-ms 500
//! job-timeout-secs 300
//! ```

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Name the binary is invoked as; used in operator-facing hints.
pub const DEFAULT_BINARY_NAME: &str = "bpctl";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Session and client settings for bpctl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Binary name shown in hints such as "Use 'bpctl login'".
    pub binary_name: String,
    /// Control plane API endpoint.
    pub api: Option<String>,
    /// Access token sent as the Authorization header.
    pub token: Option<String>,
    /// Name of the logged-in operator.
    pub user: Option<String>,
    pub org: Option<String>,
    pub space: Option<String>,
    pub skip_ssl_validation: bool,
    /// Delay between polls of an asynchronous job.
    pub poll_interval: Duration,
    /// Give up on an asynchronous job after this long.
    pub job_timeout: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            api: None,
            token: None,
            user: None,
            org: None,
            space: None,
            skip_ssl_validation: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }
}

impl CliConfig {
    /// Load the config at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = parse_config(&content)?;
        debug!(path = %path.display(), api = ?config.api, "Loaded config");
        Ok(config)
    }

    pub fn with_binary_name(mut self, binary_name: impl Into<String>) -> Self {
        self.binary_name = binary_name.into();
        self
    }

    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = Some(api.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Location of the config file: `$BPCTL_HOME/config.kdl`, else `~/.bpctl/config.kdl`.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    if let Ok(home) = std::env::var("BPCTL_HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home).join("config.kdl"));
        }
    }

    let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
    Ok(home.join(".bpctl").join("config.kdl"))
}

/// Parse CLI configuration from KDL text.
pub fn parse_config(kdl: &str) -> ConfigResult<CliConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut config = CliConfig::default();
    let mut seen = HashSet::new();

    for node in doc.nodes() {
        let name = node.name().value();
        if !seen.insert(name.to_string()) {
            return Err(ConfigError::Duplicate(name.to_string()));
        }

        match name {
            "api" => {
                let api = require_string(node, "api")?;
                url::Url::parse(&api).map_err(|e| ConfigError::InvalidValue {
                    field: "api".to_string(),
                    message: e.to_string(),
                })?;
                config.api = Some(api.trim_end_matches('/').to_string());
            }
            "token" => config.token = non_empty(get_first_string_arg(node)),
            "user" => config.user = non_empty(get_first_string_arg(node)),
            "org" => config.org = non_empty(get_first_string_arg(node)),
            "space" => config.space = non_empty(get_first_string_arg(node)),
            "skip-ssl-validation" => {
                config.skip_ssl_validation = get_first_bool_arg(node).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        field: "skip-ssl-validation".to_string(),
                        message: "expected #true or #false".to_string(),
                    }
                })?;
            }
            "poll-interval-ms" => {
                let ms = require_positive(node, "poll-interval-ms")?;
                config.poll_interval = Duration::from_millis(ms);
            }
            "job-timeout-secs" => {
                let secs = require_positive(node, "job-timeout-secs")?;
                config.job_timeout = Duration::from_secs(secs);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn require_string(node: &KdlNode, field: &str) -> ConfigResult<String> {
    get_first_string_arg(node).ok_or_else(|| ConfigError::InvalidValue {
        field: field.to_string(),
        message: "expected a string".to_string(),
    })
}

fn require_positive(node: &KdlNode, field: &str) -> ConfigResult<u64> {
    get_first_integer_arg(node)
        .filter(|v| *v > 0)
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: field.to_string(),
            message: "expected a positive integer".to_string(),
        })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_first_bool_arg(node: &KdlNode) -> Option<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
}

fn get_first_integer_arg(node: &KdlNode) -> Option<i128> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
}
