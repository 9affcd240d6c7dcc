//! bpctl CLI tool.

use anyhow::Context;
use bpctl_config::{CliConfig, DEFAULT_BINARY_NAME, default_config_path};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod commands;
mod logging;
mod ui;

#[derive(Parser)]
#[command(name = "bpctl")]
#[command(about = "Register and upload buildpacks", long_about = None)]
struct Cli {
    /// Path to the config file (defaults to $BPCTL_HOME/config.kdl or ~/.bpctl/config.kdl)
    #[arg(long, env = "BPCTL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// API endpoint, overriding the config file
    #[arg(long, env = "BPCTL_API_URL", global = true)]
    api_url: Option<String>,

    /// Access token, overriding the config file
    #[arg(long, env = "BPCTL_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "error", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a buildpack and upload its bits
    CreateBuildpack {
        /// Name of the buildpack
        buildpack: String,
        /// Directory, zip file or http(s) URL of the buildpack
        path: String,
        /// Position among other buildpacks (1 is first)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
        /// Stack to bind the buildpack to
        #[arg(long)]
        stack: Option<String>,
        /// Create the buildpack disabled
        #[arg(long)]
        disable: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::display_failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::CreateBuildpack {
            buildpack,
            path,
            position,
            stack,
            disable,
        } => {
            let args = commands::create_buildpack::CreateBuildpackArgs {
                buildpack,
                path,
                position,
                stack,
                disable,
            };
            commands::create_buildpack::run(config, args).await?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let mut config = CliConfig::load(&path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))?
        .with_binary_name(binary_name());

    if let Some(api) = &cli.api_url {
        config = config.with_api(api.trim_end_matches('/'));
    }
    if let Some(token) = &cli.token {
        config = config.with_token(token.as_str());
    }

    Ok(config)
}

/// Name the binary was invoked as, for hints like "Use 'bpctl login'".
fn binary_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_BINARY_NAME.to_string())
}
