//! `create-buildpack`: stage, register and upload a buildpack.

use anyhow::Result;
use bpctl_client::ControlPlaneClient;
use bpctl_config::CliConfig;
use bpctl_pipeline::{CreateBuildpackPipeline, PipelineOutcome, PipelineRequest};
use bpctl_stager::LocalStager;
use std::sync::Arc;
use tracing::debug;

use crate::ui::ConsoleNotifier;

pub struct CreateBuildpackArgs {
    pub buildpack: String,
    pub path: String,
    pub position: u32,
    pub stack: Option<String>,
    pub disable: bool,
}

pub async fn run(config: CliConfig, args: CreateBuildpackArgs) -> Result<()> {
    let config = Arc::new(config);
    let client = Arc::new(ControlPlaneClient::from_config(&config)?);
    let stager = Arc::new(LocalStager::new()?);
    debug!(api = %client.api_url(), staging_dir = %stager.staging_dir().display(), "Prepared collaborators");

    let pipeline = CreateBuildpackPipeline::new(
        config.clone(),
        config,
        stager,
        client.clone(),
        client,
        Arc::new(ConsoleNotifier),
    );

    let request = PipelineRequest {
        name: args.buildpack,
        path: args.path,
        stack: args.stack,
        position: args.position,
        disabled: args.disable,
    };

    match pipeline.run(&request).await {
        PipelineOutcome::Success { .. } => Ok(()),
        PipelineOutcome::Failure { stage, error, .. } => {
            debug!(%stage, "create-buildpack failed");
            Err(error.into())
        }
    }
}
