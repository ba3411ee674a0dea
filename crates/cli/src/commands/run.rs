// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `automl run` - the driver entry point.
//!
//! Executed inside the cluster by the driver job. Reads `CONFIG_URL` (set
//! from the repo secret), downloads and validates the configuration, then
//! drives the pipeline stage by stage.

use automl_core::{fix_resource_name, Error};
use automl_engine::PipelineContext;
use automl_platform::KubePlatform;
use automl_remote::{download_config, RegistryProbe};
use clap::Args;

#[derive(Args)]
pub struct RunArgs {
    /// Name of the workflow being executed
    #[arg(short = 'w', long = "workflow")]
    workflow: String,

    /// Git branch to check out in step containers
    #[arg(short = 'b', long = "branch")]
    branch: String,

    /// Project directory inside the repository
    #[arg(long = "project-dir")]
    project_dir: String,

    /// Namespace the pipeline runs in
    #[arg(short = 'n', long = "namespace")]
    namespace: String,
}

pub async fn execute(args: RunArgs) -> Result<(), Error> {
    let platform = KubePlatform::authenticate().await?;

    let config_url = std::env::var("CONFIG_URL")
        .map_err(|_| Error::Value("CONFIG_URL is not set in the driver environment".to_string()))?;
    let raw = download_config(&config_url).await?;
    let config = automl_core::parse_config(&raw)?;
    config.verify_images(&RegistryProbe::new()).await?;

    let ctx = PipelineContext {
        pipeline: fix_resource_name(&args.workflow),
        scope: fix_resource_name(&args.namespace),
        branch: args.branch.clone(),
        project_dir: args.project_dir.clone(),
    };
    automl_engine::run(&platform, &ctx, &config.stages).await
}
