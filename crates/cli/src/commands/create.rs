// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `automl create` - create workflows, cronworkflows and secrets.

use super::{check_config, parse_secret_data, SourceArgs};
use automl_core::{fix_resource_name, validate_schedule, Error};
use automl_engine::{access, lifecycle, secrets};
use automl_platform::KubePlatform;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct CreateArgs {
    #[command(subcommand)]
    command: CreateCommand,
}

#[derive(Subcommand)]
enum CreateCommand {
    /// Create a workflow
    #[command(visible_alias = "w")]
    Workflow(SourceArgs),
    /// Create a scheduled workflow
    #[command(visible_alias = "cw")]
    Cronworkflow(CronworkflowArgs),
    /// Create a secret
    Secret(SecretArgs),
}

#[derive(Args)]
struct CronworkflowArgs {
    /// Schedule in the five-field cron form, e.g. `0 12 * * *`
    #[arg(short = 's', long = "schedule", required = true)]
    schedule: String,

    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args)]
struct SecretArgs {
    /// Name of the secret
    name: String,

    /// Data in the KEY=value form
    data: Vec<String>,

    /// Name of a workflow to bind the secret to
    #[arg(short = 'w', long = "workflow")]
    workflow: Option<String>,

    /// Namespace to put the secret in
    #[arg(short = 'n', long = "namespace", default_value = automl_core::defaults::NAMESPACE)]
    namespace: String,

    /// Secret type
    #[arg(short = 't', long = "type", default_value = "Opaque")]
    kind: String,
}

pub async fn execute(args: CreateArgs) -> Result<(), Error> {
    match args.command {
        CreateCommand::Workflow(source) => workflow(source).await,
        CreateCommand::Cronworkflow(args) => cronworkflow(args).await,
        CreateCommand::Secret(args) => secret(args).await,
    }
}

async fn workflow(source: SourceArgs) -> Result<(), Error> {
    let (git, spec) = source.driver_spec()?;
    let platform = KubePlatform::authenticate().await?;
    if source.check {
        check_config(&git).await?;
    }
    lifecycle::create_pipeline(&platform, &spec).await
}

async fn cronworkflow(args: CronworkflowArgs) -> Result<(), Error> {
    validate_schedule(&args.schedule)?;
    let (git, spec) = args.source.driver_spec()?;
    let platform = KubePlatform::authenticate().await?;
    if args.source.check {
        check_config(&git).await?;
    }
    lifecycle::create_scheduled_pipeline(&platform, &spec, &args.schedule).await
}

async fn secret(args: SecretArgs) -> Result<(), Error> {
    let name = fix_resource_name(&args.name);
    let scope = fix_resource_name(&args.namespace);
    let pipeline = args.workflow.as_deref().map(fix_resource_name);
    let data = parse_secret_data(&args.data)?;

    let platform = KubePlatform::authenticate().await?;
    access::ensure(&platform, &scope).await?;
    secrets::create(
        &platform,
        &name,
        data,
        &scope,
        pipeline.as_deref(),
        Some(&args.kind),
    )
    .await
}
