// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `automl update` - update workflows, cronworkflows and secrets.

use super::{check_config, parse_secret_data, SourceArgs};
use automl_core::{fix_resource_name, validate_schedule, Error};
use automl_engine::{lifecycle, secrets};
use automl_platform::KubePlatform;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct UpdateArgs {
    #[command(subcommand)]
    command: UpdateCommand,
}

#[derive(Subcommand)]
enum UpdateCommand {
    /// Update a workflow
    #[command(visible_alias = "w")]
    Workflow(SourceArgs),
    /// Update a scheduled workflow
    #[command(visible_alias = "cw")]
    Cronworkflow(CronworkflowArgs),
    /// Update a secret
    Secret(SecretArgs),
}

#[derive(Args)]
struct CronworkflowArgs {
    /// New schedule; the existing one is preserved when omitted
    #[arg(short = 's', long = "schedule")]
    schedule: Option<String>,

    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args)]
struct SecretArgs {
    /// Name of the secret
    name: String,

    /// Data in the KEY=value form
    data: Vec<String>,

    /// Namespace of the secret
    #[arg(short = 'n', long = "namespace", default_value = automl_core::defaults::NAMESPACE)]
    namespace: String,
}

pub async fn execute(args: UpdateArgs) -> Result<(), Error> {
    match args.command {
        UpdateCommand::Workflow(source) => workflow(source).await,
        UpdateCommand::Cronworkflow(args) => cronworkflow(args).await,
        UpdateCommand::Secret(args) => secret(args).await,
    }
}

async fn workflow(source: SourceArgs) -> Result<(), Error> {
    let (git, spec) = source.driver_spec()?;
    let platform = KubePlatform::authenticate().await?;
    if source.check {
        check_config(&git).await?;
    }
    lifecycle::update_pipeline(&platform, &spec).await
}

async fn cronworkflow(args: CronworkflowArgs) -> Result<(), Error> {
    if let Some(schedule) = &args.schedule {
        validate_schedule(schedule)?;
    }
    let (git, spec) = args.source.driver_spec()?;
    let platform = KubePlatform::authenticate().await?;
    if args.source.check {
        check_config(&git).await?;
    }
    lifecycle::update_scheduled_pipeline(&platform, &spec, args.schedule.as_deref()).await
}

async fn secret(args: SecretArgs) -> Result<(), Error> {
    let name = fix_resource_name(&args.name);
    let scope = fix_resource_name(&args.namespace);
    let data = parse_secret_data(&args.data)?;

    let platform = KubePlatform::authenticate().await?;
    secrets::update(&platform, &name, data, &scope).await
}
