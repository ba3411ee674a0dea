// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `automl get` - tabular views over the live platform state.

use crate::table::Table;
use automl_core::labels::{Selector, PIPELINE_LABEL, STAGE_LABEL, STEP_LABEL};
use automl_core::{fix_resource_name, Error};
use automl_engine::{lifecycle, logs};
use automl_platform::{KubePlatform, PlatformClient};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct GetArgs {
    #[command(subcommand)]
    command: GetCommand,
}

#[derive(Subcommand)]
enum GetCommand {
    /// List workflows of a namespace
    #[command(visible_alias = "ws")]
    Workflows(ScopeArgs),
    /// List cronworkflows of a namespace
    #[command(visible_alias = "cws")]
    Cronworkflows(ScopeArgs),
    /// List secrets of a namespace
    Secrets(ScopeArgs),
    /// Describe the resources of one workflow
    #[command(visible_alias = "w")]
    Workflow(NamedArgs),
    /// Describe the resources of one cronworkflow
    #[command(visible_alias = "cw")]
    Cronworkflow(NamedArgs),
}

#[derive(Args)]
struct ScopeArgs {
    /// Namespace to search in
    #[arg(short = 'n', long = "namespace", default_value = automl_core::defaults::NAMESPACE)]
    namespace: String,
}

#[derive(Args)]
struct NamedArgs {
    /// Name of the workflow
    name: String,

    /// Namespace to search in
    #[arg(short = 'n', long = "namespace", default_value = automl_core::defaults::NAMESPACE)]
    namespace: String,

    /// Print the driver logs instead of the resource table
    #[arg(long = "logs")]
    logs: bool,
}

pub async fn execute(args: GetArgs) -> Result<(), Error> {
    let platform = KubePlatform::authenticate().await?;
    match args.command {
        GetCommand::Workflows(args) => workflows(&platform, &args, false).await,
        GetCommand::Cronworkflows(args) => workflows(&platform, &args, true).await,
        GetCommand::Secrets(args) => secrets(&platform, &args).await,
        GetCommand::Workflow(args) => workflow(&platform, &args, false).await,
        GetCommand::Cronworkflow(args) => workflow(&platform, &args, true).await,
    }
}

fn label_of(labels: Option<&std::collections::BTreeMap<String, String>>, key: &str) -> String {
    labels
        .and_then(|labels| labels.get(key).cloned())
        .unwrap_or_default()
}

fn annotation_of(
    annotations: Option<&std::collections::BTreeMap<String, String>>,
    key: &str,
) -> String {
    annotations
        .and_then(|annotations| annotations.get(key).cloned())
        .unwrap_or_default()
}

async fn workflows(
    platform: &KubePlatform,
    args: &ScopeArgs,
    scheduled: bool,
) -> Result<(), Error> {
    let scope = fix_resource_name(&args.namespace);
    let selector = Selector::all().runner().to_string();

    let mut table = if scheduled {
        Table::new(vec!["namespace", "name", "url", "schedule"])
    } else {
        Table::new(vec!["namespace", "name", "url"])
    };

    if scheduled {
        for cron in platform.list_cron_jobs(&scope, &selector).await? {
            table.row(vec![
                scope.clone(),
                label_of(cron.metadata.labels.as_ref(), PIPELINE_LABEL),
                annotation_of(cron.metadata.annotations.as_ref(), "url"),
                cron.spec.map(|spec| spec.schedule).unwrap_or_default(),
            ]);
        }
    } else {
        for job in platform.list_jobs(&scope, &selector).await? {
            table.row(vec![
                scope.clone(),
                label_of(job.metadata.labels.as_ref(), PIPELINE_LABEL),
                annotation_of(job.metadata.annotations.as_ref(), "url"),
            ]);
        }
    }

    if table.is_empty() {
        tracing::warn!(scope = %scope, scheduled, "no workflows were found");
    } else {
        print!("{}", table.render());
    }
    Ok(())
}

async fn secrets(platform: &KubePlatform, args: &ScopeArgs) -> Result<(), Error> {
    let scope = fix_resource_name(&args.namespace);
    let mut table = Table::new(vec!["name", "namespace", "workflow", "data keys"]);

    for secret in platform
        .list_secrets(&scope, &Selector::all().to_string())
        .await?
    {
        let keys: Vec<String> = secret.data.unwrap_or_default().into_keys().collect();
        table.row(vec![
            secret.metadata.name.unwrap_or_default(),
            scope.clone(),
            label_of(secret.metadata.labels.as_ref(), PIPELINE_LABEL),
            keys.join(","),
        ]);
    }

    if table.is_empty() {
        tracing::warn!(scope = %scope, "no secrets were found");
    } else {
        print!("{}", table.render());
    }
    Ok(())
}

async fn workflow(platform: &KubePlatform, args: &NamedArgs, scheduled: bool) -> Result<(), Error> {
    let name = fix_resource_name(&args.name);
    let scope = fix_resource_name(&args.namespace);

    let exists = if scheduled {
        lifecycle::cron_runner_exists(platform, &name, &scope).await?
    } else {
        lifecycle::runner_exists(platform, &name, &scope).await?
    };
    if !exists {
        tracing::warn!(pipeline = %name, scope = %scope, "no specified workflow exists");
        return Ok(());
    }

    if args.logs {
        if let Some(driver_logs) = logs::runner_logs(platform, &name, &scope, scheduled).await {
            println!("{driver_logs}");
        }
        return Ok(());
    }

    let selector = Selector::pipeline(&name).to_string();
    let mut table = Table::new(vec!["kind", "stage", "step", "name", "executable"]);

    for job in platform.list_jobs(&scope, &selector).await? {
        if label_of(job.metadata.labels.as_ref(), "kind") == "runner" {
            continue;
        }
        table.row(vec![
            "Job".to_string(),
            label_of(job.metadata.labels.as_ref(), STAGE_LABEL),
            label_of(job.metadata.labels.as_ref(), STEP_LABEL),
            job.metadata.name.unwrap_or_default(),
            annotation_of(job.metadata.annotations.as_ref(), "executable_module"),
        ]);
    }
    for deployment in platform.list_deployments(&scope, &selector).await? {
        table.row(vec![
            "Deployment".to_string(),
            label_of(deployment.metadata.labels.as_ref(), STAGE_LABEL),
            label_of(deployment.metadata.labels.as_ref(), STEP_LABEL),
            deployment.metadata.name.unwrap_or_default(),
            annotation_of(
                deployment.metadata.annotations.as_ref(),
                "executable_module",
            ),
        ]);
    }

    if table.is_empty() {
        tracing::warn!(pipeline = %name, scope = %scope, "requested resources are not found yet");
    } else {
        print!("{}", table.render());
    }
    Ok(())
}
