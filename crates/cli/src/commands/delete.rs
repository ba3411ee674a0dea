// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `automl delete` - tear down workflows, cronworkflows and secrets.

use automl_core::{fix_resource_name, Error};
use automl_engine::{lifecycle, secrets};
use automl_platform::KubePlatform;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct DeleteArgs {
    #[command(subcommand)]
    command: DeleteCommand,
}

#[derive(Subcommand)]
enum DeleteCommand {
    /// Delete a workflow and all of its resources
    #[command(visible_alias = "w")]
    Workflow(NamedArgs),
    /// Delete a cronworkflow and all of its resources
    #[command(visible_alias = "cw")]
    Cronworkflow(NamedArgs),
    /// Delete a secret
    Secret(NamedArgs),
}

#[derive(Args)]
struct NamedArgs {
    /// Name of the object to delete
    name: String,

    /// Namespace the object lives in
    #[arg(short = 'n', long = "namespace", default_value = automl_core::defaults::NAMESPACE)]
    namespace: String,
}

pub async fn execute(args: DeleteArgs) -> Result<(), Error> {
    let platform = KubePlatform::authenticate().await?;
    match args.command {
        DeleteCommand::Workflow(args) => {
            let (name, scope) = fixed(&args);
            lifecycle::delete_resources(&platform, &name, &scope, false).await
        }
        DeleteCommand::Cronworkflow(args) => {
            let (name, scope) = fixed(&args);
            lifecycle::delete_resources(&platform, &name, &scope, true).await
        }
        DeleteCommand::Secret(args) => {
            let (name, scope) = fixed(&args);
            secrets::delete(&platform, &name, &scope).await
        }
    }
}

fn fixed(args: &NamedArgs) -> (String, String) {
    (
        fix_resource_name(&args.name),
        fix_resource_name(&args.namespace),
    )
}
