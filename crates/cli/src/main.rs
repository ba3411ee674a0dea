// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! automl - pipeline orchestration on Kubernetes

mod boundary;
mod commands;
mod table;

use clap::{Parser, Subcommand};
use commands::{create, delete, get, run, update};

#[derive(Parser)]
#[command(
    name = "automl",
    version,
    about = "Deploy multi-stage ML pipelines as Kubernetes workloads"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create workflows, cronworkflows or secrets
    Create(create::CreateArgs),
    /// Update workflows, cronworkflows or secrets
    Update(update::UpdateArgs),
    /// Delete workflows, cronworkflows or secrets
    Delete(delete::DeleteArgs),
    /// Describe workflows, cronworkflows, their resources and secrets
    Get(get::GetArgs),
    /// Driver entry point: execute a pipeline inside the cluster
    #[command(hide = true)]
    Run(run::RunArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create(args) => create::execute(args).await,
        Commands::Update(args) => update::execute(args).await,
        Commands::Delete(args) => delete::execute(args).await,
        Commands::Get(args) => get::execute(args).await,
        Commands::Run(args) => run::execute(args).await,
    };

    if let Err(err) = result {
        boundary::report(&err);
        std::process::exit(1);
    }
}
