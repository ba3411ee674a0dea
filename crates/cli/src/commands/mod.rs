// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers.
//!
//! Each handler follows the same explicit sequence: parse and fix inputs,
//! authenticate the platform client, then operate. No hidden wrappers.

pub mod create;
pub mod delete;
pub mod get;
pub mod run;
pub mod update;

use automl_core::{fix_resource_name, Error, GitUrl};
use automl_engine::DriverSpec;
use std::collections::BTreeMap;

/// Parse CLI `KEY=value` secret pairs.
pub fn parse_secret_data(pairs: &[String]) -> Result<BTreeMap<String, String>, Error> {
    let mut data = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::Value("secrets must be in the KEY=value form".to_string()))?;
        if key.is_empty() {
            return Err(Error::Value("secrets must be in the KEY=value form".to_string()));
        }
        data.insert(key.to_string(), value.to_string());
    }
    Ok(data)
}

/// Shared URL/name/token arguments of create and update.
#[derive(Debug, clap::Args)]
pub struct SourceArgs {
    /// Https URL of the remote git repository
    pub url: String,

    /// Name of the workflow
    pub name: String,

    /// PAT token for private repositories
    #[arg(short = 't', long = "token")]
    pub token: Option<String>,

    /// Id of the gitlab private project
    #[arg(long = "id")]
    pub id: Option<String>,

    /// Git branch
    #[arg(short = 'b', long = "branch", default_value = "master")]
    pub branch: String,

    /// Namespace to place the workflow in
    #[arg(short = 'n', long = "namespace", default_value = automl_core::defaults::NAMESPACE)]
    pub namespace: String,

    /// Path of the configuration file inside the repository
    #[arg(short = 'f', long = "file", default_value = "config.yaml")]
    pub file: String,

    /// Download and validate the configuration before touching the cluster
    #[arg(long = "check")]
    pub check: bool,
}

impl SourceArgs {
    /// Resolve the git remote and assemble the driver spec.
    pub fn driver_spec(&self) -> Result<(GitUrl, DriverSpec), Error> {
        let pipeline = fix_resource_name(&self.name);
        let scope = fix_resource_name(&self.namespace);
        let git = GitUrl::parse(
            &self.url,
            self.token.as_deref(),
            self.id.as_deref(),
            &self.branch,
            &self.file,
        )?;
        let spec = DriverSpec {
            pipeline,
            scope,
            url: self.url.clone(),
            repo_url: git.repo_url(),
            config_url: git.raw_config_url()?,
            project_dir: git.project().to_string(),
            branch: self.branch.clone(),
        };
        Ok((git, spec))
    }
}

/// Download and validate the configuration file (`--check`).
pub async fn check_config(git: &GitUrl) -> Result<(), Error> {
    let raw = automl_remote::download_config(&git.raw_config_url()?).await?;
    let config = automl_core::parse_config(&raw)?;
    config
        .verify_images(&automl_remote::RegistryProbe::new())
        .await
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
