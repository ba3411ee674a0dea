// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared builders for the spec scenarios.

use automl_engine::{DriverSpec, PipelineContext};
use automl_platform::FakePlatform;

pub const SCOPE: &str = "automl";

pub fn driver_spec(pipeline: &str) -> DriverSpec {
    DriverSpec {
        pipeline: pipeline.to_string(),
        scope: SCOPE.to_string(),
        url: "https://github.com/acct/proj".to_string(),
        repo_url: "https://github.com/acct/proj".to_string(),
        config_url: "https://raw.githubusercontent.com/acct/proj/master/config.yaml".to_string(),
        project_dir: "proj".to_string(),
        branch: "master".to_string(),
    }
}

pub fn run_context(pipeline: &str) -> PipelineContext {
    PipelineContext {
        pipeline: pipeline.to_string(),
        scope: SCOPE.to_string(),
        branch: "master".to_string(),
        project_dir: "proj".to_string(),
    }
}

/// A platform with the pipeline's repo secret already in place, as the
/// driver lifecycle would have left it.
pub async fn platform_for(pipeline: &str) -> FakePlatform {
    let fake = FakePlatform::new();
    automl_engine::secrets::configure_repo_secret(
        &fake,
        pipeline,
        SCOPE,
        "https://github.com/acct/proj",
        "https://raw.githubusercontent.com/acct/proj/master/config.yaml",
    )
    .await
    .expect("repo secret");
    fake
}
