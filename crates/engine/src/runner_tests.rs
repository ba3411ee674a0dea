// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automl_core::parse_config;
use automl_platform::{FakePlatform, JobState};

fn ctx() -> PipelineContext {
    PipelineContext {
        pipeline: "demo".to_string(),
        scope: "automl".to_string(),
        branch: "master".to_string(),
        project_dir: "proj".to_string(),
    }
}

async fn fake() -> FakePlatform {
    let fake = FakePlatform::new();
    crate::secrets::configure_repo_secret(&fake, "demo", "automl", "https://u", "https://c")
        .await
        .unwrap();
    fake
}

fn stages_from(doc: &str) -> IndexMap<String, Vec<Step>> {
    parse_config(doc.as_bytes()).unwrap().stages
}

const TWO_STAGE: &str = r#"
stages:
  train:
    - step_name: fit
      path_to_executable: fit.py
      dependency_path: requirements.txt
      timeout: 10
  serve:
    - step_name: api
      path_to_executable: api.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
"#;

#[tokio::test(start_paused = true)]
async fn runs_batch_then_service_stages() {
    let fake = fake().await;
    run(&fake, &ctx(), &stages_from(TWO_STAGE)).await.unwrap();

    assert_eq!(fake.jobs_in("automl").len(), 1);
    assert_eq!(fake.deployments_in("automl").len(), 1);
    assert_eq!(fake.services_in("automl").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_stage_stops_later_stages() {
    let fake = fake().await;
    fake.script_job_states("demo-train-fit-", vec![JobState::Failed]);

    let err = run(&fake, &ctx(), &stages_from(TWO_STAGE)).await.unwrap_err();
    assert!(matches!(err, Error::Stop(_)));

    // The serve stage never ran.
    assert!(fake.deployments_in("automl").is_empty());
    assert!(fake.services_in("automl").is_empty());
}

#[tokio::test(start_paused = true)]
async fn batch_failure_blocks_services_of_the_same_stage() {
    let doc = r#"
stages:
  mixed:
    - step_name: load
      path_to_executable: load.py
      dependency_path: requirements.txt
      timeout: 10
    - step_name: api
      path_to_executable: api.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
"#;
    let fake = fake().await;
    fake.script_job_states("demo-mixed-load-", vec![JobState::Failed]);

    let err = run(&fake, &ctx(), &stages_from(doc)).await.unwrap_err();
    assert!(matches!(err, Error::Stop(_)));
    assert!(fake.deployments_in("automl").is_empty());
}

#[tokio::test(start_paused = true)]
async fn stages_execute_in_declaration_order() {
    let doc = r#"
stages:
  zeta:
    - step_name: first
      path_to_executable: first.py
      dependency_path: requirements.txt
      timeout: 10
  alpha:
    - step_name: second
      path_to_executable: second.py
      dependency_path: requirements.txt
      timeout: 10
"#;
    let fake = fake().await;
    // Fail the stage declared second; the first must already have run.
    fake.script_job_states("demo-alpha-second-", vec![JobState::Failed]);

    let err = run(&fake, &ctx(), &stages_from(doc)).await.unwrap_err();
    assert!(matches!(err, Error::Stop(_)));

    let jobs: Vec<String> = fake
        .jobs_in("automl")
        .into_iter()
        .filter_map(|j| j.metadata.name)
        .collect();
    assert!(jobs.iter().any(|name| name.starts_with("demo-zeta-first-")));
}
