// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline runner scenarios.

use super::prelude::*;
use automl_core::{parse_config, Error};
use automl_platform::{JobState, RolloutStatus};

#[tokio::test(start_paused = true)]
async fn service_stage_timeout_rolls_back_and_exposes_nothing() {
    let fake = platform_for("demo").await;

    // First revision becomes available and is the rollback target.
    let v1 = parse_config(
        br#"
stages:
  serve:
    - step_name: api
      path_to_executable: api_v1.py
      dependency_path: requirements.txt
      timeout: 10
      replicas: 2
      service:
        port: 5000
        ingress: true
"#,
    )
    .unwrap();
    automl_engine::run(&fake, &run_context("demo"), &v1.stages)
        .await
        .unwrap();

    // Second revision never advances availableReplicas.
    fake.script_rollout(
        "demo-serve-api",
        vec![RolloutStatus {
            replicas: Some(2),
            available_replicas: Some(0),
        }],
    );
    let v2 = parse_config(
        br#"
stages:
  serve:
    - step_name: api
      path_to_executable: api_v2.py
      dependency_path: requirements.txt
      timeout: 2
      replicas: 2
      service:
        port: 5000
        ingress: true
"#,
    )
    .unwrap();
    let started = tokio::time::Instant::now();
    let err = automl_engine::run(&fake, &run_context("demo"), &v2.stages)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout(_)));
    // At least the deadline plus the warm-up elapsed before giving up.
    assert!(started.elapsed() >= std::time::Duration::from_secs(2 + 5));

    // Reverted to the previous body.
    let deployments = fake.deployments_in(SCOPE);
    assert_eq!(deployments.len(), 1);
    assert_eq!(
        deployments[0].metadata.annotations.clone().unwrap()["executable_module"],
        "api_v1.py"
    );

    // The first revision created the exposure; the failed one added nothing.
    assert_eq!(fake.services_in(SCOPE).len(), 1);
    assert_eq!(fake.ingresses_in(SCOPE).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn batch_stage_failure_halts_the_pipeline_with_logs() {
    let fake = platform_for("demo").await;
    fake.script_job_states("demo-train-bad-", vec![JobState::Active, JobState::Failed]);
    fake.script_job_log("demo-train-bad-", "ValueError: bad input");

    let config = parse_config(
        br#"
stages:
  train:
    - step_name: good
      path_to_executable: good.py
      dependency_path: requirements.txt
      timeout: 10
    - step_name: bad
      path_to_executable: bad.py
      dependency_path: requirements.txt
      timeout: 10
  serve:
    - step_name: api
      path_to_executable: api.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
"#,
    )
    .unwrap();

    let err = automl_engine::run(&fake, &run_context("demo"), &config.stages)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Stop(_)));
    assert!(err.to_string().contains("ValueError: bad input"));

    // The next stage never ran.
    assert!(fake.deployments_in(SCOPE).is_empty());
    assert!(fake.services_in(SCOPE).is_empty());
}

#[tokio::test(start_paused = true)]
async fn shrinking_a_revision_collects_removed_steps() {
    let fake = platform_for("demo").await;

    let three = parse_config(
        br#"
stages:
  serve:
    - step_name: a
      path_to_executable: a.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
    - step_name: b
      path_to_executable: b.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
    - step_name: c
      path_to_executable: c.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
        ingress: true
"#,
    )
    .unwrap();
    automl_engine::run(&fake, &run_context("demo"), &three.stages)
        .await
        .unwrap();
    assert_eq!(fake.deployments_in(SCOPE).len(), 3);

    let two = parse_config(
        br#"
stages:
  serve:
    - step_name: a
      path_to_executable: a.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
    - step_name: b
      path_to_executable: b.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
"#,
    )
    .unwrap();
    automl_engine::run(&fake, &run_context("demo"), &two.stages)
        .await
        .unwrap();

    let deployment_names: Vec<String> = fake
        .deployments_in(SCOPE)
        .into_iter()
        .filter_map(|d| d.metadata.name)
        .collect();
    assert_eq!(
        deployment_names,
        vec!["demo-serve-a".to_string(), "demo-serve-b".to_string()]
    );

    let service_names: Vec<String> = fake
        .services_in(SCOPE)
        .into_iter()
        .filter_map(|s| s.metadata.name)
        .collect();
    assert!(!service_names.contains(&"demo-serve-c".to_string()));
    assert!(fake.ingresses_in(SCOPE).is_empty());
}

#[tokio::test(start_paused = true)]
async fn reapplying_a_revision_produces_no_net_change() {
    let fake = platform_for("demo").await;
    let config = parse_config(
        br#"
stages:
  serve:
    - step_name: api
      path_to_executable: api.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
"#,
    )
    .unwrap();

    automl_engine::run(&fake, &run_context("demo"), &config.stages)
        .await
        .unwrap();
    let before: Vec<String> = fake
        .deployments_in(SCOPE)
        .into_iter()
        .filter_map(|d| d.metadata.name)
        .collect();

    automl_engine::run(&fake, &run_context("demo"), &config.stages)
        .await
        .unwrap();
    let after: Vec<String> = fake
        .deployments_in(SCOPE)
        .into_iter()
        .filter_map(|d| d.metadata.name)
        .collect();

    assert_eq!(before, after);
    assert_eq!(fake.services_in(SCOPE).len(), 1);
}
