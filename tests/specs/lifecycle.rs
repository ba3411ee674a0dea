// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver lifecycle scenarios.

use super::prelude::*;
use automl_core::Error;
use automl_engine::lifecycle;
use automl_platform::FakePlatform;

#[tokio::test]
async fn create_one_shot_pipeline_when_none_exists() {
    let fake = FakePlatform::new();
    lifecycle::create_pipeline(&fake, &driver_spec("demo")).await.unwrap();

    let drivers = fake.jobs_in(SCOPE);
    assert_eq!(drivers.len(), 1);
    let labels = drivers[0].metadata.labels.clone().unwrap();
    assert_eq!(labels["app"], "automl");
    assert_eq!(labels["pipeline"], "demo");
    assert_eq!(labels["kind"], "runner");
    assert_eq!(
        drivers[0].metadata.annotations.clone().unwrap()["url"],
        "https://github.com/acct/proj"
    );

    let secret = fake.secret_data(SCOPE, "repo-demo").unwrap();
    assert!(secret.contains_key("REPO_URL"));
    assert!(secret.contains_key("CONFIG_URL"));
}

#[tokio::test]
async fn create_when_driver_already_exists_is_rejected() {
    let fake = FakePlatform::new();
    lifecycle::create_pipeline(&fake, &driver_spec("demo")).await.unwrap();

    let err = lifecycle::create_pipeline(&fake, &driver_spec("demo"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Stop(_)));
    assert!(err.to_string().contains("already exists in automl"));
    assert_eq!(fake.jobs_in(SCOPE).len(), 1);
}

#[tokio::test]
async fn cron_and_one_shot_share_the_name_space() {
    let fake = FakePlatform::new();
    lifecycle::create_scheduled_pipeline(&fake, &driver_spec("demo"), "*/5 * * * *")
        .await
        .unwrap();

    let err = lifecycle::create_pipeline(&fake, &driver_spec("demo"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Stop(_)));
}

#[tokio::test]
async fn schedule_is_preserved_when_update_omits_it() {
    let fake = FakePlatform::new();
    lifecycle::create_scheduled_pipeline(&fake, &driver_spec("demo"), "*/5 * * * *")
        .await
        .unwrap();

    lifecycle::update_scheduled_pipeline(&fake, &driver_spec("demo"), None)
        .await
        .unwrap();

    let crons = fake.cron_jobs_in(SCOPE);
    assert_eq!(crons.len(), 1);
    assert_eq!(crons[0].spec.clone().unwrap().schedule, "*/5 * * * *");
}

#[tokio::test(start_paused = true)]
async fn create_then_delete_returns_the_scope_to_prior_state() {
    let fake = FakePlatform::new();
    lifecycle::create_pipeline(&fake, &driver_spec("demo")).await.unwrap();

    // Run a revision so step resources exist too.
    let config = automl_core::parse_config(
        br#"
stages:
  serve:
    - step_name: api
      path_to_executable: api.py
      dependency_path: requirements.txt
      timeout: 10
      service:
        port: 5000
        ingress: true
"#,
    )
    .unwrap();
    automl_engine::run(&fake, &run_context("demo"), &config.stages)
        .await
        .unwrap();
    assert!(!fake.deployments_in(SCOPE).is_empty());

    lifecycle::delete_resources(&fake, "demo", SCOPE, false).await.unwrap();

    assert!(fake.jobs_in(SCOPE).is_empty());
    assert!(fake.deployments_in(SCOPE).is_empty());
    assert!(fake.services_in(SCOPE).is_empty());
    assert!(fake.ingresses_in(SCOPE).is_empty());
    assert!(fake.secrets_in(SCOPE).is_empty());
}
