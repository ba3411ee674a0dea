// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automl_platform::FakePlatform;

fn spec() -> DriverSpec {
    DriverSpec {
        pipeline: "demo".to_string(),
        scope: "automl".to_string(),
        url: "https://github.com/acct/proj".to_string(),
        repo_url: "https://github.com/acct/proj".to_string(),
        config_url: "https://raw.githubusercontent.com/acct/proj/master/config.yaml".to_string(),
        project_dir: "proj".to_string(),
        branch: "master".to_string(),
    }
}

#[tokio::test]
async fn create_pipeline_materializes_driver_and_secret() {
    let fake = FakePlatform::new();
    create_pipeline(&fake, &spec()).await.unwrap();

    let jobs = fake.jobs_in("automl");
    assert_eq!(jobs.len(), 1);
    let driver = &jobs[0];

    let labels = driver.metadata.labels.clone().unwrap();
    assert_eq!(labels["app"], "automl");
    assert_eq!(labels["pipeline"], "demo");
    assert_eq!(labels["kind"], "runner");

    let annotations = driver.metadata.annotations.clone().unwrap();
    assert_eq!(annotations["url"], "https://github.com/acct/proj");

    let data = fake.secret_data("automl", "repo-demo").unwrap();
    assert!(data.contains_key("REPO_URL"));
    assert!(data.contains_key("CONFIG_URL"));

    // Access bootstrap ran.
    assert_eq!(fake.namespaces(), vec!["automl".to_string()]);
}

#[tokio::test]
async fn driver_command_line_names_the_pipeline() {
    let fake = FakePlatform::new();
    create_pipeline(&fake, &spec()).await.unwrap();

    let driver = &fake.jobs_in("automl")[0];
    let pod = driver.spec.clone().unwrap().template.spec.unwrap();
    assert_eq!(
        pod.service_account_name.as_deref(),
        Some(automl_core::defaults::SERVICE_ACCOUNT)
    );
    assert_eq!(pod.restart_policy.as_deref(), Some("Never"));

    let container = &pod.containers[0];
    assert_eq!(
        container.command,
        Some(vec!["automl".to_string(), "run".to_string()])
    );
    let args = container.args.clone().unwrap();
    assert_eq!(
        args,
        vec![
            "--workflow",
            "demo",
            "--branch",
            "master",
            "--project-dir",
            "proj",
            "--namespace",
            "automl"
        ]
    );
}

#[tokio::test]
async fn duplicate_create_is_rejected() {
    let fake = FakePlatform::new();
    create_pipeline(&fake, &spec()).await.unwrap();
    let err = create_pipeline(&fake, &spec()).await.unwrap_err();
    assert!(matches!(err, Error::Stop(_)));
    assert!(err.to_string().contains("already exists in automl"));
    assert_eq!(fake.jobs_in("automl").len(), 1);
}

#[tokio::test]
async fn one_shot_create_is_rejected_when_cron_exists() {
    let fake = FakePlatform::new();
    create_scheduled_pipeline(&fake, &spec(), "*/5 * * * *").await.unwrap();
    let err = create_pipeline(&fake, &spec()).await.unwrap_err();
    assert!(matches!(err, Error::Stop(_)));
}

#[tokio::test]
async fn update_replaces_the_driver() {
    let fake = FakePlatform::new();
    create_pipeline(&fake, &spec()).await.unwrap();
    let old_name = fake.jobs_in("automl")[0].metadata.name.clone().unwrap();

    let mut updated = spec();
    updated.branch = "dev".to_string();
    update_pipeline(&fake, &updated).await.unwrap();

    let jobs = fake.jobs_in("automl");
    assert_eq!(jobs.len(), 1);
    assert_ne!(jobs[0].metadata.name.clone().unwrap(), old_name);
    let args = jobs[0]
        .spec
        .clone()
        .unwrap()
        .template
        .spec
        .unwrap()
        .containers[0]
        .args
        .clone()
        .unwrap();
    assert!(args.contains(&"dev".to_string()));
}

#[tokio::test]
async fn update_without_existing_driver_stops() {
    let fake = FakePlatform::new();
    let err = update_pipeline(&fake, &spec()).await.unwrap_err();
    assert!(matches!(err, Error::Stop(_)));
}

#[tokio::test]
async fn cron_driver_wraps_the_job_template() {
    let fake = FakePlatform::new();
    create_scheduled_pipeline(&fake, &spec(), "*/5 * * * *").await.unwrap();

    let crons = fake.cron_jobs_in("automl");
    assert_eq!(crons.len(), 1);
    let cron_spec = crons[0].spec.clone().unwrap();
    assert_eq!(cron_spec.schedule, "*/5 * * * *");
    assert_eq!(cron_spec.successful_jobs_history_limit, Some(2));
    assert_eq!(cron_spec.failed_jobs_history_limit, Some(2));
    assert!(cron_spec.job_template.spec.is_some());
}

#[tokio::test]
async fn update_without_schedule_preserves_the_existing_one() {
    let fake = FakePlatform::new();
    create_scheduled_pipeline(&fake, &spec(), "*/5 * * * *").await.unwrap();

    update_scheduled_pipeline(&fake, &spec(), None).await.unwrap();

    let crons = fake.cron_jobs_in("automl");
    assert_eq!(crons.len(), 1);
    assert_eq!(crons[0].spec.clone().unwrap().schedule, "*/5 * * * *");
}

#[tokio::test]
async fn update_with_schedule_overrides() {
    let fake = FakePlatform::new();
    create_scheduled_pipeline(&fake, &spec(), "*/5 * * * *").await.unwrap();
    update_scheduled_pipeline(&fake, &spec(), Some("0 12 * * *")).await.unwrap();
    assert_eq!(
        fake.cron_jobs_in("automl")[0].spec.clone().unwrap().schedule,
        "0 12 * * *"
    );
}

#[tokio::test]
async fn delete_resources_sweeps_the_pipeline() {
    let fake = FakePlatform::new();
    create_pipeline(&fake, &spec()).await.unwrap();

    delete_resources(&fake, "demo", "automl", false).await.unwrap();

    assert!(fake.jobs_in("automl").is_empty());
    assert!(fake.deployments_in("automl").is_empty());
    assert!(fake.services_in("automl").is_empty());
    assert!(fake.ingresses_in("automl").is_empty());
    assert!(fake.secrets_in("automl").is_empty());
}
