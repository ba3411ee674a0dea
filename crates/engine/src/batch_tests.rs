// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automl_core::config::ImageRef;
use automl_platform::FakePlatform;

fn ctx() -> PipelineContext {
    PipelineContext {
        pipeline: "demo".to_string(),
        scope: "automl".to_string(),
        branch: "master".to_string(),
        project_dir: "proj".to_string(),
    }
}

fn step(name: &str, timeout: u64) -> StepCommon {
    StepCommon {
        name: name.to_string(),
        executable: format!("{name}.py"),
        dependency: "requirements.txt".to_string(),
        image: ImageRef::parse(&automl_core::defaults::client_image()).unwrap(),
        command: None,
        envs: Default::default(),
        secrets: vec![],
        cpu_request: 0.5,
        memory_request_mib: 500,
        backoff_limit: 0,
        timeout: Duration::from_secs(timeout),
        polling_interval: Duration::from_secs(1),
        warm_up: Duration::from_secs(5),
    }
}

async fn fake() -> FakePlatform {
    let fake = FakePlatform::new();
    crate::secrets::configure_repo_secret(&fake, "demo", "automl", "https://u", "https://c")
        .await
        .unwrap();
    fake
}

#[tokio::test(start_paused = true)]
async fn submits_one_job_per_step_in_order() {
    let fake = fake().await;
    let (a, b) = (step("alpha", 30), step("beta", 30));
    execute_batch_steps(&fake, &ctx(), "train", &[&a, &b]).await.unwrap();

    let jobs = fake.jobs_in("automl");
    assert_eq!(jobs.len(), 2);
    let names: Vec<String> = jobs.iter().filter_map(|j| j.metadata.name.clone()).collect();
    assert!(names[0].starts_with("demo-train-alpha-"));
    assert!(names[1].starts_with("demo-train-beta-"));
}

#[tokio::test(start_paused = true)]
async fn clears_previous_stage_jobs_first() {
    let fake = fake().await;
    let stale = step("old", 30);
    execute_batch_steps(&fake, &ctx(), "train", &[&stale]).await.unwrap();
    assert_eq!(fake.jobs_in("automl").len(), 1);

    let fresh = step("new", 30);
    execute_batch_steps(&fake, &ctx(), "train", &[&fresh]).await.unwrap();

    let names: Vec<String> = fake
        .jobs_in("automl")
        .into_iter()
        .filter_map(|j| j.metadata.name)
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("demo-train-new-"));
}

#[tokio::test(start_paused = true)]
async fn jobs_of_other_stages_survive_the_clean_slate() {
    let fake = fake().await;
    let other = step("keep", 30);
    execute_batch_steps(&fake, &ctx(), "prep", &[&other]).await.unwrap();

    let fresh = step("new", 30);
    execute_batch_steps(&fake, &ctx(), "train", &[&fresh]).await.unwrap();
    assert_eq!(fake.jobs_in("automl").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn missing_secret_submits_nothing() {
    let fake = fake().await;
    let mut bad = step("alpha", 30);
    bad.secrets = vec!["ghost".to_string()];
    let good = step("beta", 30);

    let err = execute_batch_steps(&fake, &ctx(), "train", &[&good, &bad])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Stop(_)));
    assert!(fake.jobs_in("automl").is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_step_stops_with_its_logs() {
    let fake = fake().await;
    fake.script_job_states("demo-train-bad-", vec![JobState::Active, JobState::Failed]);
    fake.script_job_log("demo-train-bad-", "Traceback: boom");

    let (good, bad) = (step("good", 30), step("bad", 30));
    let err = execute_batch_steps(&fake, &ctx(), "train", &[&good, &bad])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Stop(_)));
    let message = err.to_string();
    assert!(message.contains("stage=train"));
    assert!(message.contains("Traceback: boom"));
    assert!(message.contains("Job=demo-train-bad-"));
    assert!(!message.contains("Job=demo-train-good-"));
}

#[tokio::test(start_paused = true)]
async fn deadline_expiry_reports_unfinished_steps() {
    let fake = fake().await;
    fake.script_job_states("demo-train-slow-", vec![JobState::Active]);
    fake.script_job_log("demo-train-slow-", "still installing");

    let slow = step("slow", 2);
    let err = execute_batch_steps(&fake, &ctx(), "train", &[&slow]).await.unwrap_err();

    assert!(matches!(err, Error::Timeout(_)));
    let message = err.to_string();
    assert!(message.contains("failed to complete in 2 seconds"));
    assert!(message.contains("still installing"));
}

#[test]
fn wait_params_aggregate_across_steps() {
    let (a, mut b) = (step("a", 10), step("b", 40));
    b.polling_interval = Duration::from_secs(3);
    b.warm_up = Duration::from_secs(9);
    let params = stage_wait_params([&a, &b].into_iter());
    assert_eq!(params.timeout, Duration::from_secs(40));
    assert_eq!(params.poll_interval, Duration::from_secs(1));
    assert_eq!(params.warm_up, Duration::from_secs(9));
}
