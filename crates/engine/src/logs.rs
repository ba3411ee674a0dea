// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort pod log retrieval for failure messages.
//!
//! Log lookups run while composing an error report, so every miss degrades
//! to `None` instead of masking the real failure.

use automl_core::labels::Selector;
use automl_platform::PlatformClient;

fn trim_trailing_newline(log: String) -> String {
    log.strip_suffix('\n').map(str::to_string).unwrap_or(log)
}

/// Logs of the first pod backing a batch job.
pub async fn job_logs(platform: &dyn PlatformClient, job: &str, scope: &str) -> Option<String> {
    let pods = platform
        .list_pods(scope, &format!("job-name={job}"))
        .await
        .ok()?;
    let pod = pods.first()?.metadata.name.clone()?;
    let log = platform.read_pod_log(&pod, scope).await.ok()?;
    Some(trim_trailing_newline(log))
}

/// Logs of the first pod behind a service step deployment.
pub async fn step_logs(
    platform: &dyn PlatformClient,
    pipeline: &str,
    stage: &str,
    step: &str,
    scope: &str,
) -> Option<String> {
    let selector = Selector::pipeline(pipeline).stage(stage).step(step).to_string();
    let pods = platform.list_pods(scope, &selector).await.ok()?;
    let pod = pods.first()?.metadata.name.clone()?;
    let log = platform.read_pod_log(&pod, scope).await.ok()?;
    Some(trim_trailing_newline(log))
}

/// Logs of the driver execution of a pipeline.
pub async fn runner_logs(
    platform: &dyn PlatformClient,
    pipeline: &str,
    scope: &str,
    scheduled: bool,
) -> Option<String> {
    let selector = Selector::pipeline(pipeline).runner().to_string();
    let driver = if scheduled {
        platform
            .list_cron_jobs(scope, &selector)
            .await
            .ok()?
            .first()?
            .metadata
            .name
            .clone()?
    } else {
        platform
            .list_jobs(scope, &selector)
            .await
            .ok()?
            .first()?
            .metadata
            .name
            .clone()?
    };
    job_logs(platform, &driver, scope).await
}
