// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch step executor.
//!
//! Launches every batch step of a stage in parallel on the platform and
//! supervises them under one stage-wide deadline. A stage re-run starts
//! from a clean slate: pre-existing jobs of the `(pipeline, stage)` pair
//! are deleted first.

use crate::wait::{self, Observed, WaitParams, WaitTarget};
use crate::{logs, objects, PipelineContext};
use async_trait::async_trait;
use automl_core::config::StepCommon;
use automl_core::labels::Selector;
use automl_core::Error;
use automl_platform::{JobState, PlatformClient};
use std::time::Duration;

pub(crate) fn stage_wait_params<'a>(
    steps: impl Iterator<Item = &'a StepCommon>,
) -> WaitParams {
    let mut timeout = Duration::ZERO;
    let mut poll_interval: Option<Duration> = None;
    let mut warm_up = Duration::ZERO;
    for step in steps {
        timeout = timeout.max(step.timeout);
        poll_interval = Some(poll_interval.map_or(step.polling_interval, |p| {
            p.min(step.polling_interval)
        }));
        warm_up = warm_up.max(step.warm_up);
    }
    WaitParams {
        timeout,
        poll_interval: poll_interval.unwrap_or(Duration::from_secs(1)),
        warm_up,
    }
}

struct JobTarget<'a> {
    platform: &'a dyn PlatformClient,
    name: String,
    scope: String,
}

#[async_trait]
impl WaitTarget for JobTarget<'_> {
    fn describe(&self) -> String {
        format!("Job={}", self.name)
    }

    async fn probe(&self) -> Result<Observed, Error> {
        Ok(
            match self.platform.read_job_state(&self.name, &self.scope).await? {
                JobState::Active => Observed::Pending,
                JobState::Succeeded => Observed::Reached,
                JobState::Failed => Observed::Halted,
            },
        )
    }

    async fn logs(&self) -> Option<String> {
        logs::job_logs(self.platform, &self.name, &self.scope).await
    }
}

/// Execute the batch steps of one stage.
///
/// All step objects are built before any is submitted, so credential
/// resolution failures leave the stage untouched. Submission preserves
/// config order; completion order is up to the platform.
pub async fn execute_batch_steps(
    platform: &dyn PlatformClient,
    ctx: &PipelineContext,
    stage: &str,
    steps: &[&StepCommon],
) -> Result<(), Error> {
    let stage_selector = Selector::pipeline(&ctx.pipeline).stage(stage).to_string();
    for job in platform.list_jobs(&ctx.scope, &stage_selector).await? {
        if let Some(name) = job.metadata.name {
            platform.delete_job(&name, &ctx.scope).await?;
        }
    }

    let mut jobs = Vec::with_capacity(steps.len());
    for step in steps {
        jobs.push(objects::build_step_job(platform, ctx, stage, step).await?);
    }

    let mut targets: Vec<Box<dyn WaitTarget + '_>> = Vec::with_capacity(jobs.len());
    for job in &jobs {
        let name = job.metadata.name.clone().unwrap_or_default();
        let step = job
            .metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get("step").cloned())
            .unwrap_or_default();
        platform.create_job(job.clone(), &ctx.scope).await?;
        tracing::info!(job = %name, step = %step, stage, "job created");
        targets.push(Box::new(JobTarget {
            platform,
            name,
            scope: ctx.scope.clone(),
        }));
    }

    let params = stage_wait_params(steps.iter().copied());
    let observed = match wait::wait_for_all(&targets, params).await {
        Ok(observed) => observed,
        Err(Error::Timeout(report)) => {
            return Err(Error::Timeout(format!(
                "jobs during stage={stage} in {} pipeline failed to complete in {} seconds.{report}",
                ctx.pipeline,
                params.timeout.as_secs()
            )));
        }
        Err(other) => return Err(other),
    };

    let failed: Vec<&dyn WaitTarget> = targets
        .iter()
        .zip(&observed)
        .filter(|(_, state)| **state == Observed::Halted)
        .map(|(target, _)| target.as_ref())
        .collect();
    if !failed.is_empty() {
        let report = wait::failure_report(&failed).await;
        return Err(Error::Stop(format!(
            "jobs during stage={stage} in {} pipeline failed to complete.{report}",
            ctx.pipeline
        )));
    }

    tracing::info!(stage, pipeline = %ctx.pipeline, "stage jobs completed");
    Ok(())
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
