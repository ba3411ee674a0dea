// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline runner composition.
//!
//! Stages execute strictly in declaration order; inside a stage the batch
//! steps must finish before any service rollout starts. The first error
//! aborts the pipeline and later stages never run.

use crate::{batch, service, PipelineContext};
use automl_core::config::{ServiceStep, Step, StepCommon, StepKind};
use automl_core::Error;
use automl_platform::PlatformClient;
use indexmap::IndexMap;

/// Run every stage of a validated pipeline.
pub async fn run(
    platform: &dyn PlatformClient,
    ctx: &PipelineContext,
    stages: &IndexMap<String, Vec<Step>>,
) -> Result<(), Error> {
    for (stage, steps) in stages {
        tracing::info!(stage = %stage, pipeline = %ctx.pipeline, "stage started");

        let mut batch_steps: Vec<&StepCommon> = Vec::new();
        let mut service_steps: Vec<(&StepCommon, &ServiceStep)> = Vec::new();
        for step in steps {
            match &step.kind {
                StepKind::Batch => batch_steps.push(&step.common),
                StepKind::Service(service) => service_steps.push((&step.common, service)),
            }
        }

        if !batch_steps.is_empty() {
            batch::execute_batch_steps(platform, ctx, stage, &batch_steps).await?;
        }
        if !service_steps.is_empty() {
            service::execute_service_steps(platform, ctx, stage, &service_steps).await?;
        }

        tracing::info!(stage = %stage, pipeline = %ctx.pipeline, "stage succeeded");
    }
    Ok(())
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
