// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service step executor.
//!
//! Diffs the previous revision's deployments against the current configs,
//! applies create/replace, supervises the rollout, and on success exposes
//! services/ingresses and collects steps that disappeared from the
//! configuration. A rollout that misses its deadline is rolled back to the
//! previous deployment bodies before the timeout propagates.

use crate::batch::stage_wait_params;
use crate::wait::{self, Observed, WaitTarget};
use crate::{logs, objects, PipelineContext};
use async_trait::async_trait;
use automl_core::config::{ServiceStep, StepCommon};
use automl_core::labels::Selector;
use automl_core::name::resource_name;
use automl_core::Error;
use automl_platform::PlatformClient;
use k8s_openapi::api::apps::v1::Deployment;
use std::collections::HashMap;

struct DeploymentTarget<'a> {
    platform: &'a dyn PlatformClient,
    name: String,
    pipeline: String,
    stage: String,
    step: String,
    scope: String,
}

#[async_trait]
impl WaitTarget for DeploymentTarget<'_> {
    fn describe(&self) -> String {
        format!("Deployment={}", self.name)
    }

    async fn probe(&self) -> Result<Observed, Error> {
        let status = self
            .platform
            .read_rollout_status(&self.name, &self.scope)
            .await?;
        Ok(if status.is_available() {
            Observed::Reached
        } else {
            Observed::Pending
        })
    }

    async fn logs(&self) -> Option<String> {
        logs::step_logs(
            self.platform,
            &self.pipeline,
            &self.stage,
            &self.step,
            &self.scope,
        )
        .await
    }
}

fn deployment_name(deployment: &Deployment) -> String {
    deployment.metadata.name.clone().unwrap_or_default()
}

/// Execute the service steps of one stage.
pub async fn execute_service_steps(
    platform: &dyn PlatformClient,
    ctx: &PipelineContext,
    stage: &str,
    steps: &[(&StepCommon, &ServiceStep)],
) -> Result<(), Error> {
    let stage_selector = Selector::pipeline(&ctx.pipeline).stage(stage).to_string();
    let previous = platform.list_deployments(&ctx.scope, &stage_selector).await?;

    let mut current = Vec::with_capacity(steps.len());
    for (common, service) in steps {
        current.push(objects::build_step_deployment(platform, ctx, stage, common, service).await?);
    }

    for deployment in &current {
        let name = deployment_name(deployment);
        if platform.get_deployment(&name, &ctx.scope).await?.is_some() {
            platform
                .replace_deployment(&name, deployment.clone(), &ctx.scope)
                .await?;
            tracing::info!(deployment = %name, stage, "deployment updated");
        } else {
            platform
                .create_deployment(deployment.clone(), &ctx.scope)
                .await?;
            tracing::info!(deployment = %name, stage, "deployment created");
        }
    }

    let targets: Vec<Box<dyn WaitTarget + '_>> = steps
        .iter()
        .map(|(common, _)| {
            Box::new(DeploymentTarget {
                platform,
                name: resource_name(&ctx.pipeline, stage, &common.name),
                pipeline: ctx.pipeline.clone(),
                stage: stage.to_string(),
                step: common.name.clone(),
                scope: ctx.scope.clone(),
            }) as Box<dyn WaitTarget + '_>
        })
        .collect();

    let params = stage_wait_params(steps.iter().map(|(common, _)| *common));
    if let Err(err) = wait::wait_for_all(&targets, params).await {
        return match err {
            Error::Timeout(report) => {
                rollback(platform, &ctx.scope, &previous, &current).await?;
                Err(Error::Timeout(format!(
                    "cannot rollout deployments at stage={stage} of {} pipeline in {} seconds.{report}",
                    ctx.pipeline,
                    params.timeout.as_secs()
                )))
            }
            other => Err(other),
        };
    }

    // Services and ingresses have stable names and are only ever created;
    // an ingress is created together with its service, never retrofitted.
    for (common, service) in steps {
        let name = resource_name(&ctx.pipeline, stage, &common.name);
        if platform.get_service(&name, &ctx.scope).await?.is_none() {
            platform
                .create_service(
                    objects::build_service(ctx, stage, &common.name, &service.service),
                    &ctx.scope,
                )
                .await?;
            tracing::info!(service = %name, stage, "service created");

            if service.service.ingress {
                platform
                    .create_ingress(
                        objects::build_ingress(ctx, stage, &common.name, &service.service),
                        &ctx.scope,
                    )
                    .await?;
                tracing::info!(ingress = %name, stage, "ingress created");
            }
        }
    }

    tracing::info!(stage, pipeline = %ctx.pipeline, "stage deployments rolled out");
    collect_stale_resources(platform, &ctx.scope, &previous, &current).await?;
    Ok(())
}

/// Restore the previous deployment bodies after a failed rollout.
///
/// Steps that existed before get their exact previous body back, with
/// server-assigned metadata cleared for resubmission; steps that are new in
/// this revision are deleted. Services and ingresses cannot have been
/// created yet when a rollback runs.
async fn rollback(
    platform: &dyn PlatformClient,
    scope: &str,
    previous: &[Deployment],
    current: &[Deployment],
) -> Result<(), Error> {
    let current_names: Vec<String> = current.iter().map(deployment_name).collect();
    let restorable: HashMap<String, &Deployment> = previous
        .iter()
        .filter(|deployment| current_names.contains(&deployment_name(deployment)))
        .map(|deployment| (deployment_name(deployment), deployment))
        .collect();

    for deployment in current {
        let name = deployment_name(deployment);
        if let Some(previous_body) = restorable.get(&name) {
            let mut body = (*previous_body).clone();
            body.metadata.managed_fields = None;
            body.metadata.uid = None;
            body.metadata.resource_version = None;
            body.metadata.creation_timestamp = None;
            platform.replace_deployment(&name, body, scope).await?;
            tracing::warn!(deployment = %name, "deployment rolled back");
        } else {
            platform.delete_deployment(&name, scope).await?;
            tracing::warn!(deployment = %name, "new deployment removed on rollback");
        }
    }
    Ok(())
}

/// Delete deployments (and their co-named service/ingress) that the current
/// revision no longer declares.
async fn collect_stale_resources(
    platform: &dyn PlatformClient,
    scope: &str,
    previous: &[Deployment],
    current: &[Deployment],
) -> Result<(), Error> {
    let current_names: Vec<String> = current.iter().map(deployment_name).collect();

    for deployment in previous {
        let name = deployment_name(deployment);
        if current_names.contains(&name) {
            continue;
        }
        platform.delete_deployment(&name, scope).await?;
        if platform.get_service(&name, scope).await?.is_some() {
            platform.delete_service(&name, scope).await?;
        }
        if platform.get_ingress(&name, scope).await?.is_some() {
            platform.delete_ingress(&name, scope).await?;
        }
        tracing::info!(step_resources = %name, "stale step resources deleted");
    }
    Ok(())
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
