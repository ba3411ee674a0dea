// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver lifecycle.
//!
//! The driver is the outer execution layer: a batch job (one-shot
//! pipelines) or a cron job wrapping the same template (scheduled ones)
//! that runs `automl run` inside the cluster. At most one driver of either
//! kind may exist per `(pipeline, scope)`; drivers use `generateName` and
//! therefore update by delete-then-create, never replace in place.

use crate::{access, secrets};
use automl_core::labels::{runner_labels, Selector};
use automl_core::name::repo_secret_name;
use automl_core::{defaults, Error};
use automl_platform::PlatformClient;
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, Job, JobSpec, JobTemplateSpec};
use k8s_openapi::api::core::v1::{EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Everything the lifecycle needs to materialize a driver.
#[derive(Debug, Clone)]
pub struct DriverSpec {
    pub pipeline: String,
    pub scope: String,
    /// Original repository URL, kept as the driver's `url` annotation.
    pub url: String,
    /// Clone URL with any token embedded, stored in the repo secret.
    pub repo_url: String,
    /// Raw configuration URL with any token embedded, stored in the repo secret.
    pub config_url: String,
    pub project_dir: String,
    pub branch: String,
}

/// True when a one-shot driver exists for the pipeline.
pub async fn runner_exists(
    platform: &dyn PlatformClient,
    pipeline: &str,
    scope: &str,
) -> Result<bool, Error> {
    let selector = Selector::pipeline(pipeline).runner().to_string();
    Ok(!platform.list_jobs(scope, &selector).await?.is_empty())
}

/// True when a cron driver exists for the pipeline.
pub async fn cron_runner_exists(
    platform: &dyn PlatformClient,
    pipeline: &str,
    scope: &str,
) -> Result<bool, Error> {
    let selector = Selector::pipeline(pipeline).runner().to_string();
    Ok(!platform.list_cron_jobs(scope, &selector).await?.is_empty())
}

async fn build_runner_job(
    platform: &dyn PlatformClient,
    spec: &DriverSpec,
) -> Result<Job, Error> {
    let env_from = secrets::env_from(
        platform,
        &[repo_secret_name(&spec.pipeline)],
        &spec.scope,
    )
    .await?;

    // Propagate an image-tag override into the driver so the inner runner
    // resolves the same client image.
    let env = std::env::var("DOCKER_TEST_TAG").ok().map(|tag| {
        vec![EnvVar {
            name: "DOCKER_TEST_TAG".to_string(),
            value: Some(tag),
            ..EnvVar::default()
        }]
    });

    let container = k8s_openapi::api::core::v1::Container {
        name: defaults::CONTAINER_NAME.to_string(),
        image: Some(defaults::runner_image()),
        image_pull_policy: Some("Always".to_string()),
        env,
        env_from: Some(env_from),
        command: Some(vec!["automl".to_string(), "run".to_string()]),
        args: Some(vec![
            "--workflow".to_string(),
            spec.pipeline.clone(),
            "--branch".to_string(),
            spec.branch.clone(),
            "--project-dir".to_string(),
            spec.project_dir.clone(),
            "--namespace".to_string(),
            spec.scope.clone(),
        ]),
        ..k8s_openapi::api::core::v1::Container::default()
    };

    Ok(Job {
        metadata: ObjectMeta {
            namespace: Some(spec.scope.clone()),
            generate_name: Some(format!("{}-", spec.pipeline)),
            labels: Some(runner_labels(&spec.pipeline)),
            annotations: Some(BTreeMap::from([("url".to_string(), spec.url.clone())])),
            ..ObjectMeta::default()
        },
        spec: Some(JobSpec {
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    namespace: Some(spec.scope.clone()),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    service_account_name: Some(defaults::SERVICE_ACCOUNT.to_string()),
                    restart_policy: Some("Never".to_string()),
                    ..PodSpec::default()
                }),
            },
            backoff_limit: Some(defaults::RUNNER_BACKOFF_LIMIT),
            ttl_seconds_after_finished: Some(defaults::RUNNER_TTL_AFTER_FINISHED),
            ..JobSpec::default()
        }),
        ..Job::default()
    })
}

async fn build_cron_runner(
    platform: &dyn PlatformClient,
    spec: &DriverSpec,
    schedule: &str,
) -> Result<CronJob, Error> {
    let runner = build_runner_job(platform, spec).await?;
    Ok(CronJob {
        metadata: runner.metadata.clone(),
        spec: Some(CronJobSpec {
            schedule: schedule.to_string(),
            job_template: JobTemplateSpec {
                metadata: Some(runner.metadata),
                spec: runner.spec,
            },
            successful_jobs_history_limit: Some(defaults::RUNNER_SUCCESS_JOBS_LIMIT),
            failed_jobs_history_limit: Some(defaults::RUNNER_FAILED_JOBS_LIMIT),
            ..CronJobSpec::default()
        }),
        ..CronJob::default()
    })
}

async fn reject_duplicate(
    platform: &dyn PlatformClient,
    pipeline: &str,
    scope: &str,
) -> Result<(), Error> {
    if runner_exists(platform, pipeline, scope).await?
        || cron_runner_exists(platform, pipeline, scope).await?
    {
        return Err(Error::Stop(format!(
            "the specified pipeline={pipeline} already exists in {scope} namespace"
        )));
    }
    Ok(())
}

/// Create a one-shot pipeline: bootstrap access, write the repo secret,
/// submit the driver.
pub async fn create_pipeline(
    platform: &dyn PlatformClient,
    spec: &DriverSpec,
) -> Result<(), Error> {
    reject_duplicate(platform, &spec.pipeline, &spec.scope).await?;
    access::ensure(platform, &spec.scope).await?;
    secrets::configure_repo_secret(
        platform,
        &spec.pipeline,
        &spec.scope,
        &spec.repo_url,
        &spec.config_url,
    )
    .await?;

    tracing::info!(pipeline = %spec.pipeline, scope = %spec.scope, "creating pipeline");
    let runner = build_runner_job(platform, spec).await?;
    platform.create_job(runner, &spec.scope).await
}

/// Replace the driver of an existing one-shot pipeline.
pub async fn update_pipeline(
    platform: &dyn PlatformClient,
    spec: &DriverSpec,
) -> Result<(), Error> {
    if !runner_exists(platform, &spec.pipeline, &spec.scope).await? {
        return Err(Error::Stop(format!(
            "no specified pipeline exists in {} namespace",
            spec.scope
        )));
    }
    access::ensure(platform, &spec.scope).await?;
    secrets::configure_repo_secret(
        platform,
        &spec.pipeline,
        &spec.scope,
        &spec.repo_url,
        &spec.config_url,
    )
    .await?;

    tracing::info!(pipeline = %spec.pipeline, scope = %spec.scope, "updating pipeline driver");
    let runner = build_runner_job(platform, spec).await?;
    delete_runner(platform, Some(&spec.pipeline), &spec.scope).await?;
    platform.create_job(runner, &spec.scope).await
}

/// Create a scheduled pipeline.
pub async fn create_scheduled_pipeline(
    platform: &dyn PlatformClient,
    spec: &DriverSpec,
    schedule: &str,
) -> Result<(), Error> {
    reject_duplicate(platform, &spec.pipeline, &spec.scope).await?;
    access::ensure(platform, &spec.scope).await?;
    secrets::configure_repo_secret(
        platform,
        &spec.pipeline,
        &spec.scope,
        &spec.repo_url,
        &spec.config_url,
    )
    .await?;

    tracing::info!(
        pipeline = %spec.pipeline,
        scope = %spec.scope,
        schedule,
        "creating scheduled pipeline"
    );
    let runner = build_cron_runner(platform, spec, schedule).await?;
    platform.create_cron_job(runner, &spec.scope).await
}

/// Replace the driver of an existing scheduled pipeline.
///
/// When the caller omits a schedule the existing one is read back and
/// preserved.
pub async fn update_scheduled_pipeline(
    platform: &dyn PlatformClient,
    spec: &DriverSpec,
    schedule: Option<&str>,
) -> Result<(), Error> {
    if !cron_runner_exists(platform, &spec.pipeline, &spec.scope).await? {
        return Err(Error::Stop(format!(
            "no specified scheduled pipeline exists in {} namespace",
            spec.scope
        )));
    }
    access::ensure(platform, &spec.scope).await?;
    secrets::configure_repo_secret(
        platform,
        &spec.pipeline,
        &spec.scope,
        &spec.repo_url,
        &spec.config_url,
    )
    .await?;

    let schedule = match schedule {
        Some(schedule) => schedule.to_string(),
        None => {
            let selector = Selector::pipeline(&spec.pipeline).runner().to_string();
            platform
                .list_cron_jobs(&spec.scope, &selector)
                .await?
                .into_iter()
                .next()
                .and_then(|cron| cron.spec)
                .map(|cron_spec| cron_spec.schedule)
                .ok_or_else(|| {
                    Error::Unexpected(format!(
                        "cannot read the current schedule of pipeline={}",
                        spec.pipeline
                    ))
                })?
        }
    };

    tracing::info!(
        pipeline = %spec.pipeline,
        scope = %spec.scope,
        schedule = %schedule,
        "updating scheduled pipeline driver"
    );
    let runner = build_cron_runner(platform, spec, &schedule).await?;
    delete_cron_runner(platform, Some(&spec.pipeline), &spec.scope).await?;
    platform.create_cron_job(runner, &spec.scope).await
}

/// Delete one pipeline's one-shot driver(s), or every one-shot driver in
/// the scope when no pipeline is given.
pub async fn delete_runner(
    platform: &dyn PlatformClient,
    pipeline: Option<&str>,
    scope: &str,
) -> Result<(), Error> {
    let selector = match pipeline {
        Some(pipeline) => Selector::pipeline(pipeline).runner().to_string(),
        None => Selector::all().runner().to_string(),
    };
    for job in platform.list_jobs(scope, &selector).await? {
        if let Some(name) = job.metadata.name {
            platform.delete_job(&name, scope).await?;
        }
    }
    Ok(())
}

/// Delete one pipeline's cron driver(s), or every cron driver in the scope.
pub async fn delete_cron_runner(
    platform: &dyn PlatformClient,
    pipeline: Option<&str>,
    scope: &str,
) -> Result<(), Error> {
    let selector = match pipeline {
        Some(pipeline) => Selector::pipeline(pipeline).runner().to_string(),
        None => Selector::all().runner().to_string(),
    };
    for cron in platform.list_cron_jobs(scope, &selector).await? {
        if let Some(name) = cron.metadata.name {
            platform.delete_cron_job(&name, scope).await?;
        }
    }
    Ok(())
}

/// Tear a pipeline down: driver, step jobs, deployments, services,
/// ingresses and secrets, all discovered by label selector.
pub async fn delete_resources(
    platform: &dyn PlatformClient,
    pipeline: &str,
    scope: &str,
    scheduled: bool,
) -> Result<(), Error> {
    if scheduled {
        delete_cron_runner(platform, Some(pipeline), scope).await?;
    } else {
        delete_runner(platform, Some(pipeline), scope).await?;
    }

    let selector = Selector::pipeline(pipeline).to_string();
    for job in platform.list_jobs(scope, &selector).await? {
        if let Some(name) = job.metadata.name {
            platform.delete_job(&name, scope).await?;
        }
    }
    for deployment in platform.list_deployments(scope, &selector).await? {
        if let Some(name) = deployment.metadata.name {
            platform.delete_deployment(&name, scope).await?;
        }
    }
    for service in platform.list_services(scope, &selector).await? {
        if let Some(name) = service.metadata.name {
            platform.delete_service(&name, scope).await?;
        }
    }
    for ingress in platform.list_ingresses(scope, &selector).await? {
        if let Some(name) = ingress.metadata.name {
            platform.delete_ingress(&name, scope).await?;
        }
    }
    secrets::delete_all(platform, pipeline, scope).await?;

    tracing::info!(pipeline, scope, scheduled, "pipeline deleted");
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
