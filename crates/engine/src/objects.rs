// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders for the platform objects a step materializes into.
//!
//! Credential references are resolved while building, so a missing secret
//! surfaces before anything reaches the cluster.

use crate::{recipe, secrets, PipelineContext};
use automl_core::config::{ServicePortSpec, ServiceStep, StepCommon};
use automl_core::labels::{self, step_labels};
use automl_core::name::{job_name, repo_secret_name, resource_name};
use automl_core::Error;
use automl_platform::PlatformClient;
use chrono::Utc;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Build the job object of a batch step.
pub async fn build_step_job(
    platform: &dyn PlatformClient,
    ctx: &PipelineContext,
    stage: &str,
    common: &StepCommon,
) -> Result<Job, Error> {
    let mut secret_names = common.secrets.clone();
    secret_names.push(repo_secret_name(&ctx.pipeline));
    let env_from = secrets::env_from(platform, &secret_names, &ctx.scope).await?;
    let image_pull = secrets::image_pull_reference(platform, &ctx.scope).await?;

    let container = recipe::step_container(common, ctx, env_from);
    Ok(Job {
        metadata: ObjectMeta {
            namespace: Some(ctx.scope.clone()),
            name: Some(job_name(&ctx.pipeline, stage, &common.name)),
            labels: Some(step_labels(&ctx.pipeline, stage, &common.name)),
            annotations: Some(BTreeMap::from([(
                "executable_module".to_string(),
                common.executable.clone(),
            )])),
            ..ObjectMeta::default()
        },
        spec: Some(JobSpec {
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    containers: vec![container],
                    restart_policy: Some("Never".to_string()),
                    image_pull_secrets: image_pull.map(|reference| vec![reference]),
                    ..PodSpec::default()
                }),
            },
            completions: Some(1),
            backoff_limit: Some(common.backoff_limit),
            ..JobSpec::default()
        }),
        ..Job::default()
    })
}

/// Build the deployment object of a service step.
pub async fn build_step_deployment(
    platform: &dyn PlatformClient,
    ctx: &PipelineContext,
    stage: &str,
    common: &StepCommon,
    service: &ServiceStep,
) -> Result<Deployment, Error> {
    let mut secret_names = common.secrets.clone();
    secret_names.push(repo_secret_name(&ctx.pipeline));
    let env_from = secrets::env_from(platform, &secret_names, &ctx.scope).await?;
    let image_pull = secrets::image_pull_reference(platform, &ctx.scope).await?;

    let pod_labels = step_labels(&ctx.pipeline, stage, &common.name);
    let mut deployment_labels = pod_labels.clone();
    deployment_labels.insert(labels::BRANCH_LABEL.to_string(), ctx.branch.clone());

    let container = recipe::step_container(common, ctx, env_from);
    Ok(Deployment {
        metadata: ObjectMeta {
            namespace: Some(ctx.scope.clone()),
            name: Some(resource_name(&ctx.pipeline, stage, &common.name)),
            labels: Some(deployment_labels),
            annotations: Some(BTreeMap::from([
                ("last-updated".to_string(), Utc::now().to_rfc3339()),
                ("executable_module".to_string(), common.executable.clone()),
            ])),
            ..ObjectMeta::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(service.replicas),
            revision_history_limit: Some(service.revision_history_limit),
            min_ready_seconds: Some(service.min_ready_seconds),
            selector: LabelSelector {
                match_labels: Some(pod_labels.clone()),
                ..LabelSelector::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    namespace: Some(ctx.scope.clone()),
                    labels: Some(pod_labels),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    restart_policy: Some("Always".to_string()),
                    image_pull_secrets: image_pull.map(|reference| vec![reference]),
                    ..PodSpec::default()
                }),
            },
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    })
}

/// Build the NodePort service exposing a service step.
pub fn build_service(
    ctx: &PipelineContext,
    stage: &str,
    step: &str,
    spec: &ServicePortSpec,
) -> Service {
    let selector = step_labels(&ctx.pipeline, stage, step);
    Service {
        metadata: ObjectMeta {
            namespace: Some(ctx.scope.clone()),
            name: Some(resource_name(&ctx.pipeline, stage, step)),
            labels: Some(selector.clone()),
            ..ObjectMeta::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("NodePort".to_string()),
            selector: Some(selector),
            ports: Some(vec![ServicePort {
                port: spec.port,
                target_port: Some(IntOrString::Int(spec.port)),
                ..ServicePort::default()
            }]),
            ..ServiceSpec::default()
        }),
        ..Service::default()
    }
}

/// Build the ingress for a service step that asked for one.
///
/// The path is `/{scope}/{pipeline}-{stage}-{step}`, rewritten by the nginx
/// controller onto the backing service.
pub fn build_ingress(
    ctx: &PipelineContext,
    stage: &str,
    step: &str,
    spec: &ServicePortSpec,
) -> Ingress {
    let service_name = resource_name(&ctx.pipeline, stage, step);
    let path = format!("/{}/{}-{}-{}", ctx.scope, ctx.pipeline, stage, step);

    Ingress {
        metadata: ObjectMeta {
            namespace: Some(ctx.scope.clone()),
            name: Some(service_name.clone()),
            labels: Some(step_labels(&ctx.pipeline, stage, step)),
            annotations: Some(BTreeMap::from([
                (
                    "kubernetes.io/ingress.class".to_string(),
                    "nginx".to_string(),
                ),
                (
                    "nginx.ingress.kubernetes.io/rewrite-target".to_string(),
                    "/$1".to_string(),
                ),
            ])),
            ..ObjectMeta::default()
        },
        spec: Some(IngressSpec {
            rules: Some(vec![IngressRule {
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        path: Some(path),
                        path_type: "Exact".to_string(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: service_name,
                                port: Some(ServiceBackendPort {
                                    number: Some(spec.port),
                                    ..ServiceBackendPort::default()
                                }),
                            }),
                            ..IngressBackend::default()
                        },
                    }],
                }),
                ..IngressRule::default()
            }]),
            ..IngressSpec::default()
        }),
        ..Ingress::default()
    }
}

#[cfg(test)]
#[path = "objects_tests.rs"]
mod tests;
