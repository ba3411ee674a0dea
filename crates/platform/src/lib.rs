// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! automl-platform: the one seam to the container platform.
//!
//! [`PlatformClient`] names every platform operation the rest of automl is
//! allowed to perform. [`KubePlatform`] backs it with the live Kubernetes
//! API; [`FakePlatform`] (feature `test-support`) is an in-memory store with
//! the same label-selector semantics for tests.

mod kubernetes;

pub use kubernetes::KubePlatform;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePlatform;

use async_trait::async_trait;
use automl_core::Error;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Pod, Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};

/// Observed state of a batch step job. Transitions are driven entirely by
/// the platform; automl only observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Active,
    Succeeded,
    Failed,
}

/// Observed rollout state of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolloutStatus {
    pub replicas: Option<i32>,
    pub available_replicas: Option<i32>,
}

impl RolloutStatus {
    /// Available means both counters are reported and equal; anything else
    /// is still rolling out.
    pub fn is_available(&self) -> bool {
        matches!(
            (self.replicas, self.available_replicas),
            (Some(want), Some(have)) if want == have
        )
    }
}

/// Typed wrapper over the container platform's object API.
///
/// This trait is the only place automl touches the platform; every other
/// component goes through it. All deletes use background propagation and
/// all list operations accept an equality label selector.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    // Namespaces
    async fn namespace_exists(&self, scope: &str) -> Result<bool, Error>;
    async fn create_namespace(&self, scope: &str) -> Result<(), Error>;

    // Service accounts
    async fn service_account_exists(&self, name: &str, scope: &str) -> Result<bool, Error>;
    async fn create_service_account(
        &self,
        account: ServiceAccount,
        scope: &str,
    ) -> Result<(), Error>;

    // Cluster roles and bindings
    async fn cluster_role_exists(&self, name: &str) -> Result<bool, Error>;
    async fn create_cluster_role(&self, role: ClusterRole) -> Result<(), Error>;
    async fn cluster_role_binding_exists(&self, name: &str) -> Result<bool, Error>;
    async fn create_cluster_role_binding(&self, binding: ClusterRoleBinding)
        -> Result<(), Error>;

    // Secrets
    async fn list_secrets(&self, scope: &str, selector: &str) -> Result<Vec<Secret>, Error>;
    async fn get_secret(&self, name: &str, scope: &str) -> Result<Option<Secret>, Error>;
    async fn create_secret(&self, secret: Secret, scope: &str) -> Result<(), Error>;
    async fn patch_secret(&self, name: &str, secret: Secret, scope: &str) -> Result<(), Error>;
    async fn delete_secret(&self, name: &str, scope: &str) -> Result<(), Error>;

    // Batch jobs
    async fn list_jobs(&self, scope: &str, selector: &str) -> Result<Vec<Job>, Error>;
    async fn create_job(&self, job: Job, scope: &str) -> Result<(), Error>;
    async fn delete_job(&self, name: &str, scope: &str) -> Result<(), Error>;
    async fn read_job_state(&self, name: &str, scope: &str) -> Result<JobState, Error>;

    // Cron jobs
    async fn list_cron_jobs(&self, scope: &str, selector: &str) -> Result<Vec<CronJob>, Error>;
    async fn create_cron_job(&self, job: CronJob, scope: &str) -> Result<(), Error>;
    async fn delete_cron_job(&self, name: &str, scope: &str) -> Result<(), Error>;

    // Deployments
    async fn list_deployments(&self, scope: &str, selector: &str)
        -> Result<Vec<Deployment>, Error>;
    async fn get_deployment(&self, name: &str, scope: &str) -> Result<Option<Deployment>, Error>;
    async fn create_deployment(&self, deployment: Deployment, scope: &str) -> Result<(), Error>;
    async fn replace_deployment(
        &self,
        name: &str,
        deployment: Deployment,
        scope: &str,
    ) -> Result<(), Error>;
    async fn delete_deployment(&self, name: &str, scope: &str) -> Result<(), Error>;
    async fn read_rollout_status(&self, name: &str, scope: &str) -> Result<RolloutStatus, Error>;

    // Services
    async fn list_services(&self, scope: &str, selector: &str) -> Result<Vec<Service>, Error>;
    async fn get_service(&self, name: &str, scope: &str) -> Result<Option<Service>, Error>;
    async fn create_service(&self, service: Service, scope: &str) -> Result<(), Error>;
    async fn delete_service(&self, name: &str, scope: &str) -> Result<(), Error>;

    // Ingresses
    async fn list_ingresses(&self, scope: &str, selector: &str) -> Result<Vec<Ingress>, Error>;
    async fn get_ingress(&self, name: &str, scope: &str) -> Result<Option<Ingress>, Error>;
    async fn create_ingress(&self, ingress: Ingress, scope: &str) -> Result<(), Error>;
    async fn delete_ingress(&self, name: &str, scope: &str) -> Result<(), Error>;

    // Pods
    async fn list_pods(&self, scope: &str, selector: &str) -> Result<Vec<Pod>, Error>;
    async fn read_pod_log(&self, name: &str, scope: &str) -> Result<String, Error>;
}
