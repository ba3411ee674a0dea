// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`PlatformClient`] for tests.
//!
//! Stores objects per namespace, applies the same equality label-selector
//! semantics the real client sends, stamps server-assigned metadata on
//! create, and lets tests script the status sequences jobs and deployments
//! report while being polled.

use crate::{JobState, PlatformClient, RolloutStatus};
use async_trait::async_trait;
use automl_core::Error;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Pod, Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};
use chrono::DateTime;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use k8s_openapi::ByteString;
use k8s_openapi::Metadata;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

fn name_of<T: Metadata<Ty = ObjectMeta>>(obj: &T) -> String {
    obj.metadata().name.clone().unwrap_or_default()
}

/// Equality-term selector matching (`k=v,k2=v2`), the only form automl emits.
fn matches<T: Metadata<Ty = ObjectMeta>>(obj: &T, selector: &str) -> bool {
    let empty = BTreeMap::new();
    let labels = obj.metadata().labels.as_ref().unwrap_or(&empty);
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => labels.get(key).is_some_and(|have| have == value),
            None => false,
        })
}

fn already_exists(kind: &str, name: &str) -> Error {
    Error::Platform {
        code: 409,
        message: format!("{kind} {name:?} already exists"),
    }
}

fn not_found(kind: &str, name: &str) -> Error {
    Error::Platform {
        code: 404,
        message: format!("{kind} {name:?} not found"),
    }
}

#[derive(Default)]
struct Inner {
    counter: u64,
    namespaces: Vec<String>,
    service_accounts: HashMap<String, Vec<ServiceAccount>>,
    cluster_roles: Vec<ClusterRole>,
    cluster_role_bindings: Vec<ClusterRoleBinding>,
    secrets: HashMap<String, Vec<Secret>>,
    jobs: HashMap<String, Vec<Job>>,
    cron_jobs: HashMap<String, Vec<CronJob>>,
    deployments: HashMap<String, Vec<Deployment>>,
    services: HashMap<String, Vec<Service>>,
    ingresses: HashMap<String, Vec<Ingress>>,
    pods: HashMap<String, Vec<Pod>>,
    pod_logs: HashMap<String, String>,
    job_log_scripts: HashMap<String, String>,
    job_states: HashMap<String, VecDeque<JobState>>,
    rollouts: HashMap<String, VecDeque<RolloutStatus>>,
}

impl Inner {
    /// Stamp the fields a real API server would assign on create.
    fn stamp(&mut self, meta: &mut ObjectMeta) {
        self.counter += 1;
        if meta.name.is_none() {
            if let Some(prefix) = &meta.generate_name {
                meta.name = Some(format!("{prefix}{:05x}", self.counter));
            }
        }
        meta.uid = Some(format!("uid-{}", self.counter));
        meta.resource_version = Some(self.counter.to_string());
        meta.creation_timestamp = Some(Time(
            DateTime::from_timestamp(1_700_000_000 + self.counter as i64, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
        ));
    }
}

/// In-memory platform used by unit and spec tests.
#[derive(Clone, Default)]
pub struct FakePlatform {
    inner: Arc<Mutex<Inner>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the sequence of states a job reports; the last entry repeats.
    ///
    /// The key may be a prefix of the job name, since batch job names end
    /// in a random nonce.
    pub fn script_job_states(&self, job_name: &str, states: Vec<JobState>) {
        self.inner
            .lock()
            .job_states
            .insert(job_name.to_string(), states.into());
    }

    /// Script the sequence of rollout statuses a deployment reports; the
    /// last entry repeats. Unscripted deployments become available at once.
    pub fn script_rollout(&self, deployment_name: &str, statuses: Vec<RolloutStatus>) {
        self.inner
            .lock()
            .rollouts
            .insert(deployment_name.to_string(), statuses.into());
    }

    /// Script the log of the pod a job spawns, keyed by job-name prefix.
    /// Takes effect for jobs created after the call.
    pub fn script_job_log(&self, job_prefix: &str, log: &str) {
        self.inner
            .lock()
            .job_log_scripts
            .insert(job_prefix.to_string(), log.to_string());
    }

    /// Place a pod with labels and a canned log into a namespace.
    pub fn seed_pod(&self, scope: &str, name: &str, labels: &[(&str, &str)], log: &str) {
        let mut inner = self.inner.lock();
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(scope.to_string()),
                labels: Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..ObjectMeta::default()
            },
            ..Pod::default()
        };
        inner.pods.entry(scope.to_string()).or_default().push(pod);
        inner.pod_logs.insert(name.to_string(), log.to_string());
    }

    pub fn jobs_in(&self, scope: &str) -> Vec<Job> {
        self.inner.lock().jobs.get(scope).cloned().unwrap_or_default()
    }

    pub fn cron_jobs_in(&self, scope: &str) -> Vec<CronJob> {
        self.inner.lock().cron_jobs.get(scope).cloned().unwrap_or_default()
    }

    pub fn deployments_in(&self, scope: &str) -> Vec<Deployment> {
        self.inner.lock().deployments.get(scope).cloned().unwrap_or_default()
    }

    pub fn services_in(&self, scope: &str) -> Vec<Service> {
        self.inner.lock().services.get(scope).cloned().unwrap_or_default()
    }

    pub fn ingresses_in(&self, scope: &str) -> Vec<Ingress> {
        self.inner.lock().ingresses.get(scope).cloned().unwrap_or_default()
    }

    pub fn secrets_in(&self, scope: &str) -> Vec<Secret> {
        self.inner.lock().secrets.get(scope).cloned().unwrap_or_default()
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.inner.lock().namespaces.clone()
    }

    pub fn cluster_role_names(&self) -> Vec<String> {
        self.inner.lock().cluster_roles.iter().map(name_of).collect()
    }

    pub fn cluster_role_binding_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .cluster_role_bindings
            .iter()
            .map(name_of)
            .collect()
    }

    /// Decoded `data` of a secret, if it exists.
    pub fn secret_data(&self, scope: &str, name: &str) -> Option<BTreeMap<String, String>> {
        let inner = self.inner.lock();
        let secret = inner
            .secrets
            .get(scope)?
            .iter()
            .find(|s| name_of(*s) == name)?;
        let data = secret.data.clone().unwrap_or_default();
        Some(
            data.into_iter()
                .map(|(k, ByteString(v))| (k, String::from_utf8_lossy(&v).into_owned()))
                .collect(),
        )
    }
}

/// Fold `string_data` into `data` the way the API server does.
fn normalize_secret(mut secret: Secret) -> Secret {
    if let Some(string_data) = secret.string_data.take() {
        let data = secret.data.get_or_insert_with(BTreeMap::new);
        for (key, value) in string_data {
            data.insert(key, ByteString(value.into_bytes()));
        }
    }
    secret
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn namespace_exists(&self, scope: &str) -> Result<bool, Error> {
        Ok(self.inner.lock().namespaces.iter().any(|n| n == scope))
    }

    async fn create_namespace(&self, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        if inner.namespaces.iter().any(|n| n == scope) {
            return Err(already_exists("namespace", scope));
        }
        inner.namespaces.push(scope.to_string());
        Ok(())
    }

    async fn service_account_exists(&self, name: &str, scope: &str) -> Result<bool, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .service_accounts
            .get(scope)
            .is_some_and(|accounts| accounts.iter().any(|a| name_of(a) == name)))
    }

    async fn create_service_account(
        &self,
        mut account: ServiceAccount,
        scope: &str,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let name = name_of(&account);
        let accounts = inner.service_accounts.entry(scope.to_string()).or_default();
        if accounts.iter().any(|a| name_of(a) == name) {
            return Err(already_exists("serviceaccount", &name));
        }
        inner.stamp(&mut account.metadata);
        inner
            .service_accounts
            .entry(scope.to_string())
            .or_default()
            .push(account);
        Ok(())
    }

    async fn cluster_role_exists(&self, name: &str) -> Result<bool, Error> {
        Ok(self.inner.lock().cluster_roles.iter().any(|r| name_of(r) == name))
    }

    async fn create_cluster_role(&self, mut role: ClusterRole) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let name = name_of(&role);
        if inner.cluster_roles.iter().any(|r| name_of(r) == name) {
            return Err(already_exists("clusterrole", &name));
        }
        inner.stamp(&mut role.metadata);
        inner.cluster_roles.push(role);
        Ok(())
    }

    async fn cluster_role_binding_exists(&self, name: &str) -> Result<bool, Error> {
        Ok(self
            .inner
            .lock()
            .cluster_role_bindings
            .iter()
            .any(|b| name_of(b) == name))
    }

    async fn create_cluster_role_binding(
        &self,
        mut binding: ClusterRoleBinding,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let name = name_of(&binding);
        if inner.cluster_role_bindings.iter().any(|b| name_of(b) == name) {
            return Err(already_exists("clusterrolebinding", &name));
        }
        inner.stamp(&mut binding.metadata);
        inner.cluster_role_bindings.push(binding);
        Ok(())
    }

    async fn list_secrets(&self, scope: &str, selector: &str) -> Result<Vec<Secret>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .secrets
            .get(scope)
            .map(|secrets| {
                secrets
                    .iter()
                    .filter(|s| matches(*s, selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_secret(&self, name: &str, scope: &str) -> Result<Option<Secret>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .secrets
            .get(scope)
            .and_then(|secrets| secrets.iter().find(|s| name_of(*s) == name).cloned()))
    }

    async fn create_secret(&self, secret: Secret, scope: &str) -> Result<(), Error> {
        let mut secret = normalize_secret(secret);
        let mut inner = self.inner.lock();
        let name = name_of(&secret);
        let secrets = inner.secrets.entry(scope.to_string()).or_default();
        if secrets.iter().any(|s| name_of(s) == name) {
            return Err(already_exists("secret", &name));
        }
        inner.stamp(&mut secret.metadata);
        inner
            .secrets
            .entry(scope.to_string())
            .or_default()
            .push(secret);
        Ok(())
    }

    async fn patch_secret(&self, name: &str, secret: Secret, scope: &str) -> Result<(), Error> {
        let patch = normalize_secret(secret);
        let mut inner = self.inner.lock();
        let secrets = inner.secrets.entry(scope.to_string()).or_default();
        let existing = secrets
            .iter_mut()
            .find(|s| name_of(*s) == name)
            .ok_or_else(|| not_found("secret", name))?;
        if let Some(data) = patch.data {
            let merged = existing.data.get_or_insert_with(BTreeMap::new);
            for (key, value) in data {
                merged.insert(key, value);
            }
        }
        if let Some(labels) = patch.metadata.labels {
            let merged = existing.metadata.labels.get_or_insert_with(BTreeMap::new);
            for (key, value) in labels {
                merged.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete_secret(&self, name: &str, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let secrets = inner.secrets.entry(scope.to_string()).or_default();
        let before = secrets.len();
        secrets.retain(|s| name_of(s) != name);
        if secrets.len() == before {
            return Err(not_found("secret", name));
        }
        Ok(())
    }

    async fn list_jobs(&self, scope: &str, selector: &str) -> Result<Vec<Job>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .jobs
            .get(scope)
            .map(|jobs| jobs.iter().filter(|j| matches(*j, selector)).cloned().collect())
            .unwrap_or_default())
    }

    async fn create_job(&self, mut job: Job, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.stamp(&mut job.metadata);
        let name = name_of(&job);
        let mut pod_labels = job.metadata.labels.clone().unwrap_or_default();
        let jobs = inner.jobs.entry(scope.to_string()).or_default();
        if jobs.iter().any(|j| name_of(j) == name) {
            return Err(already_exists("job", &name));
        }
        jobs.push(job);

        // A real cluster spawns a pod for the job; mirror that so log
        // lookups by the job-name label work.
        pod_labels.insert("job-name".to_string(), name.clone());
        let pod_name = format!("{name}-pod");
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some(pod_name.clone()),
                namespace: Some(scope.to_string()),
                labels: Some(pod_labels),
                ..ObjectMeta::default()
            },
            ..Pod::default()
        };
        inner.pods.entry(scope.to_string()).or_default().push(pod);
        let log = inner
            .job_log_scripts
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix.as_str()))
            .map(|(_, log)| log.clone())
            .unwrap_or_default();
        inner.pod_logs.insert(pod_name, log);
        Ok(())
    }

    async fn delete_job(&self, name: &str, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let jobs = inner.jobs.entry(scope.to_string()).or_default();
        let before = jobs.len();
        jobs.retain(|j| name_of(j) != name);
        if jobs.len() == before {
            return Err(not_found("job", name));
        }
        Ok(())
    }

    async fn read_job_state(&self, name: &str, scope: &str) -> Result<JobState, Error> {
        let mut inner = self.inner.lock();
        if !inner
            .jobs
            .get(scope)
            .is_some_and(|jobs| jobs.iter().any(|j| name_of(j) == name))
        {
            return Err(not_found("job", name));
        }
        let key = inner
            .job_states
            .keys()
            .find(|key| name.starts_with(key.as_str()))
            .cloned();
        let state = match key.and_then(|key| inner.job_states.get_mut(&key)) {
            Some(states) if states.len() > 1 => states.pop_front().unwrap_or(JobState::Succeeded),
            Some(states) => states.front().copied().unwrap_or(JobState::Succeeded),
            None => JobState::Succeeded,
        };
        Ok(state)
    }

    async fn list_cron_jobs(&self, scope: &str, selector: &str) -> Result<Vec<CronJob>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .cron_jobs
            .get(scope)
            .map(|jobs| jobs.iter().filter(|j| matches(*j, selector)).cloned().collect())
            .unwrap_or_default())
    }

    async fn create_cron_job(&self, mut job: CronJob, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.stamp(&mut job.metadata);
        let name = name_of(&job);
        let jobs = inner.cron_jobs.entry(scope.to_string()).or_default();
        if jobs.iter().any(|j| name_of(j) == name) {
            return Err(already_exists("cronjob", &name));
        }
        jobs.push(job);
        Ok(())
    }

    async fn delete_cron_job(&self, name: &str, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let jobs = inner.cron_jobs.entry(scope.to_string()).or_default();
        let before = jobs.len();
        jobs.retain(|j| name_of(j) != name);
        if jobs.len() == before {
            return Err(not_found("cronjob", name));
        }
        Ok(())
    }

    async fn list_deployments(
        &self,
        scope: &str,
        selector: &str,
    ) -> Result<Vec<Deployment>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .deployments
            .get(scope)
            .map(|deployments| {
                deployments
                    .iter()
                    .filter(|d| matches(*d, selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_deployment(&self, name: &str, scope: &str) -> Result<Option<Deployment>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .deployments
            .get(scope)
            .and_then(|deployments| deployments.iter().find(|d| name_of(*d) == name).cloned()))
    }

    async fn create_deployment(
        &self,
        mut deployment: Deployment,
        scope: &str,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.stamp(&mut deployment.metadata);
        let name = name_of(&deployment);
        let deployments = inner.deployments.entry(scope.to_string()).or_default();
        if deployments.iter().any(|d| name_of(d) == name) {
            return Err(already_exists("deployment", &name));
        }
        deployments.push(deployment);
        Ok(())
    }

    async fn replace_deployment(
        &self,
        name: &str,
        mut deployment: Deployment,
        scope: &str,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.counter += 1;
        let version = inner.counter.to_string();
        let deployments = inner.deployments.entry(scope.to_string()).or_default();
        let existing = deployments
            .iter_mut()
            .find(|d| name_of(*d) == name)
            .ok_or_else(|| not_found("deployment", name))?;
        // The server keeps identity fields and bumps the version.
        deployment.metadata.uid = existing.metadata.uid.clone();
        deployment.metadata.creation_timestamp = existing.metadata.creation_timestamp.clone();
        deployment.metadata.resource_version = Some(version);
        *existing = deployment;
        Ok(())
    }

    async fn delete_deployment(&self, name: &str, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let deployments = inner.deployments.entry(scope.to_string()).or_default();
        let before = deployments.len();
        deployments.retain(|d| name_of(d) != name);
        if deployments.len() == before {
            return Err(not_found("deployment", name));
        }
        Ok(())
    }

    async fn read_rollout_status(&self, name: &str, scope: &str) -> Result<RolloutStatus, Error> {
        let mut inner = self.inner.lock();
        let spec_replicas = inner
            .deployments
            .get(scope)
            .and_then(|deployments| deployments.iter().find(|d| name_of(*d) == name))
            .ok_or_else(|| not_found("deployment", name))?
            .spec
            .as_ref()
            .and_then(|spec| spec.replicas);
        let status = match inner.rollouts.get_mut(name) {
            Some(statuses) if statuses.len() > 1 => statuses.pop_front().unwrap_or_default(),
            Some(statuses) => statuses.front().copied().unwrap_or_default(),
            None => RolloutStatus {
                replicas: spec_replicas,
                available_replicas: spec_replicas,
            },
        };
        Ok(status)
    }

    async fn list_services(&self, scope: &str, selector: &str) -> Result<Vec<Service>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .services
            .get(scope)
            .map(|services| {
                services
                    .iter()
                    .filter(|s| matches(*s, selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_service(&self, name: &str, scope: &str) -> Result<Option<Service>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .services
            .get(scope)
            .and_then(|services| services.iter().find(|s| name_of(*s) == name).cloned()))
    }

    async fn create_service(&self, mut service: Service, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.stamp(&mut service.metadata);
        let name = name_of(&service);
        let services = inner.services.entry(scope.to_string()).or_default();
        if services.iter().any(|s| name_of(s) == name) {
            return Err(already_exists("service", &name));
        }
        services.push(service);
        Ok(())
    }

    async fn delete_service(&self, name: &str, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let services = inner.services.entry(scope.to_string()).or_default();
        let before = services.len();
        services.retain(|s| name_of(s) != name);
        if services.len() == before {
            return Err(not_found("service", name));
        }
        Ok(())
    }

    async fn list_ingresses(&self, scope: &str, selector: &str) -> Result<Vec<Ingress>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .ingresses
            .get(scope)
            .map(|ingresses| {
                ingresses
                    .iter()
                    .filter(|i| matches(*i, selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_ingress(&self, name: &str, scope: &str) -> Result<Option<Ingress>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .ingresses
            .get(scope)
            .and_then(|ingresses| ingresses.iter().find(|i| name_of(*i) == name).cloned()))
    }

    async fn create_ingress(&self, mut ingress: Ingress, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.stamp(&mut ingress.metadata);
        let name = name_of(&ingress);
        let ingresses = inner.ingresses.entry(scope.to_string()).or_default();
        if ingresses.iter().any(|i| name_of(i) == name) {
            return Err(already_exists("ingress", &name));
        }
        ingresses.push(ingress);
        Ok(())
    }

    async fn delete_ingress(&self, name: &str, scope: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let ingresses = inner.ingresses.entry(scope.to_string()).or_default();
        let before = ingresses.len();
        ingresses.retain(|i| name_of(i) != name);
        if ingresses.len() == before {
            return Err(not_found("ingress", name));
        }
        Ok(())
    }

    async fn list_pods(&self, scope: &str, selector: &str) -> Result<Vec<Pod>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .pods
            .get(scope)
            .map(|pods| pods.iter().filter(|p| matches(*p, selector)).cloned().collect())
            .unwrap_or_default())
    }

    async fn read_pod_log(&self, name: &str, scope: &str) -> Result<String, Error> {
        let inner = self.inner.lock();
        if !inner
            .pods
            .get(scope)
            .is_some_and(|pods| pods.iter().any(|p| name_of(p) == name))
        {
            return Err(not_found("pod", name));
        }
        Ok(inner.pod_logs.get(name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
