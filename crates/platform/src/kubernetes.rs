// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes-backed [`PlatformClient`].
//!
//! Thin adapter: every method is one API call plus error mapping. No
//! caching, no retries; the cluster is the single source of truth.

use crate::{JobState, PlatformClient, RolloutStatus};
use async_trait::async_trait;
use automl_core::Error;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Namespace, Pod, Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, LogParams, Patch, PatchParams, PostParams};
use kube::{Client, Config};

/// Live-cluster platform client.
#[derive(Clone)]
pub struct KubePlatform {
    client: Client,
    in_cluster: bool,
}

impl KubePlatform {
    /// Authenticate against the cluster.
    ///
    /// Inside a driver pod (`KUBERNETES_SERVICE_HOST` set) the in-cluster
    /// service account is used; on an operator machine the local kubeconfig.
    pub async fn authenticate() -> Result<Self, Error> {
        let in_cluster = std::env::var("KUBERNETES_SERVICE_HOST").is_ok();
        if in_cluster {
            tracing::info!("loading in-cluster platform credentials (running as a driver)");
        } else {
            tracing::info!("loading platform credentials from the local kubeconfig");
        }

        let config = Config::infer().await.map_err(|e| Error::Auth {
            in_cluster,
            message: e.to_string(),
        })?;
        let client = Client::try_from(config).map_err(|e| Error::Auth {
            in_cluster,
            message: e.to_string(),
        })?;
        Ok(Self { client, in_cluster })
    }

    fn api_err(&self, err: kube::Error) -> Error {
        match err {
            kube::Error::Api(resp) => Error::Platform {
                code: resp.code,
                message: resp.message,
            },
            kube::Error::Auth(err) => Error::Auth {
                in_cluster: self.in_cluster,
                message: err.to_string(),
            },
            other => Error::Transport(other.to_string()),
        }
    }

    fn jobs(&self, scope: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), scope)
    }

    fn cron_jobs(&self, scope: &str) -> Api<CronJob> {
        Api::namespaced(self.client.clone(), scope)
    }

    fn deployments(&self, scope: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), scope)
    }

    fn secrets(&self, scope: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), scope)
    }

    fn services(&self, scope: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), scope)
    }

    fn ingresses(&self, scope: &str) -> Api<Ingress> {
        Api::namespaced(self.client.clone(), scope)
    }

    fn pods(&self, scope: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), scope)
    }
}

fn labeled(selector: &str) -> ListParams {
    ListParams::default().labels(selector)
}

#[async_trait]
impl PlatformClient for KubePlatform {
    async fn namespace_exists(&self, scope: &str) -> Result<bool, Error> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        Ok(api.get_opt(scope).await.map_err(|e| self.api_err(e))?.is_some())
    }

    async fn create_namespace(&self, scope: &str) -> Result<(), Error> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(scope.to_string()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };
        api.create(&PostParams::default(), &namespace)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn service_account_exists(&self, name: &str, scope: &str) -> Result<bool, Error> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), scope);
        Ok(api.get_opt(name).await.map_err(|e| self.api_err(e))?.is_some())
    }

    async fn create_service_account(
        &self,
        account: ServiceAccount,
        scope: &str,
    ) -> Result<(), Error> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), scope);
        api.create(&PostParams::default(), &account)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn cluster_role_exists(&self, name: &str) -> Result<bool, Error> {
        let api: Api<ClusterRole> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await.map_err(|e| self.api_err(e))?.is_some())
    }

    async fn create_cluster_role(&self, role: ClusterRole) -> Result<(), Error> {
        let api: Api<ClusterRole> = Api::all(self.client.clone());
        api.create(&PostParams::default(), &role)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn cluster_role_binding_exists(&self, name: &str) -> Result<bool, Error> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await.map_err(|e| self.api_err(e))?.is_some())
    }

    async fn create_cluster_role_binding(
        &self,
        binding: ClusterRoleBinding,
    ) -> Result<(), Error> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        api.create(&PostParams::default(), &binding)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn list_secrets(&self, scope: &str, selector: &str) -> Result<Vec<Secret>, Error> {
        let list = self
            .secrets(scope)
            .list(&labeled(selector))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(list.items)
    }

    async fn get_secret(&self, name: &str, scope: &str) -> Result<Option<Secret>, Error> {
        self.secrets(scope)
            .get_opt(name)
            .await
            .map_err(|e| self.api_err(e))
    }

    async fn create_secret(&self, secret: Secret, scope: &str) -> Result<(), Error> {
        self.secrets(scope)
            .create(&PostParams::default(), &secret)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn patch_secret(&self, name: &str, secret: Secret, scope: &str) -> Result<(), Error> {
        self.secrets(scope)
            .patch(name, &PatchParams::default(), &Patch::Strategic(secret))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn delete_secret(&self, name: &str, scope: &str) -> Result<(), Error> {
        self.secrets(scope)
            .delete(name, &DeleteParams::background())
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn list_jobs(&self, scope: &str, selector: &str) -> Result<Vec<Job>, Error> {
        let list = self
            .jobs(scope)
            .list(&labeled(selector))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(list.items)
    }

    async fn create_job(&self, job: Job, scope: &str) -> Result<(), Error> {
        self.jobs(scope)
            .create(&PostParams::default(), &job)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn delete_job(&self, name: &str, scope: &str) -> Result<(), Error> {
        self.jobs(scope)
            .delete(name, &DeleteParams::background())
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn read_job_state(&self, name: &str, scope: &str) -> Result<JobState, Error> {
        let job = self
            .jobs(scope)
            .get_status(name)
            .await
            .map_err(|e| self.api_err(e))?;
        let status = job.status.unwrap_or_default();
        if status.active.is_some() {
            Ok(JobState::Active)
        } else if status.succeeded.is_some() {
            Ok(JobState::Succeeded)
        } else if status.failed.is_some() {
            Ok(JobState::Failed)
        } else {
            Err(Error::Unexpected(format!(
                "status of job {name} in {scope} is not reported"
            )))
        }
    }

    async fn list_cron_jobs(&self, scope: &str, selector: &str) -> Result<Vec<CronJob>, Error> {
        let list = self
            .cron_jobs(scope)
            .list(&labeled(selector))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(list.items)
    }

    async fn create_cron_job(&self, job: CronJob, scope: &str) -> Result<(), Error> {
        self.cron_jobs(scope)
            .create(&PostParams::default(), &job)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn delete_cron_job(&self, name: &str, scope: &str) -> Result<(), Error> {
        self.cron_jobs(scope)
            .delete(name, &DeleteParams::background())
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn list_deployments(
        &self,
        scope: &str,
        selector: &str,
    ) -> Result<Vec<Deployment>, Error> {
        let list = self
            .deployments(scope)
            .list(&labeled(selector))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(list.items)
    }

    async fn get_deployment(&self, name: &str, scope: &str) -> Result<Option<Deployment>, Error> {
        self.deployments(scope)
            .get_opt(name)
            .await
            .map_err(|e| self.api_err(e))
    }

    async fn create_deployment(&self, deployment: Deployment, scope: &str) -> Result<(), Error> {
        self.deployments(scope)
            .create(&PostParams::default(), &deployment)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn replace_deployment(
        &self,
        name: &str,
        deployment: Deployment,
        scope: &str,
    ) -> Result<(), Error> {
        self.deployments(scope)
            .replace(name, &PostParams::default(), &deployment)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn delete_deployment(&self, name: &str, scope: &str) -> Result<(), Error> {
        self.deployments(scope)
            .delete(name, &DeleteParams::background())
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn read_rollout_status(&self, name: &str, scope: &str) -> Result<RolloutStatus, Error> {
        let deployment = self
            .deployments(scope)
            .get_status(name)
            .await
            .map_err(|e| self.api_err(e))?;
        let status = deployment.status.unwrap_or_default();
        Ok(RolloutStatus {
            replicas: status.replicas,
            available_replicas: status.available_replicas,
        })
    }

    async fn list_services(&self, scope: &str, selector: &str) -> Result<Vec<Service>, Error> {
        let list = self
            .services(scope)
            .list(&labeled(selector))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(list.items)
    }

    async fn get_service(&self, name: &str, scope: &str) -> Result<Option<Service>, Error> {
        self.services(scope)
            .get_opt(name)
            .await
            .map_err(|e| self.api_err(e))
    }

    async fn create_service(&self, service: Service, scope: &str) -> Result<(), Error> {
        self.services(scope)
            .create(&PostParams::default(), &service)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn delete_service(&self, name: &str, scope: &str) -> Result<(), Error> {
        self.services(scope)
            .delete(name, &DeleteParams::background())
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn list_ingresses(&self, scope: &str, selector: &str) -> Result<Vec<Ingress>, Error> {
        let list = self
            .ingresses(scope)
            .list(&labeled(selector))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(list.items)
    }

    async fn get_ingress(&self, name: &str, scope: &str) -> Result<Option<Ingress>, Error> {
        self.ingresses(scope)
            .get_opt(name)
            .await
            .map_err(|e| self.api_err(e))
    }

    async fn create_ingress(&self, ingress: Ingress, scope: &str) -> Result<(), Error> {
        self.ingresses(scope)
            .create(&PostParams::default(), &ingress)
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn delete_ingress(&self, name: &str, scope: &str) -> Result<(), Error> {
        self.ingresses(scope)
            .delete(name, &DeleteParams::background())
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(())
    }

    async fn list_pods(&self, scope: &str, selector: &str) -> Result<Vec<Pod>, Error> {
        let list = self
            .pods(scope)
            .list(&labeled(selector))
            .await
            .map_err(|e| self.api_err(e))?;
        Ok(list.items)
    }

    async fn read_pod_log(&self, name: &str, scope: &str) -> Result<String, Error> {
        self.pods(scope)
            .logs(name, &LogParams::default())
            .await
            .map_err(|e| self.api_err(e))
    }
}
