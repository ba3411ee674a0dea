// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access-control bootstrap.
//!
//! A driver pod starts with no permissions; before any pipeline operation
//! the scope, service account, cluster role and binding must exist. Each
//! piece is created only when a name lookup misses, so the bootstrap is
//! idempotent and safe to run at the start of every operation.

use automl_core::{defaults, Error};
use automl_platform::PlatformClient;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Ensure the scope and its RBAC objects exist.
pub async fn ensure(platform: &dyn PlatformClient, scope: &str) -> Result<(), Error> {
    if !platform.namespace_exists(scope).await? {
        tracing::info!(scope, "creating namespace");
        platform.create_namespace(scope).await?;
    }

    let account = defaults::SERVICE_ACCOUNT;
    if !platform.service_account_exists(account, scope).await? {
        tracing::info!(account, scope, "creating service account");
        platform
            .create_service_account(service_account_object(account, scope), scope)
            .await?;
    }

    let role = defaults::CLUSTER_ROLE;
    if !platform.cluster_role_exists(role).await? {
        tracing::info!(role, "creating cluster role");
        platform.create_cluster_role(cluster_role_object(role)).await?;
    }

    let binding = defaults::CLUSTER_ROLE_BINDING;
    if !platform.cluster_role_binding_exists(binding).await? {
        tracing::info!(
            binding,
            role,
            account,
            scope,
            "creating cluster role binding"
        );
        platform
            .create_cluster_role_binding(cluster_role_binding_object(
                binding, role, account, scope,
            ))
            .await?;
    }

    Ok(())
}

fn service_account_object(name: &str, scope: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            namespace: Some(scope.to_string()),
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        ..ServiceAccount::default()
    }
}

fn rule(api_groups: &[&str], resources: &[&str], verbs: &[&str]) -> PolicyRule {
    PolicyRule {
        api_groups: Some(api_groups.iter().map(|s| s.to_string()).collect()),
        resources: Some(resources.iter().map(|s| s.to_string()).collect()),
        verbs: verbs.iter().map(|s| s.to_string()).collect(),
        ..PolicyRule::default()
    }
}

fn cluster_role_object(name: &str) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        rules: Some(vec![
            rule(&[""], &["namespaces", "services"], &["get", "list", "create", "delete"]),
            rule(&[""], &["serviceaccounts"], &["list", "create"]),
            rule(&[""], &["pods", "pods/log"], &["get", "list"]),
            rule(&[""], &["configmaps"], &["get", "list"]),
            rule(
                &[""],
                &["secrets"],
                &["get", "list", "create", "update", "patch"],
            ),
            rule(
                &["rbac.authorization.k8s.io"],
                &["roles", "rolebindings"],
                &["create"],
            ),
            rule(
                &["rbac.authorization.k8s.io"],
                &["clusterrolebindings"],
                &["get", "list", "create"],
            ),
            rule(&["apps", "batch", "core"], &["*"], &["*"]),
            rule(&["networking.k8s.io", "extensions"], &["ingresses"], &["*"]),
        ]),
        ..ClusterRole::default()
    }
}

fn cluster_role_binding_object(
    name: &str,
    role: &str,
    account: &str,
    scope: &str,
) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: role.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: account.to_string(),
            namespace: Some(scope.to_string()),
            ..Subject::default()
        }]),
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
