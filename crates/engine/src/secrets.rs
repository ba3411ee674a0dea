// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential manager.
//!
//! Secrets are the only objects that survive pipeline updates; they are
//! created once, merged on update, and resolved into container envs right
//! before step objects are built so a missing secret stops a stage before
//! anything is submitted.

use automl_core::labels::{Selector, APP, APP_LABEL, PIPELINE_LABEL};
use automl_core::name::repo_secret_name;
use automl_core::Error;
use automl_platform::PlatformClient;
use k8s_openapi::api::core::v1::{EnvFromSource, LocalObjectReference, Secret, SecretEnvSource};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;

/// Secret type marking registry credentials.
pub const IMAGE_PULL_SECRET_TYPE: &str = "kubernetes.io/dockerconfigjson";

fn secret_object(
    name: &str,
    data: BTreeMap<String, String>,
    scope: &str,
    pipeline: Option<&str>,
    kind: Option<&str>,
) -> Secret {
    let mut secret_labels = BTreeMap::from([(APP_LABEL.to_string(), APP.to_string())]);
    if let Some(pipeline) = pipeline {
        secret_labels.insert(PIPELINE_LABEL.to_string(), pipeline.to_string());
    }
    Secret {
        metadata: ObjectMeta {
            namespace: Some(scope.to_string()),
            name: Some(name.to_string()),
            labels: Some(secret_labels),
            ..ObjectMeta::default()
        },
        string_data: Some(data),
        type_: kind.map(str::to_string),
        ..Secret::default()
    }
}

fn decoded_data(secret: &Secret) -> BTreeMap<String, String> {
    secret
        .data
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|(key, ByteString(value))| (key, String::from_utf8_lossy(&value).into_owned()))
        .chain(secret.string_data.clone().unwrap_or_default())
        .collect()
}

/// Create a secret; refuses to overwrite an existing one.
pub async fn create(
    platform: &dyn PlatformClient,
    name: &str,
    data: BTreeMap<String, String>,
    scope: &str,
    pipeline: Option<&str>,
    kind: Option<&str>,
) -> Result<(), Error> {
    if platform.get_secret(name, scope).await?.is_some() {
        return Err(Error::Stop(format!(
            "secret {name} already exists in {scope} namespace"
        )));
    }
    platform
        .create_secret(secret_object(name, data, scope, pipeline, kind), scope)
        .await?;
    tracing::info!(secret = name, scope, "secret created");
    Ok(())
}

/// Merge new keys into an existing secret and patch it in place.
///
/// The `pipeline` label of the stored secret is preserved.
pub async fn update(
    platform: &dyn PlatformClient,
    name: &str,
    data: BTreeMap<String, String>,
    scope: &str,
) -> Result<(), Error> {
    let existing = platform.get_secret(name, scope).await?.ok_or_else(|| {
        Error::Stop(format!("secret {name} does not exist in {scope} namespace"))
    })?;

    let mut merged = decoded_data(&existing);
    merged.extend(data);

    let pipeline = existing
        .metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(PIPELINE_LABEL))
        .map(String::as_str);
    let kind = existing.type_.as_deref();

    platform
        .patch_secret(name, secret_object(name, merged, scope, pipeline, kind), scope)
        .await?;
    tracing::info!(secret = name, scope, "secret updated");
    Ok(())
}

/// Delete one secret by name.
pub async fn delete(platform: &dyn PlatformClient, name: &str, scope: &str) -> Result<(), Error> {
    platform.delete_secret(name, scope).await?;
    tracing::info!(secret = name, scope, "secret deleted");
    Ok(())
}

/// Delete every secret labeled with the pipeline.
pub async fn delete_all(
    platform: &dyn PlatformClient,
    pipeline: &str,
    scope: &str,
) -> Result<(), Error> {
    let selector = Selector::pipeline(pipeline).to_string();
    for secret in platform.list_secrets(scope, &selector).await? {
        if let Some(name) = secret.metadata.name {
            platform.delete_secret(&name, scope).await?;
        }
    }
    Ok(())
}

/// Resolve secret names into container `envFrom` references.
///
/// Lists the owned secrets first; any requested name that is absent fails
/// the whole stage before a single step object is submitted.
pub async fn env_from(
    platform: &dyn PlatformClient,
    names: &[String],
    scope: &str,
) -> Result<Vec<EnvFromSource>, Error> {
    let owned = platform
        .list_secrets(scope, &Selector::all().to_string())
        .await?;
    let owned_names: Vec<&str> = owned
        .iter()
        .filter_map(|s| s.metadata.name.as_deref())
        .collect();

    let missing: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| !owned_names.contains(name))
        .collect();
    if !missing.is_empty() {
        return Err(Error::Stop(format!(
            "{} secret(s) were not found in {scope} namespace",
            missing.join(", ")
        )));
    }

    Ok(names
        .iter()
        .map(|name| EnvFromSource {
            secret_ref: Some(SecretEnvSource {
                name: name.clone(),
                optional: None,
            }),
            ..EnvFromSource::default()
        })
        .collect())
}

/// Reference to the newest registry credential in the scope, if any.
///
/// Ties are broken by creation timestamp, most recent first.
pub async fn image_pull_reference(
    platform: &dyn PlatformClient,
    scope: &str,
) -> Result<Option<LocalObjectReference>, Error> {
    let mut pull_secrets: Vec<Secret> = platform
        .list_secrets(scope, &Selector::all().to_string())
        .await?
        .into_iter()
        .filter(|s| s.type_.as_deref() == Some(IMAGE_PULL_SECRET_TYPE))
        .collect();
    pull_secrets.sort_by(|a, b| {
        b.metadata
            .creation_timestamp
            .cmp(&a.metadata.creation_timestamp)
    });

    Ok(pull_secrets.into_iter().next().map(|s| LocalObjectReference {
        name: s.metadata.name.unwrap_or_default(),
    }))
}

/// Create or merge the per-pipeline `repo-{name}` secret holding the
/// resolved repository and configuration URLs.
pub async fn configure_repo_secret(
    platform: &dyn PlatformClient,
    pipeline: &str,
    scope: &str,
    repo_url: &str,
    config_url: &str,
) -> Result<(), Error> {
    let name = repo_secret_name(pipeline);
    let data = BTreeMap::from([
        ("REPO_URL".to_string(), repo_url.to_string()),
        ("CONFIG_URL".to_string(), config_url.to_string()),
    ]);

    if platform.get_secret(&name, scope).await?.is_some() {
        update(platform, &name, data, scope).await
    } else {
        create(platform, &name, data, scope, Some(pipeline), None).await
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
