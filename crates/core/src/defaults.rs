// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Well-known names, images and limits used across the crates.

/// Default namespace that pipelines are placed in.
pub const NAMESPACE: &str = "automl";

/// Service account bound to every driver pod.
pub const SERVICE_ACCOUNT: &str = "automl-service-account";

/// Cluster role granting the verbs the runner needs.
pub const CLUSTER_ROLE: &str = "automl-controller";

/// Cluster role binding attaching [`CLUSTER_ROLE`] to [`SERVICE_ACCOUNT`].
pub const CLUSTER_ROLE_BINDING: &str = "automl-granter";

/// Container name used in every pod template automl produces.
pub const CONTAINER_NAME: &str = "automl";

/// Image repository of the server image the driver runs.
pub const RUNNER_IMAGE_REPO: &str = "valeger/automl";

/// Image repository of the default client image steps run in.
pub const CLIENT_IMAGE_REPO: &str = "valeger/automl-client";

/// Seconds a finished driver job is kept before the platform collects it.
pub const RUNNER_TTL_AFTER_FINISHED: i32 = 604_800;

/// `successfulJobsHistoryLimit` of the cron driver.
pub const RUNNER_SUCCESS_JOBS_LIMIT: i32 = 2;

/// `failedJobsHistoryLimit` of the cron driver.
pub const RUNNER_FAILED_JOBS_LIMIT: i32 = 2;

/// `backoffLimit` of the driver job.
pub const RUNNER_BACKOFF_LIMIT: i32 = 2;

/// Crate version; doubles as the default image tag.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Image tag for both the runner and the default client image.
///
/// `DOCKER_TEST_TAG` overrides the released tag so integration environments
/// can pin a freshly built image.
pub fn image_tag() -> String {
    std::env::var("DOCKER_TEST_TAG").unwrap_or_else(|_| VERSION.to_string())
}

/// Full reference of the server image the driver runs.
pub fn runner_image() -> String {
    format!("{RUNNER_IMAGE_REPO}:{}", image_tag())
}

/// Full reference of the default client image.
pub fn client_image() -> String {
    format!("{CLIENT_IMAGE_REPO}:{}", image_tag())
}

/// Registry endpoint probed to confirm an image tag exists.
pub fn registry_tag_url(user: &str, repo: &str, tag: &str) -> String {
    format!("https://hub.docker.com/v2/repositories/{user}/{repo}/tags/{tag}")
}
