// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated in-memory model of the pipeline configuration file.
//!
//! The YAML document is deserialized into raw records, then validated at
//! this edge into [`PipelineConfig`]; everything downstream consumes pure
//! values and never re-checks them. Batch and service steps are a tagged
//! variant, not an optional field probed at runtime.

use crate::defaults;
use crate::error::Error;
use crate::name::fix_resource_name;
use crate::schedule::validate_schedule;
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

fn compile(pattern: &str) -> Regex {
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("static config pattern compiles")
}

static EXECUTABLE_PATH: LazyLock<Regex> = LazyLock::new(|| compile(r"^.+\.(py|ipynb)$"));
static DEPENDENCY_PATH: LazyLock<Regex> = LazyLock::new(|| compile(r".+\.txt$"));
static IMAGE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([\w._-]+/)?([\w._-]+)(?::([\w._-]+))?$"));

/// A normalized container image reference.
///
/// Bare repositories fall back to the `library` user and the `latest` tag,
/// mirroring how the registry resolves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub user: String,
    pub repo: String,
    pub tag: String,
}

impl ImageRef {
    pub fn parse(image: &str) -> Result<Self, Error> {
        let caps = IMAGE_REFERENCE
            .captures(image)
            .ok_or_else(|| Error::Value(format!("invalid image reference: {image}")))?;
        let user = caps
            .get(1)
            .map(|m| m.as_str().trim_end_matches('/').to_string())
            .unwrap_or_else(|| "library".to_string());
        let repo = caps[2].to_string();
        let tag = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "latest".to_string());
        Ok(Self { user, repo, tag })
    }

    /// `user/repo:tag` form used in container specs.
    pub fn reference(&self) -> String {
        format!("{}/{}:{}", self.user, self.repo, self.tag)
    }

    /// Whether this is the stock client image whose entry recipe clones the
    /// repository; overridden images run their `command` verbatim.
    pub fn is_default_client(&self) -> bool {
        self.reference() == defaults::client_image()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference())
    }
}

/// Existence probe for image references, implemented against the registry
/// HTTP API by automl-remote and faked in tests.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn check(&self, image: &ImageRef) -> Result<(), Error>;
}

/// Network exposure of a service step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServicePortSpec {
    #[serde(default = "default_port")]
    pub port: i32,
    #[serde(default)]
    pub ingress: bool,
}

/// Fields shared by batch and service steps.
#[derive(Debug, Clone)]
pub struct StepCommon {
    pub name: String,
    pub executable: String,
    pub dependency: String,
    pub image: ImageRef,
    pub command: Option<Vec<String>>,
    pub envs: IndexMap<String, String>,
    pub secrets: Vec<String>,
    pub cpu_request: f64,
    pub memory_request_mib: u32,
    pub backoff_limit: i32,
    pub timeout: Duration,
    pub polling_interval: Duration,
    pub warm_up: Duration,
}

/// Fields only a service step carries.
#[derive(Debug, Clone)]
pub struct ServiceStep {
    pub replicas: i32,
    pub revision_history_limit: i32,
    pub min_ready_seconds: i32,
    pub service: ServicePortSpec,
}

/// Discriminates the two step executors.
#[derive(Debug, Clone)]
pub enum StepKind {
    Batch,
    Service(ServiceStep),
}

/// One validated step of a stage.
#[derive(Debug, Clone)]
pub struct Step {
    pub common: StepCommon,
    pub kind: StepKind,
}

impl Step {
    pub fn is_batch(&self) -> bool {
        matches!(self.kind, StepKind::Batch)
    }

    pub fn service(&self) -> Option<&ServiceStep> {
        match &self.kind {
            StepKind::Service(service) => Some(service),
            StepKind::Batch => None,
        }
    }
}

/// The whole validated configuration document.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub version: String,
    pub name: Option<String>,
    pub schedule: Option<String>,
    /// Declaration order is execution order.
    pub stages: IndexMap<String, Vec<Step>>,
}

impl PipelineConfig {
    /// Confirm every referenced image exists in its registry.
    ///
    /// Separated from [`parse_config`] so structural validation stays pure;
    /// each distinct reference is probed once.
    pub async fn verify_images(&self, probe: &dyn ImageProbe) -> Result<(), Error> {
        let mut seen: Vec<String> = Vec::new();
        for step in self.stages.values().flatten() {
            let reference = step.common.image.reference();
            if seen.contains(&reference) {
                continue;
            }
            probe.check(&step.common.image).await?;
            seen.push(reference);
        }
        Ok(())
    }
}

fn default_port() -> i32 {
    5000
}
fn default_cpu_request() -> f64 {
    0.5
}
fn default_memory_request() -> u32 {
    500
}
fn default_replicas() -> i32 {
    2
}
fn default_revision_history_limit() -> i32 {
    2
}
fn default_timeout() -> u64 {
    30
}
fn default_polling_time() -> u64 {
    1
}
fn default_wait_before_start_time() -> u64 {
    5
}
fn default_min_ready_seconds() -> i32 {
    5
}

#[derive(Debug, Deserialize)]
struct RawStep {
    step_name: String,
    path_to_executable: String,
    dependency_path: String,
    image: Option<String>,
    command: Option<Vec<String>>,
    envs: Option<IndexMap<String, String>>,
    #[serde(default)]
    secrets: Vec<String>,
    #[serde(default = "default_cpu_request")]
    cpu_request: f64,
    #[serde(default = "default_memory_request")]
    memory_request: u32,
    #[serde(default = "default_replicas")]
    replicas: i32,
    #[serde(default)]
    backoff_limit: i32,
    #[serde(default = "default_revision_history_limit")]
    revision_history_limit: i32,
    #[serde(default = "default_timeout")]
    timeout: u64,
    #[serde(default = "default_polling_time")]
    polling_time: u64,
    #[serde(default = "default_wait_before_start_time")]
    wait_before_start_time: u64,
    #[serde(default = "default_min_ready_seconds")]
    min_ready_seconds: i32,
    service: Option<ServicePortSpec>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    version: Option<String>,
    name: Option<String>,
    schedule: Option<String>,
    stages: IndexMap<String, Vec<RawStep>>,
}

/// Parse and validate a configuration document.
pub fn parse_config(raw: &[u8]) -> Result<PipelineConfig, Error> {
    let raw: RawConfig = serde_yaml::from_slice(raw)
        .map_err(|e| Error::Value(format!("invalid configuration file: {e}")))?;

    if let Some(schedule) = &raw.schedule {
        validate_schedule(schedule)?;
    }

    let mut stages = IndexMap::with_capacity(raw.stages.len());
    for (stage_name, raw_steps) in raw.stages {
        let steps = raw_steps
            .into_iter()
            .map(validate_step)
            .collect::<Result<Vec<_>, _>>()?;
        stages.insert(fix_resource_name(&stage_name), steps);
    }

    Ok(PipelineConfig {
        version: raw.version.unwrap_or_else(|| defaults::VERSION.to_string()),
        name: raw.name.as_deref().map(fix_resource_name),
        schedule: raw.schedule,
        stages,
    })
}

fn positive<T: PartialOrd + Default + fmt::Display>(
    value: T,
    what: &str,
) -> Result<T, Error> {
    if value > T::default() {
        Ok(value)
    } else {
        Err(Error::Value(format!("{what} must be greater than 0, got {value}")))
    }
}

fn non_negative(value: i32, what: &str) -> Result<i32, Error> {
    if value >= 0 {
        Ok(value)
    } else {
        Err(Error::Value(format!("{what} must not be negative, got {value}")))
    }
}

fn validate_step(raw: RawStep) -> Result<Step, Error> {
    if !EXECUTABLE_PATH.is_match(&raw.path_to_executable) {
        return Err(Error::UnsupportedFile(format!(
            "incorrect path in configuration file: {}; files must have a py or ipynb extension",
            raw.path_to_executable
        )));
    }
    if !DEPENDENCY_PATH.is_match(&raw.dependency_path) {
        return Err(Error::UnsupportedFile(format!(
            "incorrect path in configuration file: {}; only the txt extension is supported",
            raw.dependency_path
        )));
    }

    let image = match &raw.image {
        Some(image) => ImageRef::parse(image)?,
        None => ImageRef::parse(&defaults::client_image())?,
    };

    let common = StepCommon {
        name: fix_resource_name(&raw.step_name),
        executable: raw.path_to_executable,
        dependency: raw.dependency_path,
        image,
        command: raw.command,
        envs: raw.envs.unwrap_or_default(),
        secrets: raw.secrets.iter().map(|s| fix_resource_name(s)).collect(),
        cpu_request: positive(raw.cpu_request, "cpu_request")?,
        memory_request_mib: positive(raw.memory_request, "memory_request")?,
        backoff_limit: non_negative(raw.backoff_limit, "backoff_limit")?,
        timeout: Duration::from_secs(positive(raw.timeout, "timeout")?),
        polling_interval: Duration::from_secs(positive(raw.polling_time, "polling_time")?),
        warm_up: Duration::from_secs(positive(
            raw.wait_before_start_time,
            "wait_before_start_time",
        )?),
    };

    let kind = match raw.service {
        Some(service) => StepKind::Service(ServiceStep {
            replicas: positive(raw.replicas, "replicas")?,
            revision_history_limit: non_negative(
                raw.revision_history_limit,
                "revision_history_limit",
            )?,
            min_ready_seconds: positive(raw.min_ready_seconds, "min_ready_seconds")?,
            service,
        }),
        None => StepKind::Batch,
    };

    Ok(Step { common, kind })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
