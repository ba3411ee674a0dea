// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Label contract shared by every object automl owns.
//!
//! No tracking state is persisted outside the platform: these labels are
//! the sole means of discovering owned objects, so every selector the code
//! emits must include `app=automl`.

use std::collections::BTreeMap;
use std::fmt;

/// Value of the `app` label on every owned object.
pub const APP: &str = "automl";

pub const APP_LABEL: &str = "app";
pub const PIPELINE_LABEL: &str = "pipeline";
pub const STAGE_LABEL: &str = "stage";
pub const STEP_LABEL: &str = "step";
pub const KIND_LABEL: &str = "kind";
pub const BRANCH_LABEL: &str = "branch";

/// `kind` label value carried by driver objects.
pub const RUNNER_KIND: &str = "runner";

/// Labels for pipeline-owned objects that belong to no particular step.
pub fn pipeline_labels(pipeline: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (APP_LABEL.to_string(), APP.to_string()),
        (PIPELINE_LABEL.to_string(), pipeline.to_string()),
    ])
}

/// Labels for a driver object.
pub fn runner_labels(pipeline: &str) -> BTreeMap<String, String> {
    let mut labels = pipeline_labels(pipeline);
    labels.insert(KIND_LABEL.to_string(), RUNNER_KIND.to_string());
    labels
}

/// Full label tuple carried by every step-owned object.
pub fn step_labels(pipeline: &str, stage: &str, step: &str) -> BTreeMap<String, String> {
    let mut labels = pipeline_labels(pipeline);
    labels.insert(STAGE_LABEL.to_string(), stage.to_string());
    labels.insert(STEP_LABEL.to_string(), step.to_string());
    labels
}

/// Builder for the label selector strings handed to list operations.
///
/// Always composes `app=automl` first; the remaining terms are optional.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    pipeline: Option<String>,
    stage: Option<String>,
    step: Option<String>,
    runner: bool,
}

impl Selector {
    /// Select every automl-owned object.
    pub fn all() -> Self {
        Self::default()
    }

    /// Select objects of one pipeline.
    pub fn pipeline(name: &str) -> Self {
        Self {
            pipeline: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Narrow to one stage.
    pub fn stage(mut self, stage: &str) -> Self {
        self.stage = Some(stage.to_string());
        self
    }

    /// Narrow to one step.
    pub fn step(mut self, step: &str) -> Self {
        self.step = Some(step.to_string());
        self
    }

    /// Narrow to driver objects (`kind=runner`).
    pub fn runner(mut self) -> Self {
        self.runner = true;
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{APP_LABEL}={APP}")?;
        if let Some(pipeline) = &self.pipeline {
            write!(f, ",{PIPELINE_LABEL}={pipeline}")?;
        }
        if let Some(stage) = &self.stage {
            write!(f, ",{STAGE_LABEL}={stage}")?;
        }
        if let Some(step) = &self.step {
            write!(f, ",{STEP_LABEL}={step}")?;
        }
        if self.runner {
            write!(f, ",{KIND_LABEL}={RUNNER_KIND}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod tests;
