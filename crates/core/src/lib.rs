// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! automl-core: names, labels, configuration model and error taxonomy
//! shared by every automl crate.

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod labels;
pub mod name;
pub mod schedule;

pub use config::{
    parse_config, ImageProbe, ImageRef, PipelineConfig, ServicePortSpec, ServiceStep, Step,
    StepCommon, StepKind,
};
pub use error::Error;
pub use git::GitUrl;
pub use labels::Selector;
pub use name::{fix_resource_name, job_name, repo_secret_name, resource_name};
pub use schedule::validate_schedule;
