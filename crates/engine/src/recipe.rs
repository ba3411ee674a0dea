// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container assembly for step objects.
//!
//! Steps on the stock client image run a fixed shell recipe that clones the
//! repository, installs dependencies and executes the module. Steps on an
//! overridden image skip the recipe entirely and take `command` verbatim as
//! the container arguments; image choice and argument handling are coupled
//! on purpose.

use crate::PipelineContext;
use automl_core::config::StepCommon;
use automl_core::defaults;
use k8s_openapi::api::core::v1::{Container, EnvFromSource, EnvVar, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Build the container for a step.
pub fn step_container(
    common: &StepCommon,
    ctx: &PipelineContext,
    env_from: Vec<EnvFromSource>,
) -> Container {
    let resources = ResourceRequirements {
        requests: Some(BTreeMap::from([
            ("cpu".to_string(), Quantity(common.cpu_request.to_string())),
            (
                "memory".to_string(),
                Quantity(format!("{}M", common.memory_request_mib)),
            ),
        ])),
        ..ResourceRequirements::default()
    };

    let env = if common.envs.is_empty() {
        None
    } else {
        Some(
            common
                .envs
                .iter()
                .map(|(name, value)| EnvVar {
                    name: name.clone(),
                    value: Some(value.clone()),
                    ..EnvVar::default()
                })
                .collect(),
        )
    };

    let (command, args) = if common.image.is_default_client() {
        let base = format!(
            "git clone $(echo $REPO_URL) && cd {} && git checkout {} && \
             python -m pip install -r {} && ",
            ctx.project_dir, ctx.branch, common.dependency
        );
        let custom = match &common.command {
            Some(command) => command.join(" "),
            None => format!("python {}", common.executable),
        };
        (
            Some(vec!["/bin/sh".to_string(), "-c".to_string()]),
            Some(vec![base + &custom]),
        )
    } else {
        (None, common.command.clone())
    };

    Container {
        name: defaults::CONTAINER_NAME.to_string(),
        image: Some(common.image.reference()),
        image_pull_policy: Some("Always".to_string()),
        resources: Some(resources),
        env,
        env_from: Some(env_from),
        command,
        args,
        ..Container::default()
    }
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
