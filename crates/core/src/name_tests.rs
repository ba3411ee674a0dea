// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    lowercased = { "MyPipeline", "mypipeline" },
    spaces = { "my pipeline", "my-pipeline" },
    underscores = { "my_step_name", "my-step-name" },
    runs_collapsed = { "a__ b", "a-b" },
    dots_kept = { "model.v2", "model.v2" },
    trimmed = { "  -edge-  ", "edge" },
    empty = { "!!!", "" },
)]
fn fixes_names(input: &str, expected: &str) {
    assert_eq!(fix_resource_name(input), expected);
}

#[parameterized(
    plain = { "demo" },
    mixed = { "My Demo_Pipeline.v1" },
    hostile = { "--a!!b--" },
)]
fn fix_is_idempotent(input: &str) {
    let once = fix_resource_name(input);
    assert_eq!(fix_resource_name(&once), once);
}

#[test]
fn resource_name_joins_parts() {
    assert_eq!(resource_name("demo", "train", "fit"), "demo-train-fit");
}

#[test]
fn job_name_appends_six_hex_chars() {
    let name = job_name("demo", "train", "fit");
    let suffix = name.strip_prefix("demo-train-fit-").unwrap();
    assert_eq!(suffix.len(), 6);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn job_names_are_distinct_across_runs() {
    assert_ne!(job_name("p", "s", "x"), job_name("p", "s", "x"));
}

#[test]
fn repo_secret_name_is_prefixed() {
    assert_eq!(repo_secret_name("demo"), "repo-demo");
}
