// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn all_selects_only_app() {
    assert_eq!(Selector::all().to_string(), "app=automl");
}

#[test]
fn pipeline_selector() {
    assert_eq!(
        Selector::pipeline("demo").to_string(),
        "app=automl,pipeline=demo"
    );
}

#[test]
fn stage_and_step_compose_in_order() {
    assert_eq!(
        Selector::pipeline("demo").stage("train").step("fit").to_string(),
        "app=automl,pipeline=demo,stage=train,step=fit"
    );
}

#[test]
fn runner_selector_appends_kind() {
    assert_eq!(
        Selector::pipeline("demo").runner().to_string(),
        "app=automl,pipeline=demo,kind=runner"
    );
}

#[test]
fn step_labels_carry_full_tuple() {
    let labels = step_labels("demo", "train", "fit");
    assert_eq!(labels[APP_LABEL], APP);
    assert_eq!(labels[PIPELINE_LABEL], "demo");
    assert_eq!(labels[STAGE_LABEL], "train");
    assert_eq!(labels[STEP_LABEL], "fit");
}

#[test]
fn runner_labels_carry_kind() {
    let labels = runner_labels("demo");
    assert_eq!(labels[KIND_LABEL], RUNNER_KIND);
    assert_eq!(labels[PIPELINE_LABEL], "demo");
}
