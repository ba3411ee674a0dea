// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic derivation of platform object names.

use uuid::Uuid;

/// Make a string usable as a platform resource name (RFC 1123).
///
/// Lowercases, replaces any run of characters outside `[a-z0-9.]` with a
/// single hyphen, and strips leading/trailing hyphens. Idempotent.
pub fn fix_resource_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let mut fixed = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '.' {
            fixed.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            fixed.push('-');
            last_was_hyphen = true;
        }
    }
    fixed.trim_matches('-').to_string()
}

/// Name of the deployment/service/ingress owned by a service step.
pub fn resource_name(pipeline: &str, stage: &str, step: &str) -> String {
    format!("{pipeline}-{stage}-{step}")
}

/// Name of a batch step job; a fresh hex nonce keeps re-runs distinct.
pub fn job_name(pipeline: &str, stage: &str, step: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{pipeline}-{stage}-{step}-{}", &nonce[..6])
}

/// Name of the per-pipeline secret holding `REPO_URL`/`CONFIG_URL`.
pub fn repo_secret_name(pipeline: &str) -> String {
    format!("repo-{pipeline}")
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
