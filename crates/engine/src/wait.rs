// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic bounded readiness poll.
//!
//! Sleep the warm-up, then sample every target each interval until none is
//! pending. Past the deadline the composed timeout message carries each
//! unfinished target's logs. Timing goes through `tokio::time`, so tests
//! run under paused time.

use async_trait::async_trait;
use automl_core::Error;
use std::time::Duration;
use tokio::time::Instant;

/// One observation of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// Not terminal yet; keep polling.
    Pending,
    /// Reached the target predicate.
    Reached,
    /// Terminal without reaching the target (batch failure).
    Halted,
}

/// Stage-wide wait parameters, aggregated from the step configs.
#[derive(Debug, Clone, Copy)]
pub struct WaitParams {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub warm_up: Duration,
}

/// An observable resource the waiter polls.
#[async_trait]
pub trait WaitTarget: Send + Sync {
    /// Display name used in timeout and failure messages.
    fn describe(&self) -> String;
    /// Sample the current state.
    async fn probe(&self) -> Result<Observed, Error>;
    /// Best-effort log retrieval for failure messages.
    async fn logs(&self) -> Option<String>;
}

/// Compose the per-target failure message with logs.
pub async fn failure_report(targets: &[&dyn WaitTarget]) -> String {
    let mut lines = Vec::with_capacity(targets.len());
    for target in targets {
        let logs = target
            .logs()
            .await
            .unwrap_or_else(|| "<logs not available>".to_string());
        lines.push(format!("\n{}\nLogs:\n{logs}", target.describe()));
    }
    lines.join("\n")
}

/// Wait until no target is pending, or fail with the deadline report.
///
/// Returns the final observation per target in input order; the caller
/// decides what a halted target means.
pub async fn wait_for_all(
    targets: &[Box<dyn WaitTarget + '_>],
    params: WaitParams,
) -> Result<Vec<Observed>, Error> {
    tokio::time::sleep(params.warm_up).await;
    let start = Instant::now();

    let mut observed = probe_all(targets).await?;
    while observed.contains(&Observed::Pending) {
        if start.elapsed() >= params.timeout {
            let unfinished: Vec<&dyn WaitTarget> = targets
                .iter()
                .zip(&observed)
                .filter(|(_, state)| **state != Observed::Reached)
                .map(|(target, _)| target.as_ref())
                .collect();
            return Err(Error::Timeout(failure_report(&unfinished).await));
        }
        tokio::time::sleep(params.poll_interval).await;
        observed = probe_all(targets).await?;
    }
    Ok(observed)
}

async fn probe_all(targets: &[Box<dyn WaitTarget + '_>]) -> Result<Vec<Observed>, Error> {
    let mut observed = Vec::with_capacity(targets.len());
    for target in targets {
        observed.push(target.probe().await?);
    }
    Ok(observed)
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
