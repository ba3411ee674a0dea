// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted target: reports each state in order, repeating the last.
struct Scripted {
    name: String,
    states: Vec<Observed>,
    cursor: AtomicUsize,
    log: Option<String>,
}

impl Scripted {
    fn new(name: &str, states: Vec<Observed>) -> Self {
        Self {
            name: name.to_string(),
            states,
            cursor: AtomicUsize::new(0),
            log: Some(format!("log of {name}")),
        }
    }
}

#[async_trait]
impl WaitTarget for Scripted {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn probe(&self) -> Result<Observed, Error> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        Ok(*self.states.get(i).unwrap_or_else(|| {
            self.states.last().unwrap_or(&Observed::Reached)
        }))
    }

    async fn logs(&self) -> Option<String> {
        self.log.clone()
    }
}

fn params(timeout: u64, poll: u64, warm_up: u64) -> WaitParams {
    WaitParams {
        timeout: Duration::from_secs(timeout),
        poll_interval: Duration::from_secs(poll),
        warm_up: Duration::from_secs(warm_up),
    }
}

fn boxed(targets: Vec<Scripted>) -> Vec<Box<dyn WaitTarget>> {
    targets
        .into_iter()
        .map(|t| Box::new(t) as Box<dyn WaitTarget>)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn returns_when_all_reached() {
    let targets = boxed(vec![
        Scripted::new("a", vec![Observed::Pending, Observed::Reached]),
        Scripted::new("b", vec![Observed::Reached]),
    ]);
    let observed = wait_for_all(&targets, params(30, 1, 5)).await.unwrap();
    assert_eq!(observed, vec![Observed::Reached, Observed::Reached]);
}

#[tokio::test(start_paused = true)]
async fn halted_targets_end_the_wait_without_timeout() {
    let targets = boxed(vec![
        Scripted::new("a", vec![Observed::Pending, Observed::Halted]),
        Scripted::new("b", vec![Observed::Reached]),
    ]);
    let observed = wait_for_all(&targets, params(30, 1, 5)).await.unwrap();
    assert_eq!(observed[0], Observed::Halted);
}

#[tokio::test(start_paused = true)]
async fn timeout_reports_unfinished_targets_with_logs() {
    let targets = boxed(vec![
        Scripted::new("stuck", vec![Observed::Pending]),
        Scripted::new("done", vec![Observed::Reached]),
    ]);
    let err = wait_for_all(&targets, params(3, 1, 5)).await.unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, Error::Timeout(_)));
    assert!(message.contains("stuck"));
    assert!(message.contains("log of stuck"));
    assert!(!message.contains("log of done"));
}

#[tokio::test(start_paused = true)]
async fn deadline_starts_after_warm_up() {
    // Warm-up takes 100s but the 3s deadline only starts counting after it.
    let targets = boxed(vec![Scripted::new(
        "slow",
        vec![Observed::Pending, Observed::Pending, Observed::Reached],
    )]);
    let observed = wait_for_all(&targets, params(30, 1, 100)).await.unwrap();
    assert_eq!(observed, vec![Observed::Reached]);
}

#[tokio::test(start_paused = true)]
async fn probe_errors_propagate() {
    struct Broken;
    #[async_trait]
    impl WaitTarget for Broken {
        fn describe(&self) -> String {
            "broken".to_string()
        }
        async fn probe(&self) -> Result<Observed, Error> {
            Err(Error::Platform {
                code: 500,
                message: "boom".to_string(),
            })
        }
        async fn logs(&self) -> Option<String> {
            None
        }
    }
    let targets: Vec<Box<dyn WaitTarget>> = vec![Box::new(Broken)];
    let err = wait_for_all(&targets, params(3, 1, 1)).await.unwrap_err();
    assert!(matches!(err, Error::Platform { .. }));
}
