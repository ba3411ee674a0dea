// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single outer error boundary.
//!
//! Every command handler returns the taxonomy error; this is the one place
//! that turns it into an operator-facing log line. Domain failures print
//! their message alone, platform problems include endpoint details, and
//! anything unclassified is truncated rather than dumped.

use automl_core::Error;

const UNEXPECTED_DETAIL_LIMIT: usize = 400;

fn truncated(detail: &str) -> &str {
    match detail.char_indices().nth(UNEXPECTED_DETAIL_LIMIT) {
        Some((at, _)) => &detail[..at],
        None => detail,
    }
}

/// Map an error to its operator-facing log line.
pub fn report(err: &Error) {
    match err {
        Error::Auth {
            in_cluster: true,
            message,
        } => {
            tracing::error!("cannot find credentials for authorization in a driver: {message}");
        }
        Error::Auth {
            in_cluster: false,
            message,
        } => {
            tracing::error!(
                "cannot find a token from the kubeconfig file for authorization: {message}"
            );
        }
        Error::Platform { code, message } => {
            tracing::error!("Kubernetes API error (code {code}): {message}");
        }
        Error::Transport(detail) => {
            tracing::error!("cannot connect to the Kubernetes API: {detail}");
        }
        Error::Unexpected(detail) => {
            tracing::error!("unexpected error has occurred: {}", truncated(detail));
        }
        domain => {
            tracing::error!("{domain}");
        }
    }
}

#[cfg(test)]
#[path = "boundary_tests.rs"]
mod tests;
