// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for automl.
//!
//! One enum covers every failure the outer boundary has to report, so the
//! CLI can pattern-match a single type instead of juggling error chains.

use thiserror::Error;

/// Errors that can occur anywhere in automl.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value or cron schedule.
    #[error("{0}")]
    Value(String),

    /// A step path carries an unsupported file extension.
    #[error("{0}")]
    UnsupportedFile(String),

    /// Unparseable or unsupported git remote URL.
    #[error("{0}")]
    Git(String),

    /// A readiness wait exceeded its deadline.
    #[error("{0}")]
    Timeout(String),

    /// Expected domain failure that ends the pipeline: duplicate pipeline,
    /// missing pipeline, missing secret, failed batch step.
    #[error("{0}")]
    Stop(String),

    /// The platform API answered with a structured error.
    #[error("platform API error (code {code}): {message}")]
    Platform { code: u16, message: String },

    /// The platform API endpoint cannot be reached.
    #[error("cannot connect to platform API: {0}")]
    Transport(String),

    /// Missing or invalid platform credentials.
    #[error("cannot load platform credentials: {message}")]
    Auth { in_cluster: bool, message: String },

    /// The image registry or git host returned a non-success response.
    #[error("{0}")]
    Http(String),

    /// Everything else.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Short label used in boundary log lines and tests.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Error::Value(_) => "value",
            Error::UnsupportedFile(_) => "file",
            Error::Git(_) => "git",
            Error::Timeout(_) => "timeout",
            Error::Stop(_) => "stop",
            Error::Platform { .. } => "platform",
            Error::Transport(_) => "transport",
            Error::Auth { .. } => "auth",
            Error::Http(_) => "http",
            Error::Unexpected(_) => "unexpected",
        }
    }
}
