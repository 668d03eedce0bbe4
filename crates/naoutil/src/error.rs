// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every naoutil module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by naoutil operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Cannot resolve '{host}': {reason}")]
    Resolve { host: String, reason: String },

    #[error("Middleware error: {0}")]
    Middleware(String),

    #[error("Unknown capability '{0}'")]
    UnknownCapability(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A property file could not be parsed.
    #[error("{}:{line}: {reason}", path.display())]
    PropertyFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("JSON object class mismatch: expected {expected}, found {found}")]
    ClassMismatch { expected: String, found: String },
}

/// Convenient alias for results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
