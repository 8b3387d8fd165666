// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Error type shared by the cortex layers.
//!
//! Only write-side failures surface as errors. Malformed log lines and
//! malformed documents are skipped by the readers and never reach callers.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CortexError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("Store at {0} is locked by another pass")]
    Locked(PathBuf),
}

impl CortexError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CortexError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CortexError>;
