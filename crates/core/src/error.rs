// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Every crate in this workspace defines its own error enum; the Scheduler
//! converts all of them into the seven failure classifications of the
//! error-handling design (config / row-data / spawn / crash / tracker /
//! table-rewrite / capture-worker). [`ConfigError`] covers the first.

use thiserror::Error;

/// Fatal configuration-time errors (§7: "Configuration error").
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(std::path::PathBuf),
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: std::path::PathBuf, message: String },
    #[error("invalid value for {section}.{key}: {value}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
