// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table Store error taxonomy (§4.1).

use thiserror::Error;
use tms_core::RowId;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table file not found: {0}")]
    NotFound(std::path::PathBuf),
    #[error("table file has no header row")]
    MissingHeader,
    #[error("table file is missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("no row with id {0}")]
    UnknownRow(RowId),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
