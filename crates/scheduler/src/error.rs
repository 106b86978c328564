// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler-level error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("table store error: {0}")]
    Table(#[from] tms_table::TableError),
}
