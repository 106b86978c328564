// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process Supervisor error taxonomy (§4.3).

use thiserror::Error;
use tms_core::RowId;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("a process is already running for {0}")]
    AlreadyRunning(RowId),
    #[error("no process record for {0}")]
    UnknownRow(RowId),
    #[error("process for {row_id} exited immediately (code {code:?}): {stderr}")]
    SpawnFailed {
        row_id: RowId,
        code: Option<i32>,
        stderr: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
