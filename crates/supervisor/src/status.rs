// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The serialisable process status snapshot (§4.3.4).

use std::time::Duration;
use tms_core::{GpuAssignment, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    /// Exited after being observed running (successful or not).
    Exited,
    /// `stop()` was called; reconciliation treats this as a crash (§4.3.3).
    Stopped,
    /// Exited within the grace period at spawn time (§4.3.1 step 7).
    SpawnError,
}

/// A point-in-time view of a [`ProcessRecord`](crate::record::ProcessRecord),
/// minus the non-serialisable OS handle.
#[derive(Debug, Clone)]
pub struct ProcessStatus {
    pub row_id: RowId,
    pub pid: u32,
    pub gpu_assignment: GpuAssignment,
    pub slot: usize,
    pub state: ProcessState,
    pub runtime: Duration,
    pub return_code: Option<i32>,
    pub run_id: Option<String>,
    pub run_name: Option<String>,
}
