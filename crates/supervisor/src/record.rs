// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory process record (§3 "Process record", §4.3.4).

use parking_lot::Mutex;
use std::path::PathBuf;
use std::time::Instant;
use tms_core::{GpuAssignment, RowId};

/// Fields discovered from the process's own output, written at most once
/// each (§4.3.2: "Discoveries are recorded once and never overwritten").
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub run_id: Option<String>,
    pub run_name: Option<String>,
}

impl Discovered {
    pub fn set_run_id_once(&mut self, run_id: String) {
        if self.run_id.is_none() {
            self.run_id = Some(run_id);
        }
    }

    pub fn set_run_name_once(&mut self, run_name: String) {
        if self.run_name.is_none() {
            self.run_name = Some(run_name);
        }
    }
}

/// Everything about a spawned process that outlives the spawn call and is
/// shared between the supervisor, the capture workers, and snapshot reads.
pub struct ProcessRecord {
    pub row_id: RowId,
    pub pid: u32,
    pub command: String,
    pub full_command: String,
    pub gpu_assignment: GpuAssignment,
    pub slot: usize,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    pub start: Instant,
    pub discovered: Mutex<Discovered>,
    pub log_terminal_opened: Mutex<bool>,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
