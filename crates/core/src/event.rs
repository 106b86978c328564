// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published onto the notification bus (§4.7, §4.8).
//!
//! `SupervisorEvent` is the shared vocabulary between the Scheduler (the
//! producer) and any `Notifier` (the consumer); it carries only what a
//! notification needs to render, not the full row/process state.

use crate::id::RowId;
use serde::{Deserialize, Serialize};

/// A notable transition in a row's lifecycle, published for the benefit of
/// desktop notifications and tests. Never blocks the control loop: publishing
/// onto a full or subscriber-less channel is a no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisorEvent {
    /// A training process was spawned for `row_id`.
    Started { row_id: RowId, pid: u32 },
    /// The process for `row_id` exited successfully (§4.2, `TrainingCheck = Done`).
    Completed { row_id: RowId, weight_file: String },
    /// The process for `row_id` exited with a failure or was lost (`TrainingCheck = Crash`).
    Crashed { row_id: RowId, reason: String },
    /// Spawning the process for `row_id` never happened.
    SpawnFailed { row_id: RowId, reason: String },
    /// A Table Store rewrite failed; `row_id` is the row being updated when it happened.
    TableWriteFailed { row_id: RowId, reason: String },
}

impl SupervisorEvent {
    pub fn row_id(&self) -> &RowId {
        match self {
            SupervisorEvent::Started { row_id, .. }
            | SupervisorEvent::Completed { row_id, .. }
            | SupervisorEvent::Crashed { row_id, .. }
            | SupervisorEvent::SpawnFailed { row_id, .. }
            | SupervisorEvent::TableWriteFailed { row_id, .. } => row_id,
        }
    }

    /// Render as a `(title, message)` pair for a `Notifier` (§4.8).
    pub fn as_notification(&self) -> (String, String) {
        match self {
            SupervisorEvent::Started { row_id, pid } => (
                format!("Training started: {row_id}"),
                format!("pid {pid}"),
            ),
            SupervisorEvent::Completed { row_id, weight_file } => (
                format!("Training complete: {row_id}"),
                format!("weights: {weight_file}"),
            ),
            SupervisorEvent::Crashed { row_id, reason } => {
                (format!("Training crashed: {row_id}"), reason.clone())
            }
            SupervisorEvent::SpawnFailed { row_id, reason } => {
                (format!("Failed to start: {row_id}"), reason.clone())
            }
            SupervisorEvent::TableWriteFailed { row_id, reason } => (
                format!("Table write failed: {row_id}"),
                reason.clone(),
            ),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
