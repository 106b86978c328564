// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tms-tracker: the Tracker Adapter (§4.2) — a read-only view onto a remote
//! experiment tracker, used by the Scheduler to decide whether a running
//! process should be considered finished or crashed.

pub mod fake;
pub mod wandb;

use async_trait::async_trait;

/// Coarse run state as observed by a tracker. `Crashed` covers both the
/// tracker's own crash classification and any failure classification; a
/// caller never needs to distinguish them (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    Running,
    Finished,
    Crashed,
    #[default]
    Unknown,
}

/// Read-only capability the Scheduler needs from a remote experiment
/// tracker. Every method must tolerate transient errors by returning
/// `Unknown`/`None` rather than propagating, so reconciliation stays live.
#[async_trait]
pub trait Tracker: Send + Sync {
    async fn state_of(&self, run_id: &str) -> RunState;
    async fn display_name_of(&self, run_id: &str) -> Option<String>;
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
