// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake tracker adapter for testing.

use crate::{RunState, Tracker};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct RunFixture {
    state: RunState,
    name: Option<String>,
}

struct FakeTrackerState {
    runs: HashMap<String, RunFixture>,
}

/// In-memory [`Tracker`] whose run states are set directly by tests.
/// Unknown run ids report `Unknown`/`None`, matching the real adapter's
/// behavior for a run it cannot look up.
#[derive(Clone)]
pub struct FakeTracker {
    inner: Arc<Mutex<FakeTrackerState>>,
}

impl Default for FakeTracker {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeTrackerState {
                runs: HashMap::new(),
            })),
        }
    }
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&self, run_id: impl Into<String>, state: RunState) {
        let mut guard = self.inner.lock();
        guard.runs.entry(run_id.into()).or_default().state = state;
    }

    pub fn set_name(&self, run_id: impl Into<String>, name: impl Into<String>) {
        let mut guard = self.inner.lock();
        guard.runs.entry(run_id.into()).or_default().name = Some(name.into());
    }
}

#[async_trait]
impl Tracker for FakeTracker {
    async fn state_of(&self, run_id: &str) -> RunState {
        self.inner
            .lock()
            .runs
            .get(run_id)
            .map(|r| r.state)
            .unwrap_or(RunState::Unknown)
    }

    async fn display_name_of(&self, run_id: &str) -> Option<String> {
        self.inner.lock().runs.get(run_id).and_then(|r| r.name.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
