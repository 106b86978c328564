// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The experiment row and its per-row state machine.

use crate::id::RowId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-row training state. Transitions only along `Empty -> Training -> (Done | Crash)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingCheck {
    Empty,
    Training,
    Done,
    Crash,
}

impl TrainingCheck {
    /// Parse the raw cell value from the table file.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" => TrainingCheck::Empty,
            "Training" => TrainingCheck::Training,
            "Done" => TrainingCheck::Done,
            "Crash" => TrainingCheck::Crash,
            other => {
                tracing::warn!(value = other, "unrecognized TrainingCheck value, treating as empty");
                TrainingCheck::Empty
            }
        }
    }

    /// Render back to the cell value written to the table file.
    pub fn as_cell(&self) -> &'static str {
        match self {
            TrainingCheck::Empty => "",
            TrainingCheck::Training => "Training",
            TrainingCheck::Done => "Done",
            TrainingCheck::Crash => "Crash",
        }
    }

    /// True once the row has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainingCheck::Done | TrainingCheck::Crash)
    }

    /// Whether `self -> next` is a legal transition (invariant 1 in the data model).
    pub fn can_transition_to(&self, next: TrainingCheck) -> bool {
        matches!(
            (self, next),
            (TrainingCheck::Empty, TrainingCheck::Training)
                | (TrainingCheck::Training, TrainingCheck::Done)
                | (TrainingCheck::Training, TrainingCheck::Crash)
        )
    }
}

impl fmt::Display for TrainingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cell())
    }
}

/// One experiment row, as loaded from the table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentRow {
    pub id: RowId,
    pub name: String,
    pub training_command: String,
    pub training_check: TrainingCheck,
    pub wandb_run_id: String,
    pub weight_file: String,
    pub gpu_id: Option<String>,
    pub pretrained_model_id: Option<String>,
    /// Columns not recognized by this schema, preserved verbatim on rewrite.
    #[serde(default)]
    pub extra: indexmap::IndexMap<String, String>,
}

impl ExperimentRow {
    /// A fresh row with only the required fields set; used by tests and the
    /// `--create_config` style scaffolding commands.
    pub fn new(id: impl Into<String>, name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: RowId::new(id),
            name: name.into(),
            training_command: command.into(),
            training_check: TrainingCheck::Empty,
            wandb_run_id: String::new(),
            weight_file: String::new(),
            gpu_id: None,
            pretrained_model_id: None,
            extra: indexmap::IndexMap::new(),
        }
    }
}

/// Outcome of inspecting a row's `PretrainedModelId` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PretrainedRef {
    /// No dependency declared.
    None,
    /// References `id`, not yet known to be unresolvable.
    Pending(String),
    /// A previous tick already found the directory missing; `id` is the
    /// original (non-negated) reference so the Scheduler can still log it.
    Unresolved(String),
}

/// Parse the `PretrainedModelId` cell into a [`PretrainedRef`].
///
/// A cell is considered a negation sentinel (see §4.5) if it starts with `-`
/// or `!`: the original marks unresolved numeric IDs as `-abs(id)`; since row
/// IDs here are arbitrary strings, a non-numeric ID is marked by a leading
/// `!` instead. Either sentinel is recognized on read.
pub fn parse_pretrained_ref(cell: Option<&str>) -> PretrainedRef {
    match cell.map(str::trim) {
        None => PretrainedRef::None,
        Some("") => PretrainedRef::None,
        Some(raw) if raw.starts_with('-') || raw.starts_with('!') => {
            PretrainedRef::Unresolved(raw.trim_start_matches(['-', '!']).to_string())
        }
        Some(raw) => PretrainedRef::Pending(raw.to_string()),
    }
}

/// Compute the sentinel value to write back when a pretrained directory
/// could not be found, so later ticks skip the lookup (§4.5 step 3).
///
/// Deliberate deviation: for a non-numeric `id`, the original leaves the
/// cell untouched and only logs the miss, so it re-searches every tick. The
/// `!id` sentinel here is written instead, to honor the spec's intent of
/// skipping a known-missing directory on later ticks for non-numeric ids too.
pub fn negate_pretrained_id(id: &str) -> String {
    match id.parse::<i64>() {
        Ok(n) => (-n.abs()).to_string(),
        Err(_) => format!("!{id}"),
    }
}

#[cfg(test)]
#[path = "row_tests.rs"]
mod tests;
