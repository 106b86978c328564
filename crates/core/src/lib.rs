// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tms-core: domain model shared by every crate in this workspace — the
//! experiment row and its state machine, the typed configuration record, the
//! GPU Assigner, and the notification-bus event vocabulary.

pub mod config;
pub mod error;
pub mod event;
pub mod gpu;
pub mod id;
pub mod row;

pub use config::{Config, EnvironmentConfig, GpuConfig, NotificationConfig, TrackerConfig};
pub use error::ConfigError;
pub use event::SupervisorEvent;
pub use gpu::{assign_gpu, GpuAssignment, SlotCounter};
pub use id::RowId;
pub use row::{negate_pretrained_id, parse_pretrained_ref, ExperimentRow, PretrainedRef, TrainingCheck};
