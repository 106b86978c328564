// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tms-supervisor: the Process Supervisor (§4.3) — owns spawned training
//! processes end to end, from effective-command composition through
//! character-by-character stream capture to termination and cleanup.

pub mod capture;
pub mod command;
pub mod error;
pub mod record;
pub mod status;
pub mod supervisor;

pub use command::{ExtraArg, EnvPrefixes};
pub use error::SupervisorError;
pub use record::ProcessRecord;
pub use status::{ProcessState, ProcessStatus};
pub use supervisor::{ProcessSupervisor, SpawnRequest};
