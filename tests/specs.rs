//! Behavioral specifications for the `tms` supervisor binary.
//!
//! These tests are black-box: they invoke the compiled binary against a
//! scratch table/config and verify the resulting table contents and exit
//! codes, per §8.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/config.rs"]
mod config;

#[path = "specs/admission.rs"]
mod admission;
