//! §4.6 admission and §8 scenario 1 boundary conditions that don't require a
//! live remote tracker.

use crate::prelude::{tms, Workspace};

#[test]
fn empty_training_command_is_skipped_and_table_drains() {
    let ws = Workspace::new();
    ws.write_table("exp1,Empty Command,,,,,,\n");

    tms()
        .arg("--csv")
        .arg(ws.path().join("table.csv"))
        .arg("--check_interval")
        .arg("1")
        .assert()
        .success();

    let table = ws.read_table();
    assert!(table.contains("exp1"));
    // Skipped rows never transition out of the empty state.
    assert!(!table.contains(",Training,") && !table.contains(",Done,") && !table.contains(",Crash,"));
}

#[test]
fn missing_table_file_is_a_fatal_configuration_error() {
    let ws = Workspace::new();

    tms()
        .arg("--csv")
        .arg(ws.path().join("does-not-exist.csv"))
        .assert()
        .failure()
        .code(1);
}

#[test]
fn crashing_command_is_reflected_as_crash_without_a_wandb_run_id() {
    let ws = Workspace::new();
    // A command with no wandb integration never populates WandbRunID; once
    // its process exits, reconciliation has no run id to consult and must
    // classify the row as Crash (§4.6 step 2, §7).
    let command = if cfg!(windows) { "cmd /C exit 1" } else { "false" };
    ws.write_table(&format!("exp1,Fails Fast,{command},,,,,\n"));

    tms()
        .arg("--csv")
        .arg(ws.path().join("table.csv"))
        .arg("--check_interval")
        .arg("1")
        .assert()
        .success();

    let table = ws.read_table();
    assert!(table.contains(",Crash,"), "table was: {table}");
}
