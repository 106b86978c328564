//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub const HEADER: &str = "ID,Name,TrainingCommand,TrainingCheck,WandbRunID,WeightFile,GpuID,PretrainedModelId\n";

/// A scratch directory holding a table file, a config file, and whatever a
/// scenario wants to write under it (logs, checkpoint directories).
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create workspace tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_table(&self, rows: &str) -> PathBuf {
        let path = self.dir.path().join("table.csv");
        fs::write(&path, format!("{HEADER}{rows}")).expect("write table.csv");
        path
    }

    pub fn read_table(&self) -> String {
        fs::read_to_string(self.dir.path().join("table.csv")).expect("read table.csv")
    }

    pub fn write_config(&self, body: &str) -> PathBuf {
        let path = self.dir.path().join("config.ini");
        fs::write(&path, body).expect("write config.ini");
        path
    }
}

/// A `tms` invocation builder with a generous default timeout since the
/// control loop only exits on its own when the table drains.
pub fn tms() -> Command {
    let bin_path = std::env::var("CARGO_BIN_FILE_TMS_tms")
        .or_else(|_| std::env::var("CARGO_BIN_FILE_TMS"))
        .or_else(|_| std::env::var("CARGO_BIN_EXE_tms"))
        .expect("find tms binary (artifact dependency env var unset)");
    let mut cmd = Command::new(bin_path);
    cmd.timeout(Duration::from_secs(10));
    cmd
}
