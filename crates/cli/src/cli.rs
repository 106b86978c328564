// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command-line surface (§6.3): flat flags, no subcommands.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tms", version, about = "Supervisor for machine-learning training jobs")]
pub struct Cli {
    /// Path to the experiment table file (overrides the config file).
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Path to the configuration file (INI format).
    #[arg(long, default_value = "config.ini")]
    pub config: PathBuf,

    /// Path to the folder containing training files (the base directory
    /// used to resolve relative `WeightFile`/setup-script paths).
    #[arg(long)]
    pub training_file_path: Option<PathBuf>,

    /// Write a default configuration file to the given path and exit.
    #[arg(long)]
    pub create_config: Option<PathBuf>,

    /// Interval, in seconds, between control loop ticks.
    #[arg(long)]
    pub check_interval: Option<u64>,

    /// Maximum number of concurrent training processes.
    #[arg(long)]
    pub max_training_process: Option<usize>,

    /// WandB entity (username or team name).
    #[arg(long)]
    pub wandb_entity: Option<String>,

    /// WandB project name.
    #[arg(long)]
    pub wandb_project: Option<String>,

    /// Accepted for interface compatibility with the out-of-scope terminal UI.
    #[arg(long)]
    pub no_ui: bool,

    /// Automatically continue to the next admissible row after one completes.
    #[arg(long)]
    pub auto_continue: bool,

    /// Open a log-viewer terminal for every running process at startup.
    #[arg(long)]
    pub show_logs: bool,

    /// Show the log of a specific row id in a separate terminal window, then exit.
    #[arg(long)]
    pub show_log: Option<String>,

    /// Disable automatically opening a log-viewer terminal for newly admitted rows.
    #[arg(long)]
    pub no_auto_log_terminal: bool,
}
