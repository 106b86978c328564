// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Configuration Loader (§10.1): reads the INI-style config file, falls
//! back to in-memory defaults when the default path is simply absent, and
//! applies command-line overrides last so they always win.

use crate::cli::Cli;
use anyhow::{bail, Context};
use tms_core::Config;

const DEFAULT_CONFIG_PATH: &str = "config.ini";

/// Load the base configuration, then layer CLI overrides on top (§10.1,
/// §6.3 "Command-line values override configuration values").
pub fn load(cli: &Cli) -> anyhow::Result<Config> {
    let explicit = cli.config.to_string_lossy() != DEFAULT_CONFIG_PATH;
    let mut config = if cli.config.exists() {
        Config::load(&cli.config).with_context(|| format!("loading config file {}", cli.config.display()))?
    } else if explicit {
        bail!("configuration file not found: {}", cli.config.display());
    } else {
        tracing::warn!(path = %cli.config.display(), "no config file found, using built-in defaults");
        Config::default()
    };

    if let Some(path) = &cli.training_file_path {
        config.training_base_dir = path.display().to_string();
    }
    if let Some(interval) = cli.check_interval {
        config.check_interval_secs = interval;
    }
    if let Some(max) = cli.max_training_process {
        config.max_training_process = max;
    }
    if let Some(entity) = &cli.wandb_entity {
        config.tracker.entity = entity.clone();
    }
    if let Some(project) = &cli.wandb_project {
        config.tracker.project = project.clone();
    }
    if cli.auto_continue {
        config.auto_continue = true;
    }

    Ok(config)
}
