// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tms - a supervisor for machine-learning training jobs.

mod cli;
mod config_loader;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use std::path::PathBuf;
use std::sync::Arc;
use tms_core::Config;
use tms_notify::{DesktopNotifier, NoopNotifier, Notifier};
use tms_scheduler::{Scheduler, TickOutcome};
use tms_supervisor::ProcessSupervisor;
use tms_table::TableStore;
use tms_tracker::wandb::WandbTracker;
use tms_tracker::Tracker;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

fn table_path(cli: &Cli, config: &Config) -> PathBuf {
    cli.csv
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.training_base_dir).join("ML_Experiment_Table.csv"))
}

fn build_tracker(config: &Config) -> Arc<dyn Tracker> {
    if config.tracker.api_key.is_empty() {
        tracing::warn!("no wandb api_key configured, run completion will never be detected");
    }
    Arc::new(WandbTracker::new(
        config.tracker.api_key.clone(),
        config.tracker.entity.clone(),
        config.tracker.project.clone(),
    ))
}

fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    if config.notification.desktop_enabled {
        Arc::new(DesktopNotifier::new())
    } else {
        Arc::new(NoopNotifier::new())
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    if let Some(path) = &cli.create_config {
        std::fs::write(path, Config::render_default())
            .with_context(|| format!("writing default config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote default configuration file");
        return Ok(());
    }

    let config = config_loader::load(&cli)?;
    let csv_path = table_path(&cli, &config);
    let logs_dir = PathBuf::from(&config.training_base_dir).join("logs");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(run(cli, config, csv_path, logs_dir))
}

async fn run(cli: Cli, config: Config, csv_path: PathBuf, logs_dir: PathBuf) -> anyhow::Result<()> {
    if let Some(row_id) = &cli.show_log {
        let id = tms_core::RowId::new(row_id.clone());
        let opened = ProcessSupervisor::open_log_viewer_for_path(&logs_dir, &id);
        if !opened {
            tracing::error!(row_id = %row_id, "no log files found for this row");
            std::process::exit(1);
        }
        return Ok(());
    }

    let supervisor = Arc::new(ProcessSupervisor::new());
    let table = TableStore::open(&csv_path).with_context(|| format!("opening experiment table {}", csv_path.display()))?;
    let tracker = build_tracker(&config);
    let notifier = build_notifier(&config);
    let auto_log_terminal = !cli.no_auto_log_terminal;

    let mut scheduler = Scheduler::new(config, table, tracker, supervisor.clone(), notifier, logs_dir, auto_log_terminal);

    if cli.show_logs {
        for status in scheduler.status_snapshot().await {
            if status.process.is_some() {
                supervisor.open_log_viewer(&status.row.id).await;
            }
        }
    }

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("installing SIGTERM handler")?;

    loop {
        tokio::select! {
            outcome = scheduler.tick() => {
                match outcome? {
                    TickOutcome::Continue => tokio::time::sleep(scheduler.check_interval()).await,
                    TickOutcome::Shutdown => {
                        tracing::info!("scheduler signalled shutdown");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received interrupt signal, shutting down");
                break;
            }
            _ = sigterm.recv() => {
                tracing::info!("received termination signal, shutting down");
                break;
            }
        }
    }

    scheduler.shutdown_all().await;
    Ok(())
}
