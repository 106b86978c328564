// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Scheduler / Control Loop (§4.6): one tick reconciles rows already in
//! `Training` against the Process Supervisor and Tracker Adapter, then
//! admits new rows up to `max_training_process`.
//!
//! Grounded on `main_training_manager.py`'s `_monitoring_loop()`,
//! `_check_running_trainings()` and `_start_new_trainings()`.

use crate::error::SchedulerError;
use crate::weight_resolver::{self, Resolution};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tms_core::{
    assign_gpu, negate_pretrained_id, parse_pretrained_ref, Config, ExperimentRow, GpuAssignment,
    PretrainedRef, RowId, SlotCounter, SupervisorEvent, TrainingCheck,
};
use tms_notify::Notifier;
use tms_supervisor::{EnvPrefixes, ExtraArg, ProcessStatus, ProcessSupervisor, SpawnRequest};
use tms_table::{Field, TableStore};
use tms_tracker::{RunState, Tracker};
use tokio::sync::broadcast;

/// What the caller of [`Scheduler::tick`] should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// `auto_continue = false` and nothing is running or admissible (§4.6 step 6).
    Shutdown,
}

/// A row's persisted fields plus its live process status, if any (§4.7).
#[derive(Debug, Clone)]
pub struct RowStatus {
    pub row: ExperimentRow,
    pub process: Option<ProcessStatus>,
}

/// Owns the Table Store, Tracker Adapter, Process Supervisor and
/// notification bus, and drives one tick of the control loop at a time.
pub struct Scheduler {
    config: Config,
    table: TableStore,
    tracker: Arc<dyn Tracker>,
    supervisor: Arc<ProcessSupervisor>,
    events_tx: broadcast::Sender<SupervisorEvent>,
    slots: SlotCounter,
    logs_dir: PathBuf,
    auto_log_terminal: bool,
}

impl Scheduler {
    pub fn new(
        config: Config,
        table: TableStore,
        tracker: Arc<dyn Tracker>,
        supervisor: Arc<ProcessSupervisor>,
        notifier: Arc<dyn Notifier>,
        logs_dir: PathBuf,
        auto_log_terminal: bool,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        spawn_notify_forwarder(events_tx.subscribe(), notifier);
        Self {
            config,
            table,
            tracker,
            supervisor,
            events_tx,
            slots: SlotCounter::new(),
            logs_dir,
            auto_log_terminal,
        }
    }

    /// Subscribe to the event bus independently of the notifier (§4.8), used
    /// by tests and any additional consumer.
    pub fn subscribe(&self) -> broadcast::Receiver<SupervisorEvent> {
        self.events_tx.subscribe()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.config.check_interval_secs)
    }

    /// Run the control loop until it self-terminates (§4.6 step 6).
    pub async fn run(mut self) -> Result<(), SchedulerError> {
        loop {
            match self.tick().await? {
                TickOutcome::Continue => tokio::time::sleep(self.check_interval()).await,
                TickOutcome::Shutdown => {
                    tracing::info!("no running or admissible rows and auto_continue is disabled, stopping");
                    break;
                }
            }
        }
        Ok(())
    }

    /// One iteration of the control loop (§4.6).
    pub async fn tick(&mut self) -> Result<TickOutcome, SchedulerError> {
        self.table.reload()?;
        self.reconcile().await?;

        let mut running = self.count_running().await;
        self.admit(&mut running).await?;

        if self.auto_log_terminal {
            self.open_log_viewers().await;
        }
        self.supervisor.cleanup_completed().await;

        let admissible_remaining = !self.table.query_by_state(TrainingCheck::Empty).is_empty();
        if !self.config.auto_continue && running == 0 && !admissible_remaining {
            return Ok(TickOutcome::Shutdown);
        }
        Ok(TickOutcome::Continue)
    }

    /// Snapshot every row plus its live process status, if any (§4.7).
    pub async fn status_snapshot(&self) -> Vec<RowStatus> {
        let mut out = Vec::with_capacity(self.table.rows().len());
        for row in self.table.rows() {
            let process = self.supervisor.status(&row.id).await;
            out.push(RowStatus {
                row: row.clone(),
                process,
            });
        }
        out
    }

    /// Stop every live process in sequence (§5 "global stop").
    pub async fn shutdown_all(&self) {
        for row in self.table.query_by_state(TrainingCheck::Training) {
            if self.supervisor.is_running(&row.id).await {
                if let Err(err) = self.supervisor.stop(&row.id).await {
                    tracing::warn!(row_id = %row.id, error = %err, "failed to stop process during shutdown");
                }
            }
        }
    }

    async fn count_running(&self) -> usize {
        let mut running = 0;
        for row in self.table.query_by_state(TrainingCheck::Training) {
            if self.supervisor.is_running(&row.id).await {
                running += 1;
            }
        }
        running
    }

    /// Step 2: reconcile every row in `Training` (§4.6).
    async fn reconcile(&mut self) -> Result<(), SchedulerError> {
        let training_rows: Vec<ExperimentRow> = self
            .table
            .query_by_state(TrainingCheck::Training)
            .into_iter()
            .cloned()
            .collect();

        for row in training_rows {
            if self.supervisor.is_running(&row.id).await {
                self.reconcile_live(&row).await?;
            } else {
                self.reconcile_exited(&row).await?;
            }
        }
        Ok(())
    }

    async fn reconcile_live(&mut self, row: &ExperimentRow) -> Result<(), SchedulerError> {
        let status = self.supervisor.status(&row.id).await;

        if row.wandb_run_id.trim().is_empty() {
            if let Some(run_id) = status.as_ref().and_then(|s| s.run_id.clone()) {
                tracing::info!(row_id = %row.id, run_id, "discovered WandbRunID from process output");
                self.write_field(&row.id, Field::WandbRunId, &run_id);
            }
        }

        if row.weight_file.trim().is_empty() {
            let discovered_name = status.as_ref().and_then(|s| s.run_name.clone());
            let name = match discovered_name {
                Some(name) => Some(name),
                None => {
                    let run_id = if !row.wandb_run_id.trim().is_empty() {
                        Some(row.wandb_run_id.clone())
                    } else {
                        status.as_ref().and_then(|s| s.run_id.clone())
                    };
                    match run_id {
                        Some(id) => self.tracker.display_name_of(&id).await,
                        None => None,
                    }
                }
            };
            if let Some(name) = name {
                self.write_weight_file(&row.id, &name);
            }
        }
        Ok(())
    }

    async fn reconcile_exited(&mut self, row: &ExperimentRow) -> Result<(), SchedulerError> {
        if row.wandb_run_id.trim().is_empty() {
            tracing::warn!(row_id = %row.id, "process exited with no WandbRunID on record, treating as crashed");
            if self.write_status(&row.id, TrainingCheck::Crash) {
                self.publish(SupervisorEvent::Crashed {
                    row_id: row.id.clone(),
                    reason: "process exited with no tracked run id".into(),
                });
            }
            return Ok(());
        }

        match self.tracker.state_of(&row.wandb_run_id).await {
            RunState::Finished => {
                let discovered_name = self
                    .supervisor
                    .status(&row.id)
                    .await
                    .and_then(|s| s.run_name);
                let weight_file = match discovered_name {
                    Some(name) => Some(name),
                    None => self.tracker.display_name_of(&row.wandb_run_id).await,
                };
                let weight_file = weight_file.unwrap_or_default();
                if weight_file.is_empty() {
                    tracing::warn!(row_id = %row.id, "training finished without a discoverable run name");
                }
                if self.write_weight_file(&row.id, &weight_file) && self.write_status(&row.id, TrainingCheck::Done) {
                    self.publish(SupervisorEvent::Completed {
                        row_id: row.id.clone(),
                        weight_file,
                    });
                }
            }
            RunState::Crashed => {
                if self.write_status(&row.id, TrainingCheck::Crash) {
                    self.publish(SupervisorEvent::Crashed {
                        row_id: row.id.clone(),
                        reason: "tracker reported the run as crashed".into(),
                    });
                }
            }
            RunState::Running => {
                tracing::warn!(row_id = %row.id, "tracker reports the run as still running but no local process exists");
            }
            RunState::Unknown => {
                tracing::warn!(row_id = %row.id, "tracker state is unknown, deferring to a later tick");
            }
        }
        Ok(())
    }

    /// Step 3: admit new rows up to `max_training_process` (§4.6).
    async fn admit(&mut self, running: &mut usize) -> Result<(), SchedulerError> {
        let candidates: Vec<ExperimentRow> = self
            .table
            .query_by_state(TrainingCheck::Empty)
            .into_iter()
            .cloned()
            .collect();

        for row in candidates {
            if *running >= self.config.max_training_process {
                break;
            }
            if row.training_command.trim().is_empty() {
                tracing::warn!(row_id = %row.id, "skipping row with no TrainingCommand");
                continue;
            }

            let extra_args = self.resolve_extra_args(&row);
            let gpu_assignment = self.assign_gpu_for(&row);

            if !self.write_status(&row.id, TrainingCheck::Training) {
                continue;
            }

            let env_vars: HashMap<String, String> = self
                .config
                .environment
                .env_vars
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let env_prefixes = self.env_prefixes();
            let base_dir = Path::new(&self.config.training_base_dir);

            let request = SpawnRequest {
                row_id: row.id.clone(),
                command: &row.training_command,
                cwd: Some(base_dir),
                gpu_assignment,
                env_vars: &env_vars,
                env_prefixes,
                extra_args: &extra_args,
                logs_dir: &self.logs_dir,
            };

            match self.supervisor.spawn(request).await {
                Ok(()) => {
                    *running += 1;
                    let pid = self.supervisor.status(&row.id).await.map(|s| s.pid).unwrap_or(0);
                    tracing::info!(row_id = %row.id, pid, "admitted row for training");
                    self.publish(SupervisorEvent::Started {
                        row_id: row.id.clone(),
                        pid,
                    });
                }
                Err(err) => {
                    tracing::error!(row_id = %row.id, error = %err, "failed to spawn training process");
                    self.write_status(&row.id, TrainingCheck::Crash);
                    self.publish(SupervisorEvent::SpawnFailed {
                        row_id: row.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve `PretrainedModelId` into `extra_args`, negating the stored id
    /// on the admitting row if its weight directory can't be found (§4.5).
    fn resolve_extra_args(&mut self, row: &ExperimentRow) -> Vec<(String, ExtraArg)> {
        let mut extra_args = Vec::new();
        let Some(cell) = row.pretrained_model_id.as_deref() else {
            return extra_args;
        };
        let PretrainedRef::Pending(id) = parse_pretrained_ref(Some(cell)) else {
            return extra_args;
        };

        let base_dir = Path::new(&self.config.training_base_dir);
        match weight_resolver::resolve(self.table.rows(), &id, base_dir) {
            Resolution::Resolved(path) => {
                tracing::info!(row_id = %row.id, pretrained_id = id, path = %path.display(), "resolved pretrained weight file");
                extra_args.push(("pretrained_path".to_string(), ExtraArg::Value(path.display().to_string())));
            }
            Resolution::DirectoryMissing => {
                let negated = negate_pretrained_id(&id);
                tracing::warn!(row_id = %row.id, pretrained_id = id, negated, "pretrained weight directory not found, negating reference");
                self.write_field(&row.id, Field::PretrainedModelId, &negated);
            }
            Resolution::NoReference => {
                tracing::warn!(row_id = %row.id, pretrained_id = id, "pretrained model id does not resolve to a weight file");
            }
        }
        extra_args
    }

    /// Write a single field, logging and publishing `TableWriteFailed`
    /// instead of aborting the tick on failure (§7 "File-system error on
    /// table rewrite").
    fn write_field(&mut self, row_id: &RowId, field: Field, value: &str) -> bool {
        match self.table.update_field(row_id, field, value) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(row_id = %row_id, error = %err, "failed to rewrite table, will retry next tick");
                self.publish(SupervisorEvent::TableWriteFailed {
                    row_id: row_id.clone(),
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    fn write_status(&mut self, row_id: &RowId, state: TrainingCheck) -> bool {
        match self.table.update_status(row_id, state) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(row_id = %row_id, error = %err, "failed to rewrite table, will retry next tick");
                self.publish(SupervisorEvent::TableWriteFailed {
                    row_id: row_id.clone(),
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    fn write_weight_file(&mut self, row_id: &RowId, name: &str) -> bool {
        match self.table.update_weight_file(row_id, name) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(row_id = %row_id, error = %err, "failed to rewrite table, will retry next tick");
                self.publish(SupervisorEvent::TableWriteFailed {
                    row_id: row_id.clone(),
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    /// §4.4 GPU assignment, honoring a row-level `GpuID` override only when
    /// `use_process_order` is disabled.
    fn assign_gpu_for(&mut self, row: &ExperimentRow) -> GpuAssignment {
        if !self.config.gpu.use_process_order {
            if let Some(gpu_id) = row.gpu_id.as_deref().filter(|id| !id.trim().is_empty()) {
                return GpuAssignment::Single(gpu_id.to_string());
            }
        }
        let slot = self.slots.next_slot();
        assign_gpu(&self.config.gpu, slot)
    }

    fn env_prefixes(&self) -> EnvPrefixes {
        let env = &self.config.environment;
        let setup_script = if env.setup_script.trim().is_empty() {
            None
        } else {
            Some(env.setup_script.clone())
        };
        let setup_script_is_file = setup_script
            .as_ref()
            .map(|s| Path::new(s).is_file())
            .unwrap_or(false);
        let conda_env = if env.use_conda && !env.conda_env.trim().is_empty() {
            Some(env.conda_env.clone())
        } else {
            None
        };
        EnvPrefixes {
            setup_script,
            setup_script_is_file,
            conda_env,
        }
    }

    async fn open_log_viewers(&self) {
        for row in self.table.query_by_state(TrainingCheck::Training) {
            if self.supervisor.is_running(&row.id).await {
                self.supervisor.open_log_viewer(&row.id).await;
            }
        }
    }

    fn publish(&self, event: SupervisorEvent) {
        let _ = self.events_tx.send(event);
    }
}

fn spawn_notify_forwarder(mut rx: broadcast::Receiver<SupervisorEvent>, notifier: Arc<dyn Notifier>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let (title, message) = event.as_notification();
                    if let Err(err) = notifier.notify(&title, &message).await {
                        tracing::warn!(error = %err, "failed to deliver notification");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification forwarder lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
