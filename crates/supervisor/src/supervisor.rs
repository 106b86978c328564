// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Process Supervisor (§4.3): owns spawned training processes end to
//! end, from launch through termination and cleanup.

use crate::capture::{capture_stream, StreamKind};
use crate::command::{apply_extra_args, compose_effective_command, EnvPrefixes, ExtraArg};
use crate::error::SupervisorError;
use crate::record::{Discovered, ProcessRecord};
use crate::status::{ProcessState, ProcessStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tms_core::{GpuAssignment, RowId};
use tokio::process::{Child, Command};

const SPAWN_GRACE_PERIOD: Duration = Duration::from_secs(2);
const TERMINATE_POLL_INTERVAL: Duration = Duration::from_secs(1);
const TERMINATE_TIMEOUT: Duration = Duration::from_secs(10);

struct ProcessEntry {
    record: Arc<ProcessRecord>,
    child: Child,
    stdout_task: tokio::task::JoinHandle<std::io::Result<()>>,
    stderr_task: tokio::task::JoinHandle<std::io::Result<()>>,
    state: ProcessState,
    return_code: Option<i32>,
}

/// Everything [`ProcessSupervisor::spawn`] needs beyond the bare command.
pub struct SpawnRequest<'a> {
    pub row_id: RowId,
    pub command: &'a str,
    pub cwd: Option<&'a Path>,
    pub gpu_assignment: GpuAssignment,
    pub env_vars: &'a HashMap<String, String>,
    pub env_prefixes: EnvPrefixes,
    pub extra_args: &'a [(String, ExtraArg)],
    pub logs_dir: &'a Path,
}

/// Owns every live child process, keyed by row id. A fresh monotonic slot
/// counter is handed out per spawn and reset whenever a new supervisor is
/// constructed (§4.4).
pub struct ProcessSupervisor {
    entries: tokio::sync::Mutex<HashMap<RowId, ProcessEntry>>,
    next_slot: Mutex<usize>,
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self {
            entries: tokio::sync::Mutex::new(HashMap::new()),
            next_slot: Mutex::new(0),
        }
    }

    fn next_slot(&self) -> usize {
        let mut slot = self.next_slot.lock();
        let current = *slot;
        *slot += 1;
        current
    }

    /// Launch a training process for `request.row_id` (§4.3.1).
    pub async fn spawn(&self, request: SpawnRequest<'_>) -> Result<(), SupervisorError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&request.row_id) {
            return Err(SupervisorError::AlreadyRunning(request.row_id));
        }

        let slot = self.next_slot();
        let command_with_args = apply_extra_args(request.command, request.extra_args);
        let effective_command = compose_effective_command(&command_with_args, &request.env_prefixes);

        tokio::fs::create_dir_all(request.logs_dir).await?;
        let stdout_log = request.logs_dir.join(format!("{}_stdout.log", request.row_id));
        let stderr_log = request.logs_dir.join(format!("{}_stderr.log", request.row_id));
        write_log_header(&stdout_log, &request).await?;
        write_log_header(&stderr_log, &request).await?;

        let mut cmd = Command::new("bash");
        cmd.arg("-c")
            .arg(&effective_command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = request.cwd {
            cmd.current_dir(cwd);
        }
        if let Some(value) = request.gpu_assignment.as_env_value() {
            cmd.env("CUDA_VISIBLE_DEVICES", value);
        }
        for (key, value) in request.env_vars {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn()?;
        let pid = child.id().unwrap_or(0);
        let stdout = child.stdout.take().ok_or(std::io::Error::new(
            std::io::ErrorKind::Other,
            "child stdout not piped",
        ))?;
        let stderr = child.stderr.take().ok_or(std::io::Error::new(
            std::io::ErrorKind::Other,
            "child stderr not piped",
        ))?;

        let record = Arc::new(ProcessRecord {
            row_id: request.row_id.clone(),
            pid,
            command: request.command.to_string(),
            full_command: effective_command,
            gpu_assignment: request.gpu_assignment,
            slot,
            stdout_log: stdout_log.clone(),
            stderr_log: stderr_log.clone(),
            start: Instant::now(),
            discovered: Mutex::new(Discovered::default()),
            log_terminal_opened: Mutex::new(false),
        });

        let stdout_task = tokio::spawn(capture_stream(stdout, stdout_log, record.clone(), StreamKind::Stdout));
        let stderr_task = tokio::spawn(capture_stream(stderr, stderr_log, record.clone(), StreamKind::Stderr));

        tokio::time::sleep(SPAWN_GRACE_PERIOD).await;
        if let Ok(Some(exit)) = child.try_wait() {
            let code = exit.code();
            tracing::error!(row_id = %record.row_id, code, "process exited during spawn grace period");
            entries.insert(
                record.row_id.clone(),
                ProcessEntry {
                    record: record.clone(),
                    child,
                    stdout_task,
                    stderr_task,
                    state: ProcessState::SpawnError,
                    return_code: code,
                },
            );
            return Err(SupervisorError::SpawnFailed {
                row_id: record.row_id.clone(),
                code,
                stderr: format!("see {}", record.stderr_log.display()),
            });
        }

        tracing::info!(row_id = %record.row_id, pid, slot, "training process started");
        entries.insert(
            record.row_id.clone(),
            ProcessEntry {
                record,
                child,
                stdout_task,
                stderr_task,
                state: ProcessState::Running,
                return_code: None,
            },
        );
        Ok(())
    }

    /// Stop a running process: polite termination, then a forceful kill
    /// after the poll window expires (§4.3.3).
    pub async fn stop(&self, row_id: &RowId) -> Result<(), SupervisorError> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .get_mut(row_id)
            .ok_or_else(|| SupervisorError::UnknownRow(row_id.clone()))?;

        if entry.child.try_wait()?.is_none() {
            if let Some(pid) = entry.child.id() {
                let _ = Command::new("kill").arg("-TERM").arg(pid.to_string()).output().await;
            }

            let deadline = Instant::now() + TERMINATE_TIMEOUT;
            loop {
                if entry.child.try_wait()?.is_some() {
                    break;
                }
                if Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(TERMINATE_POLL_INTERVAL).await;
            }

            if entry.child.try_wait()?.is_none() {
                entry.child.start_kill()?;
                entry.child.wait().await?;
            }
        }

        entry.state = ProcessState::Stopped;
        entry.return_code = entry.child.try_wait().ok().flatten().and_then(|s| s.code());
        tracing::info!(%row_id, "training process stopped");
        Ok(())
    }

    /// Snapshot of the record, minus non-serialisable handles (§4.3.4).
    pub async fn status(&self, row_id: &RowId) -> Option<ProcessStatus> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(row_id)?;

        if entry.state == ProcessState::Running {
            if let Ok(Some(exit)) = entry.child.try_wait() {
                entry.state = ProcessState::Exited;
                entry.return_code = exit.code();
            }
        }

        let discovered = entry.record.discovered.lock().clone();
        Some(ProcessStatus {
            row_id: entry.record.row_id.clone(),
            pid: entry.record.pid,
            gpu_assignment: entry.record.gpu_assignment.clone(),
            slot: entry.record.slot,
            state: entry.state,
            runtime: entry.record.start.elapsed(),
            return_code: entry.return_code,
            run_id: discovered.run_id,
            run_name: discovered.run_name,
        })
    }

    /// True iff the OS process has not yet exited (§4.3.4).
    pub async fn is_running(&self, row_id: &RowId) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(row_id) {
            Some(entry) => matches!(entry.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Join capture workers with a short timeout and drop any record whose
    /// process has exited (§4.3.4).
    pub async fn cleanup_completed(&self) {
        let finished: Vec<RowId> = {
            let mut entries = self.entries.lock().await;
            let mut finished = Vec::new();
            for (id, entry) in entries.iter_mut() {
                if !matches!(entry.child.try_wait(), Ok(None)) {
                    finished.push(id.clone());
                }
            }
            finished
        };

        let mut entries = self.entries.lock().await;
        for id in finished {
            if let Some(entry) = entries.remove(&id) {
                let join_timeout = Duration::from_secs(2);
                let _ = tokio::time::timeout(join_timeout, entry.stdout_task).await;
                let _ = tokio::time::timeout(join_timeout, entry.stderr_task).await;
            }
        }
    }

    /// Open a host terminal window tailing both captured log files (§4.3.5).
    /// Returns `false` without side effects if `row_id` is unknown, a viewer
    /// was already opened for it, or the host platform isn't supported.
    pub async fn open_log_viewer(&self, row_id: &RowId) -> bool {
        let (stdout_log, stderr_log) = {
            let entries = self.entries.lock().await;
            let Some(entry) = entries.get(row_id) else {
                return false;
            };
            let mut opened = entry.record.log_terminal_opened.lock();
            if *opened {
                return false;
            }
            *opened = true;
            (entry.record.stdout_log.clone(), entry.record.stderr_log.clone())
        };

        spawn_log_viewer(&stdout_log, &stderr_log)
    }

    /// Open a host terminal window tailing the on-disk log files for
    /// `row_id` under `logs_dir`, without requiring a live, in-memory
    /// [`ProcessRecord`] (§4.3.5 one-shot `--show_log` invocation: a
    /// standalone CLI run has no supervisor state from the run that actually
    /// produced the logs). Returns `false` if neither log file exists yet.
    pub fn open_log_viewer_for_path(logs_dir: &Path, row_id: &RowId) -> bool {
        let stdout_log = logs_dir.join(format!("{row_id}_stdout.log"));
        let stderr_log = logs_dir.join(format!("{row_id}_stderr.log"));
        if !stdout_log.exists() && !stderr_log.exists() {
            return false;
        }
        spawn_log_viewer(&stdout_log, &stderr_log)
    }
}

/// Launch a terminal emulator tailing both log files. Best-effort: a failure
/// to spawn is logged and reported as `false`, never propagated.
fn spawn_log_viewer(stdout_log: &Path, stderr_log: &Path) -> bool {
    let tail_cmd = format!(
        "tail -f '{}' '{}'",
        stdout_log.display(),
        stderr_log.display()
    );

    let spawned = if cfg!(target_os = "macos") {
        std::process::Command::new("osascript")
            .arg("-e")
            .arg(format!(
                "tell application \"Terminal\" to do script \"{tail_cmd}\""
            ))
            .spawn()
    } else if cfg!(target_os = "linux") {
        std::process::Command::new("x-terminal-emulator")
            .arg("-e")
            .arg(&tail_cmd)
            .spawn()
    } else {
        return false;
    };

    match spawned {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "failed to open log viewer terminal");
            false
        }
    }
}

async fn write_log_header(path: &Path, request: &SpawnRequest<'_>) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;
    let header = format!(
        "===== process start: {} =====\nrow id: {}\ncommand: {}\ngpu: {:?}\n========================================\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
        request.row_id,
        request.command,
        request.gpu_assignment,
    );
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(header.as_bytes()).await
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
