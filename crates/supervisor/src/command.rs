// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effective command composition (§4.3.1 step 2), grounded on
//! `process_manager.py`'s `start_training_process()` argument-merge loop
//! and `_prepare_command()` prefix wrapping.

/// One entry in the `extra_args` map passed to [`spawn`](crate::supervisor::ProcessSupervisor::spawn).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraArg {
    /// `--key` is appended if true and absent; omitted entirely if false.
    Flag(bool),
    /// `--key=value` is appended, or replaces an existing `--key=...`/`--key ...`.
    Value(String),
}

fn arg_pattern(key: &str) -> regex::Regex {
    #[allow(clippy::expect_used)]
    regex::Regex::new(&format!(r"--{}[= ]\S+", regex::escape(key)))
        .expect("constructed pattern is valid regex")
}

/// Merge `extra_args` into `command` (§4.3.1 step 2, first bullet).
pub fn apply_extra_args(command: &str, extra_args: &[(String, ExtraArg)]) -> String {
    let mut command = command.to_string();
    for (key, value) in extra_args {
        match value {
            ExtraArg::Flag(true) => {
                let flag = format!("--{key}");
                if !command.contains(&flag) {
                    command.push_str(&format!(" {flag}"));
                }
            }
            ExtraArg::Flag(false) => {}
            ExtraArg::Value(v) => {
                let pattern = arg_pattern(key);
                if pattern.is_match(&command) {
                    let replacement = format!("--{key}={v}");
                    command = pattern.replace(&command, regex::NoExpand(&replacement)).into_owned();
                } else {
                    command.push_str(&format!(" --{key}={v}"));
                }
            }
        }
    }
    command
}

/// Setup-script / conda prefix steps resolved ahead of time so this stays
/// pure and testable; the filesystem check for `setup_script` happens in the
/// caller (§4.3.1 step 2, second bullet).
#[derive(Debug, Clone, Default)]
pub struct EnvPrefixes {
    pub setup_script: Option<String>,
    pub setup_script_is_file: bool,
    pub conda_env: Option<String>,
}

/// Resolve the prefix steps in order, then wrap `command` as a single
/// `bash -c '...'` invocation if any prefixes exist.
pub fn compose_effective_command(command: &str, prefixes: &EnvPrefixes) -> String {
    let mut steps = Vec::new();
    if let Some(script) = &prefixes.setup_script {
        if !script.is_empty() {
            if prefixes.setup_script_is_file {
                steps.push(format!("source {script}"));
            } else {
                steps.push(script.clone());
            }
        }
    }
    if let Some(env) = &prefixes.conda_env {
        if !env.is_empty() {
            steps.push(format!("conda activate {env}"));
        }
    }

    if steps.is_empty() {
        return command.to_string();
    }

    steps.push(command.to_string());
    let joined = steps.join(" && ");
    format!("bash -c '{joined}'")
}

/// Matches `wandb` (case-insensitive) and `run-`, used to detect a discovered
/// run id in a completed stderr line (§4.3.2, pattern 1).
pub(crate) static RUN_ID_TOKEN: &str = "run-";

/// Extract a `run_id` from a completed output line, if present.
pub fn extract_run_id(line: &str) -> Option<String> {
    let lower = line.to_ascii_lowercase();
    if !lower.contains("wandb") || !line.contains(RUN_ID_TOKEN) {
        return None;
    }
    let (_, rest) = line.split_once(RUN_ID_TOKEN)?;
    let token = rest.split_whitespace().next()?;
    if token.is_empty() {
        return None;
    }
    Some(format!("run-{token}"))
}

const SYNCING_RUN_PATTERNS: &[&str] = &[
    "wandb: Syncing run ",
    "wandb: syncing run ",
    "wandb: Syncing run\t",
    "wandb: syncing run\t",
    "wandb:Syncing run ",
    "wandb:syncing run ",
    "wandb: Syncing run",
    "wandb: syncing run",
];

/// Extract a `run_name` from a completed output line, if present (§4.3.2,
/// pattern 2).
pub fn extract_run_name(line: &str) -> Option<String> {
    if !line.contains("wandb:") {
        return None;
    }
    let lower = line.to_ascii_lowercase();
    if !lower.contains("syncing run") {
        return None;
    }

    let name_part = SYNCING_RUN_PATTERNS
        .iter()
        .find_map(|pattern| line.split_once(pattern).map(|(_, tail)| tail))
        .or_else(|| {
            let words: Vec<&str> = line.split_whitespace().collect();
            words
                .iter()
                .position(|w| w.eq_ignore_ascii_case("run"))
                .and_then(|i| words.get(i + 1).copied())
        })?;

    let run_name = name_part.split_whitespace().next().unwrap_or("").trim();
    if run_name.is_empty() || run_name.len() > 100 {
        return None;
    }
    Some(run_name.to_string())
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
