// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed configuration record, and its section/key file parser.
//!
//! Mirrors `training_manager/config_handler.py`: the same sections
//! (`general`, `gpu`, `wandb`, `environment`, `email`, `notification`), the
//! same defaults, and the same tolerant-boolean / comma-list / comma
//! `key=value` dict parsing rules. Parsing itself goes through the
//! `configparser` crate's `Ini` reader.

use crate::error::ConfigError;
use configparser::ini::Ini;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;

/// GPU assignment policy (§3, §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuConfig {
    pub enable_gpu_assignment: bool,
    pub gpu_list: Vec<String>,
    pub allow_multi_gpu: bool,
    pub use_process_order: bool,
    pub default_gpu: String,
    /// slot index -> single id or ordered list ('+' separated in the file)
    pub process_gpu_mapping: HashMap<usize, Vec<String>>,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            enable_gpu_assignment: true,
            gpu_list: vec!["0".into(), "1".into(), "2".into(), "3".into()],
            allow_multi_gpu: true,
            use_process_order: true,
            default_gpu: "0".into(),
            process_gpu_mapping: HashMap::new(),
        }
    }
}

/// Activation / environment setup applied before the training command (§4.3.1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub setup_script: String,
    pub use_conda: bool,
    pub conda_env: String,
    pub env_vars: IndexMap<String, String>,
}

/// Remote tracker credentials (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerConfig {
    pub api_key: String,
    pub entity: String,
    pub project: String,
}

/// Notification delivery gates (§10.1). Email transport itself is out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub desktop_enabled: bool,
    pub email_enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop_enabled: true,
            email_enabled: false,
        }
    }
}

/// The full configuration record (§3, §10.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub check_interval_secs: u64,
    pub max_training_process: usize,
    pub auto_continue: bool,
    pub training_base_dir: String,
    pub gpu: GpuConfig,
    pub environment: EnvironmentConfig,
    pub tracker: TrackerConfig,
    pub notification: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            max_training_process: 1,
            auto_continue: true,
            training_base_dir: ".".into(),
            gpu: GpuConfig::default(),
            environment: EnvironmentConfig::default(),
            tracker: TrackerConfig::default(),
            notification: NotificationConfig::default(),
        }
    }
}

/// Accepted boolean spellings (§6.2): `true|false|yes|no|on|off`, case-insensitive.
fn parse_bool(raw: &str, section: &str, key: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            section: section.into(),
            key: key.into(),
            value: raw.into(),
        }),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dict(raw: &str) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((k, v)) = pair.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

/// Parse `general/process_gpu_mapping` (`process0=0,process1=1+2`) into a
/// slot-index map. A `+`-joined value denotes a multi-GPU assignment.
fn parse_process_gpu_mapping(raw: &str) -> HashMap<usize, Vec<String>> {
    let mut mapping = HashMap::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        let Some((key, val)) = pair.split_once('=') else {
            continue;
        };
        let Some(idx_str) = key.trim().strip_prefix("process") else {
            continue;
        };
        let Ok(idx) = idx_str.parse::<usize>() else {
            continue;
        };
        let gpus: Vec<String> = val.split('+').map(|s| s.trim().to_string()).collect();
        mapping.insert(idx, gpus);
    }
    mapping
}

impl Config {
    /// Load from a section/key file at `path`. Missing sections/keys fall
    /// back to the defaults above, matching `ConfigHandler`'s behavior of
    /// always returning a usable configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let mut ini = Ini::new();
        let map = ini
            .load(path)
            .map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            })?;
        Self::from_map(&map)
    }

    fn from_map(
        map: &HashMap<String, HashMap<String, Option<String>>>,
    ) -> Result<Self, ConfigError> {
        let get = |section: &str, key: &str| -> Option<String> {
            map.get(section)
                .and_then(|s| s.get(key))
                .cloned()
                .flatten()
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Config::default();

        if let Some(v) = get("general", "check_interval") {
            cfg.check_interval_secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                section: "general".into(),
                key: "check_interval".into(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("general", "max_training_process") {
            cfg.max_training_process = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                section: "general".into(),
                key: "max_training_process".into(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("general", "auto_continue") {
            cfg.auto_continue = parse_bool(&v, "general", "auto_continue")?;
        }
        if let Some(v) = get("general", "training_base_dir") {
            cfg.training_base_dir = v;
        }
        if let Some(v) = get("general", "process_gpu_mapping") {
            cfg.gpu.process_gpu_mapping = parse_process_gpu_mapping(&v);
        }

        if let Some(v) = get("gpu", "enable_gpu_assignment") {
            cfg.gpu.enable_gpu_assignment = parse_bool(&v, "gpu", "enable_gpu_assignment")?;
        }
        if let Some(v) = get("gpu", "gpu_list") {
            cfg.gpu.gpu_list = parse_list(&v);
        }
        if let Some(v) = get("gpu", "allow_multi_gpu") {
            cfg.gpu.allow_multi_gpu = parse_bool(&v, "gpu", "allow_multi_gpu")?;
        }
        if let Some(v) = get("gpu", "use_process_order") {
            cfg.gpu.use_process_order = parse_bool(&v, "gpu", "use_process_order")?;
        }
        if let Some(v) = get("gpu", "default_gpu") {
            cfg.gpu.default_gpu = v;
        }

        if let Some(v) = get("environment", "setup_script") {
            cfg.environment.setup_script = v;
        }
        if let Some(v) = get("environment", "use_conda") {
            cfg.environment.use_conda = parse_bool(&v, "environment", "use_conda")?;
        }
        if let Some(v) = get("environment", "conda_env") {
            cfg.environment.conda_env = v;
        }
        if let Some(v) = get("environment", "env_vars") {
            cfg.environment.env_vars = parse_dict(&v);
        }

        if let Some(v) = get("wandb", "api_key") {
            cfg.tracker.api_key = v;
        }
        if let Some(v) = get("wandb", "entity") {
            cfg.tracker.entity = v;
        }
        if let Some(v) = get("wandb", "project") {
            cfg.tracker.project = v;
        }

        if let Some(v) = get("notification", "desktop_enabled") {
            cfg.notification.desktop_enabled = parse_bool(&v, "notification", "desktop_enabled")?;
        }
        if let Some(v) = get("email", "enabled") {
            cfg.notification.email_enabled = parse_bool(&v, "email", "enabled")?;
        }

        Ok(cfg)
    }

    /// Render the default configuration as section/key text, for `--create_config`.
    pub fn render_default() -> String {
        let d = Config::default();
        format!(
            "[general]\n\
             check_interval = {check_interval}\n\
             max_training_process = {max_proc}\n\
             auto_continue = {auto_continue}\n\
             training_base_dir = {base_dir}\n\
             process_gpu_mapping =\n\
             \n\
             [gpu]\n\
             enable_gpu_assignment = {enable_gpu}\n\
             gpu_list = {gpu_list}\n\
             allow_multi_gpu = {multi_gpu}\n\
             use_process_order = {use_order}\n\
             default_gpu = {default_gpu}\n\
             \n\
             [wandb]\n\
             api_key =\n\
             entity =\n\
             project =\n\
             \n\
             [environment]\n\
             setup_script =\n\
             use_conda = false\n\
             conda_env =\n\
             env_vars =\n\
             \n\
             [email]\n\
             enabled = {email_enabled}\n\
             \n\
             [notification]\n\
             desktop_enabled = {desktop_enabled}\n",
            check_interval = d.check_interval_secs,
            max_proc = d.max_training_process,
            auto_continue = d.auto_continue,
            base_dir = d.training_base_dir,
            enable_gpu = d.gpu.enable_gpu_assignment,
            gpu_list = d.gpu.gpu_list.join(","),
            multi_gpu = d.gpu.allow_multi_gpu,
            use_order = d.gpu.use_process_order,
            default_gpu = d.gpu.default_gpu,
            email_enabled = d.notification.email_enabled,
            desktop_enabled = d.notification.desktop_enabled,
        )
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
