// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Table Store (§4.1): a row-oriented store persisted as a comma
//! delimited text file, single-writer from the Scheduler, rewritten
//! atomically on every update.
//!
//! Grounded on `training_manager/csv_handler.py`'s `reload()` /
//! `update_value()` pair, and on the write-temp-then-rename pattern used for
//! snapshot persistence elsewhere in this workspace.

use crate::error::TableError;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tms_core::{ExperimentRow, RowId, TrainingCheck};

const KNOWN_COLUMNS: [&str; 8] = [
    "ID",
    "Name",
    "TrainingCommand",
    "TrainingCheck",
    "WandbRunID",
    "WeightFile",
    "GpuID",
    "PretrainedModelId",
];

/// A single editable field on an [`ExperimentRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    TrainingCommand,
    TrainingCheck,
    WandbRunId,
    WeightFile,
    GpuId,
    PretrainedModelId,
}

impl Field {
    fn column(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::TrainingCommand => "TrainingCommand",
            Field::TrainingCheck => "TrainingCheck",
            Field::WandbRunId => "WandbRunID",
            Field::WeightFile => "WeightFile",
            Field::GpuId => "GpuID",
            Field::PretrainedModelId => "PretrainedModelId",
        }
    }
}

/// The experiment table, backed by a file on disk.
///
/// `reload()` must be called (directly, or via the update methods which call
/// it implicitly) before trusting any in-memory row against concurrent
/// external edits — this mirrors the original's "reload to get the latest
/// data" behavior on every write.
pub struct TableStore {
    path: PathBuf,
    /// Column order as last read from the file, known columns first followed
    /// by any unrecognized ones in their original order.
    extra_columns: Vec<String>,
    rows: Vec<ExperimentRow>,
}

impl TableStore {
    /// Open and perform an initial load. Missing file is a fatal
    /// configuration error at start-up (§4.1 "Failure").
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TableError> {
        let path = path.into();
        let mut store = Self {
            path,
            extra_columns: Vec::new(),
            rows: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-parse the file fully, replacing the in-memory row set.
    pub fn reload(&mut self) -> Result<(), TableError> {
        if !self.path.exists() {
            return Err(TableError::NotFound(self.path.clone()));
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(TableError::MissingHeader);
        }
        for required in ["ID", "TrainingCommand"] {
            if !headers.iter().any(|h| h == required) {
                return Err(TableError::MissingColumn(required));
            }
        }
        let extra_columns: Vec<String> = headers
            .iter()
            .filter(|h| !KNOWN_COLUMNS.contains(&h.as_str()))
            .cloned()
            .collect();

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(err) => {
                    tracing::warn!(line, error = %err, "skipping malformed table row");
                    continue;
                }
            };
            let mut cells: IndexMap<String, String> = IndexMap::new();
            for (header, value) in headers.iter().zip(record.iter()) {
                cells.insert(header.clone(), value.to_string());
            }

            let Some(id) = cells.get("ID").filter(|v| !v.trim().is_empty()) else {
                tracing::warn!(line, "skipping row with empty ID");
                continue;
            };
            let id = RowId::new(id.clone());

            let mut extra = IndexMap::new();
            for col in &extra_columns {
                extra.insert(col.clone(), cells.get(col).cloned().unwrap_or_default());
            }

            let get = |key: &str| cells.get(key).cloned().unwrap_or_default();
            let opt = |key: &str| -> Option<String> {
                let v = get(key);
                if v.trim().is_empty() {
                    None
                } else {
                    Some(v)
                }
            };

            rows.push(ExperimentRow {
                id,
                name: get("Name"),
                training_command: get("TrainingCommand"),
                training_check: TrainingCheck::parse(&get("TrainingCheck")),
                wandb_run_id: get("WandbRunID"),
                weight_file: get("WeightFile"),
                gpu_id: opt("GpuID"),
                pretrained_model_id: opt("PretrainedModelId"),
                extra,
            });
        }

        self.extra_columns = extra_columns;
        self.rows = rows;
        Ok(())
    }

    /// Rows currently known to the store, without reloading.
    pub fn rows(&self) -> &[ExperimentRow] {
        &self.rows
    }

    pub fn query_by_state(&self, state: TrainingCheck) -> Vec<&ExperimentRow> {
        self.rows
            .iter()
            .filter(|r| r.training_check == state)
            .collect()
    }

    pub fn get_row(&self, id: &RowId) -> Option<&ExperimentRow> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Reload, apply a single field update, and rewrite the file atomically.
    pub fn update_field(&mut self, id: &RowId, field: Field, value: &str) -> Result<(), TableError> {
        self.reload()?;
        let row = self
            .rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| TableError::UnknownRow(id.clone()))?;
        match field {
            Field::Name => row.name = value.to_string(),
            Field::TrainingCommand => row.training_command = value.to_string(),
            Field::TrainingCheck => row.training_check = TrainingCheck::parse(value),
            Field::WandbRunId => row.wandb_run_id = value.to_string(),
            Field::WeightFile => row.weight_file = value.to_string(),
            Field::GpuId => {
                row.gpu_id = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            Field::PretrainedModelId => {
                row.pretrained_model_id = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
        }
        self.write_atomic()
    }

    pub fn update_status(&mut self, id: &RowId, state: TrainingCheck) -> Result<(), TableError> {
        self.update_field(id, Field::TrainingCheck, state.as_cell())
    }

    pub fn update_weight_file(&mut self, id: &RowId, name: &str) -> Result<(), TableError> {
        self.update_field(id, Field::WeightFile, name)
    }

    fn write_atomic(&self) -> Result<(), TableError> {
        let tmp_path = sibling_tmp_path(&self.path);
        {
            let mut writer = csv::WriterBuilder::new().from_path(&tmp_path)?;
            let mut header: Vec<&str> = KNOWN_COLUMNS.to_vec();
            header.extend(self.extra_columns.iter().map(String::as_str));
            writer.write_record(&header)?;

            for row in &self.rows {
                let mut record: Vec<String> = vec![
                    row.id.as_str().to_string(),
                    row.name.clone(),
                    row.training_command.clone(),
                    row.training_check.as_cell().to_string(),
                    row.wandb_run_id.clone(),
                    row.weight_file.clone(),
                    row.gpu_id.clone().unwrap_or_default(),
                    row.pretrained_model_id.clone().unwrap_or_default(),
                ];
                for col in &self.extra_columns {
                    record.push(row.extra.get(col).cloned().unwrap_or_default());
                }
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
