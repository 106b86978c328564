// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Weight Resolver (§4.5): turns a row's `PretrainedModelId` into an
//! absolute path to a checkpoint file, or a verdict that the admitting row's
//! reference should be marked unresolved.
//!
//! Grounded on `main_training_manager.py`'s `_find_pretrained_weight_file` /
//! `_find_best_weight_file`: resolve the referenced row's `WeightFile` cell
//! as a directory (absolute, or relative to the configured base directory),
//! then pick the `model_<loss>_<index>.pth` file with the lowest loss.

use regex::Regex;
use std::path::{Path, PathBuf};
use tms_core::ExperimentRow;

static WEIGHT_FILE_PATTERN: &str = r"^model_([0-9.]+)_([0-9]+)\.pth$";

/// Outcome of resolving one `PretrainedModelId` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The referenced row doesn't exist, or has no `WeightFile` set. Nothing
    /// to negate: there was never a directory to fail to find.
    NoReference,
    /// The `WeightFile` directory doesn't exist on disk. The caller should
    /// negate the admitting row's `PretrainedModelId` so later ticks skip it.
    DirectoryMissing,
    /// A checkpoint file was chosen; `.0` is its absolute path.
    Resolved(PathBuf),
}

/// Resolve `pretrained_id` against `rows`, using `base_dir` to make a
/// relative `WeightFile` cell absolute (§4.5 steps 1-2).
pub fn resolve(rows: &[ExperimentRow], pretrained_id: &str, base_dir: &Path) -> Resolution {
    let Some(row) = rows.iter().find(|r| r.id.as_str() == pretrained_id) else {
        return Resolution::NoReference;
    };
    if row.weight_file.trim().is_empty() {
        return Resolution::NoReference;
    }

    let candidate = PathBuf::from(&row.weight_file);
    let weight_dir = if candidate.is_absolute() {
        candidate
    } else {
        base_dir.join(candidate)
    };

    if !weight_dir.is_dir() {
        return Resolution::DirectoryMissing;
    }

    match find_best_weight_file(&weight_dir) {
        Some(path) => Resolution::Resolved(path),
        None => Resolution::NoReference,
    }
}

/// Enumerate `.pth` files in `dir` and pick the one with the lowest loss
/// encoded in its filename (§4.5 steps 4-5).
fn find_best_weight_file(dir: &Path) -> Option<PathBuf> {
    #[allow(clippy::expect_used)]
    let pattern = Regex::new(WEIGHT_FILE_PATTERN).expect("constructed pattern is valid regex");

    let entries = std::fs::read_dir(dir).ok()?;
    let mut weight_files: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".pth") {
            weight_files.push(name);
        }
    }
    if weight_files.is_empty() {
        return None;
    }
    weight_files.sort();

    let mut best: Option<(&str, f64)> = None;
    for name in &weight_files {
        let Some(captures) = pattern.captures(name) else {
            continue;
        };
        let Ok(loss) = captures[1].parse::<f64>() else {
            continue;
        };
        let is_better = match best {
            Some((_, lowest)) => loss < lowest,
            None => true,
        };
        if is_better {
            best = Some((name, loss));
        }
    }

    if let Some((name, _)) = best {
        return Some(dir.join(name));
    }

    tracing::warn!(
        dir = %dir.display(),
        file = %weight_files[0],
        "no weight file in directory matches the loss pattern, selecting the first one"
    );
    Some(dir.join(&weight_files[0]))
}

#[cfg(test)]
#[path = "weight_resolver_tests.rs"]
mod tests;
