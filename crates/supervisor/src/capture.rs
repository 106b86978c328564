// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream capture workers (§4.3.2), grounded on `process_manager.py`'s
//! `_read_output_stream()`: read byte-by-byte (not line-buffered) so
//! in-place progress-bar rewrites using `\r` land in the log file exactly as
//! emitted, while a separate per-stream line buffer is used only for the
//! wandb run-id/run-name parse.

use crate::command::{extract_run_id, extract_run_name};
use crate::record::ProcessRecord;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};

/// Which stream this worker is reading; only stderr is parsed for wandb
/// discoveries, matching the original (stdout is logged but not scanned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Drain `reader` into `log_path`, parsing completed stderr lines for a
/// wandb run id / run name. Runs until EOF; parse failures are logged at
/// debug level and otherwise ignored (§4.3.2: "best-effort").
pub async fn capture_stream<R>(
    mut reader: R,
    log_path: std::path::PathBuf,
    record: Arc<ProcessRecord>,
    kind: StreamKind,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    // Appends onto the header `write_log_header` already wrote to this path;
    // re-creating the file here would discard it before the first byte lands.
    let file = OpenOptions::new().create(true).append(true).open(&log_path).await?;
    let mut writer = BufWriter::new(file);
    let mut line_buffer: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        let n = reader.read(&mut byte).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&byte).await?;
        writer.flush().await?;

        if byte[0] == b'\n' {
            if kind == StreamKind::Stderr {
                parse_line(&String::from_utf8_lossy(&line_buffer), &record);
            }
            line_buffer.clear();
        } else {
            line_buffer.push(byte[0]);
        }
    }

    writer.flush().await?;
    Ok(())
}

fn parse_line(line: &str, record: &ProcessRecord) {
    if let Some(run_id) = extract_run_id(line) {
        let mut discovered = record.discovered.lock();
        discovered.set_run_id_once(run_id.clone());
        drop(discovered);
        tracing::info!(row_id = %record.row_id, run_id, "discovered wandb run id");
    }
    if let Some(run_name) = extract_run_name(line) {
        let mut discovered = record.discovered.lock();
        discovered.set_run_name_once(run_name.clone());
        drop(discovered);
        tracing::info!(row_id = %record.row_id, run_name, "discovered wandb run name");
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
