//! JSON Lines recorder for cycle data.
//!
//! One line per instrument per cycle, append mode with daily file rotation.
//! Each line is an independent JSON object, so an interrupted write only
//! ever corrupts a single row.

use crate::error::TelemetryResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// One instrument's state at one control-loop cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub timestamp_ms: i64,
    pub cycle: u64,
    pub instrument: String,
    /// Theoretical price; absent for the underlying row.
    pub theoretical: Option<f64>,
    /// Smoothed credit quoted this cycle.
    pub credit: Option<f64>,
    /// Lot size quoted per side.
    pub quoted_volume: Option<i64>,
    pub position: i64,
    /// Black-Scholes delta; absent when pricing was skipped.
    pub delta: Option<f64>,
    /// Aggregate portfolio delta at cycle start.
    pub total_delta: f64,
    /// Session profit-and-loss as reported by the exchange.
    pub pnl: Option<f64>,
}

struct ActiveWriter {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

/// Buffered JSON Lines writer with daily rotation.
pub struct JsonLinesRecorder {
    base_dir: PathBuf,
    buffer: Vec<CycleRecord>,
    max_buffer_size: usize,
    active: Option<ActiveWriter>,
}

impl JsonLinesRecorder {
    /// Create a recorder writing under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>, max_buffer_size: usize) -> Self {
        let base_dir = base_dir.into();
        if let Err(e) = std::fs::create_dir_all(&base_dir) {
            warn!(?e, dir = %base_dir.display(), "Failed to create record directory");
        }
        Self {
            base_dir,
            buffer: Vec::with_capacity(max_buffer_size),
            max_buffer_size,
            active: None,
        }
    }

    /// Buffer a record, flushing when the buffer is full.
    pub fn add_record(&mut self, record: CycleRecord) -> TelemetryResult<()> {
        self.buffer.push(record);
        if self.buffer.len() >= self.max_buffer_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Write all buffered records to the current daily file.
    pub fn flush(&mut self) -> TelemetryResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let date = Utc::now().format("%Y-%m-%d").to_string();
        if self.active.as_ref().map(|a| a.date != date).unwrap_or(true) {
            self.rotate(&date)?;
        }

        // The rotate above guarantees an active writer here.
        if let Some(active) = self.active.as_mut() {
            for record in self.buffer.drain(..) {
                serde_json::to_writer(&mut active.writer, &record)?;
                active.writer.write_all(b"\n")?;
                active.records_written += 1;
            }
            active.writer.flush()?;
        }
        Ok(())
    }

    fn rotate(&mut self, date: &str) -> TelemetryResult<()> {
        if let Some(mut old) = self.active.take() {
            if let Err(e) = old.writer.flush() {
                warn!(?e, "Failed to flush recorder on rotation");
            }
            info!(
                date = %old.date,
                records = old.records_written,
                "Closed cycle record file"
            );
        }

        let path = self.base_dir.join(format!("cycles_{date}.jsonl"));
        info!(path = %path.display(), "Opening cycle record file (append mode)");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.active = Some(ActiveWriter {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        });
        Ok(())
    }
}

impl Drop for JsonLinesRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(?e, "Failed to flush recorder on drop");
        }
    }
}
