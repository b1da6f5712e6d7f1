//! Storage of generated predictions
//!
//! The engine hands every successful forecast to a [`PredictionSink`]. Sink
//! failures are logged by the engine and never reach the caller.

use crate::error::{ForecastError, Result};
use crate::models::ModelKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One stored prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Ticker the prediction is for
    pub ticker: String,
    /// Day the forecast was requested
    pub request_date: NaiveDate,
    /// Day the prediction is for
    pub target_date: NaiveDate,
    /// Predicted closing price
    pub predicted_price: f64,
    /// Lower edge of the confidence band
    pub confidence_lower: f64,
    /// Upper edge of the confidence band
    pub confidence_upper: f64,
    /// Model that produced the prediction
    pub model: ModelKind,
}

/// Destination for batches of predictions
pub trait PredictionSink: Send + Sync {
    /// Store a batch of records
    fn store(&self, records: &[PredictionRecord]) -> Result<()>;

    /// Short name used in log messages
    fn name(&self) -> &str;
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PredictionSink for NullSink {
    fn store(&self, _records: &[PredictionRecord]) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Sink that keeps records in memory
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<PredictionRecord>>,
}

impl InMemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<PredictionRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Check if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PredictionSink for InMemorySink {
    fn store(&self, records: &[PredictionRecord]) -> Result<()> {
        let mut stored = self
            .records
            .lock()
            .map_err(|_| ForecastError::PersistenceError("Sink lock poisoned".to_string()))?;
        stored.extend_from_slice(records);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Sink that appends one JSON object per record to a file
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    /// Append to `path`, creating it on first write
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Target file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record stored in a JSON lines file
    pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<PredictionRecord>> {
        let contents = std::fs::read_to_string(path)?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ForecastError::from))
            .collect()
    }
}

impl PredictionSink for JsonLinesSink {
    fn store(&self, records: &[PredictionRecord]) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                ForecastError::PersistenceError(format!("{}: {}", self.path.display(), e))
            })?;
        let mut writer = BufWriter::new(file);

        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
