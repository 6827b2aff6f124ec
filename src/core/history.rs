//! Conversion history: the record type, pair statistics and JSON persistence.

use crate::core::error::{ExchangeError, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One completed conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub timestamp: NaiveDateTime,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: f64,
    pub amount: f64,
    pub converted_amount: f64,
}

impl ConversionRecord {
    /// Builds a record stamped with the current local time.
    pub fn now(base: &str, target: &str, rate: f64, amount: f64, converted_amount: f64) -> Self {
        ConversionRecord {
            timestamp: Local::now().naive_local(),
            base_currency: base.to_string(),
            target_currency: target.to_string(),
            rate,
            amount,
            converted_amount,
        }
    }

    fn matches(&self, base: &str, target: &str) -> bool {
        self.base_currency == base && self.target_currency == target
    }
}

/// Aggregate figures over the recorded rates of a single pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub max_rate: f64,
    pub min_rate: f64,
    pub avg_rate: f64,
    pub count: usize,
}

/// Append-only, chronologically ordered list of conversions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<ConversionRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ConversionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, record: ConversionRecord) {
        self.records.push(record);
    }

    /// Drops the most recent record. Only used to undo an append whose
    /// save failed, so memory never runs ahead of the file.
    pub(crate) fn withdraw_last(&mut self) -> Option<ConversionRecord> {
        self.records.pop()
    }

    /// Max, min and mean rate over records for exactly `base -> target`.
    pub fn statistics(&self, base: &str, target: &str) -> Result<Statistics> {
        let rates: Vec<f64> = self
            .records
            .iter()
            .filter(|r| r.matches(base, target))
            .map(|r| r.rate)
            .collect();

        if rates.is_empty() {
            return Err(ExchangeError::NoData {
                base: base.to_string(),
                target: target.to_string(),
            });
        }

        let max_rate = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_rate = rates.iter().copied().fold(f64::INFINITY, f64::min);
        let avg_rate = rates.iter().sum::<f64>() / rates.len() as f64;

        Ok(Statistics {
            max_rate,
            min_rate,
            avg_rate,
            count: rates.len(),
        })
    }
}

/// The JSON file a [`History`] is loaded from and rewritten to.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        HistoryFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the history. A missing file is an empty history; a file that
    /// exists but cannot be read or parsed is `HistoryLoadFailed`.
    pub fn load(&self) -> Result<History> {
        if !self.path.exists() {
            debug!("No history file at {}", self.path.display());
            return Ok(History::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.load_failed(e))?;
        let history: History = serde_json::from_str(&content).map_err(|e| self.load_failed(e))?;
        debug!(
            "Loaded {} history records from {}",
            history.len(),
            self.path.display()
        );
        Ok(history)
    }

    /// Overwrites the file with the full history.
    pub fn save(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.save_failed(e))?;
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        history
            .serialize(&mut serializer)
            .map_err(|e| self.save_failed(e))?;

        fs::write(&self.path, buf).map_err(|e| self.save_failed(e))?;
        debug!(
            "Saved {} history records to {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load_failed(&self, e: impl std::fmt::Display) -> ExchangeError {
        ExchangeError::HistoryLoadFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn save_failed(&self, e: impl std::fmt::Display) -> ExchangeError {
        ExchangeError::HistorySaveFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}
