//! Result cache and discovery history collaborators.
//!
//! The engine only talks to the [`ResultCache`] and [`HistoryStore`] traits;
//! the in-memory and file-backed implementations here cover the standalone
//! binary and tests.

mod cache;
mod history;
mod stats;

pub use cache::MemoryCache;
pub use history::{JsonFileHistory, MemoryHistory};
pub use stats::{AlgorithmStats, PerformanceStats};

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::schema::DiscoveryRecord;

/// Collaborator failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Fingerprint-keyed cache of finished discoveries.
pub trait ResultCache: Send + Sync {
    fn get(&self, fingerprint: &str) -> Result<Option<DiscoveryRecord>, StoreError>;

    fn set(&self, fingerprint: &str, record: &DiscoveryRecord, ttl: Duration)
    -> Result<(), StoreError>;
}

/// Append-only log of discoveries.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: &DiscoveryRecord) -> Result<(), StoreError>;

    /// Up to `limit` records, most recent first.
    fn query(&self, limit: usize) -> Result<Vec<DiscoveryRecord>, StoreError>;

    /// Write the full history to `path` as a JSON array, oldest first.
    fn export(&self, path: &Path) -> Result<usize, StoreError> {
        let mut records = self.query(usize::MAX)?;
        records.reverse();
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(path, json)?;
        Ok(records.len())
    }

    /// Append every record of a JSON array written by [`HistoryStore::export`].
    ///
    /// Records with out-of-range scores or timings are skipped; returns the
    /// number appended.
    fn import(&self, path: &Path) -> Result<usize, StoreError> {
        let content = fs::read_to_string(path)?;
        let records: Vec<DiscoveryRecord> = serde_json::from_str(&content)?;
        let mut imported = 0;
        for (index, record) in records.iter().enumerate() {
            if let Some(reason) = record.invalid_reason() {
                log::warn!("{}[{index}]: skipping record: {reason}", path.display());
                continue;
            }
            self.append(record)?;
            imported += 1;
        }
        Ok(imported)
    }
}
