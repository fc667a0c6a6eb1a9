//! Discovery history stores.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::schema::DiscoveryRecord;

use super::{HistoryStore, StoreError};

/// Bounded in-memory history; the oldest records fall off first.
#[derive(Debug)]
pub struct MemoryHistory {
    records: Mutex<Vec<DiscoveryRecord>>,
    max_size: usize,
}

impl MemoryHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            max_size: max_size.max(1),
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, record: &DiscoveryRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.len() >= self.max_size {
            records.remove(0);
        }
        records.push(record.clone());
        Ok(())
    }

    fn query(&self, limit: usize) -> Result<Vec<DiscoveryRecord>, StoreError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

/// JSON-lines file, one record per line, appended in creation order.
#[derive(Debug)]
pub struct JsonFileHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileHistory {
    /// Open (creating parent directories as needed).
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileHistory {
    fn append(&self, record: &DiscoveryRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn query(&self, limit: usize) -> Result<Vec<DiscoveryRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DiscoveryRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("{}:{}: skipping bad record: {e}", self.path.display(), number + 1),
            }
        }
        Ok(records.into_iter().rev().take(limit).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::{Implementation, ProblemType};
    use chrono::Utc;
    use std::collections::BTreeMap;

    pub(crate) fn record(algorithm: &str, fitness: f64) -> DiscoveryRecord {
        DiscoveryRecord {
            algorithm: algorithm.to_string(),
            problem_type: ProblemType::Sorting,
            input_size: 1000,
            fitness_score: fitness,
            time_complexity: "O(n log n)".into(),
            space_complexity: "O(n)".into(),
            estimated_time: 0.001,
            implementation: Implementation {
                candidate: algorithm.to_string(),
                parameters: BTreeMap::new(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_memory_history_order_and_limit() {
        let history = MemoryHistory::new(2);
        history.append(&record("a", 0.1)).unwrap();
        history.append(&record("b", 0.2)).unwrap();
        history.append(&record("c", 0.3)).unwrap();

        let recent: Vec<_> = history
            .query(10)
            .unwrap()
            .into_iter()
            .map(|r| r.algorithm)
            .collect();
        assert_eq!(recent, vec!["c", "b"]);
        assert_eq!(history.query(1).unwrap().len(), 1);
    }

    #[test]
    fn test_file_history_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let history = JsonFileHistory::open(dir.path().join("nested/history.jsonl")).unwrap();
        assert!(history.query(5).unwrap().is_empty());

        history.append(&record("quicksort", 0.7)).unwrap();
        history.append(&record("mergesort", 0.9)).unwrap();

        let recent = history.query(5).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].algorithm, "mergesort");

        // Reopening sees the same records.
        let reopened = JsonFileHistory::open(history.path()).unwrap();
        assert_eq!(reopened.query(1).unwrap()[0].algorithm, "mergesort");
    }

    #[test]
    fn test_file_history_skips_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let history = JsonFileHistory::open(&path).unwrap();
        history.append(&record("heapsort", 0.5)).unwrap();
        fs::write(
            &path,
            format!("{}\nnot json\n", fs::read_to_string(&path).unwrap().trim()),
        )
        .unwrap();
        assert_eq!(history.query(10).unwrap().len(), 1);
    }

    #[test]
    fn test_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemoryHistory::default();
        source.append(&record("a", 0.1)).unwrap();
        source.append(&record("b", 0.2)).unwrap();

        let export = dir.path().join("export.json");
        assert_eq!(source.export(&export).unwrap(), 2);

        let target = JsonFileHistory::open(dir.path().join("h.jsonl")).unwrap();
        assert_eq!(target.import(&export).unwrap(), 2);
        let names: Vec<_> = target
            .query(10)
            .unwrap()
            .into_iter()
            .map(|r| r.algorithm)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_import_skips_out_of_range_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut inflated = record("a", 0.5);
        inflated.fitness_score = 3.0;
        let mut negative = record("b", 0.5);
        negative.estimated_time = -1.0;
        let good = record("c", 0.5);

        let path = dir.path().join("import.json");
        fs::write(&path, serde_json::to_string(&vec![inflated, negative, good]).unwrap()).unwrap();

        let history = MemoryHistory::default();
        assert_eq!(history.import(&path).unwrap(), 1);
        let kept = history.query(10).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].algorithm, "c");
    }

    #[test]
    fn test_import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not an array").unwrap();
        assert!(matches!(
            MemoryHistory::default().import(&path),
            Err(StoreError::Serde(_))
        ));
    }
}
