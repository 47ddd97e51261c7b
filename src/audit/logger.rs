//! Append-only JSONL audit log
//!
//! One committed change produces one batch of records. A batch is
//! serialized in full before anything touches the file, so a record that
//! cannot be encoded leaves the log unchanged.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{TallyError, TallyResult};

use super::entry::AuditEntry;

#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append the records of one change with a single write
    pub fn append(&self, entries: &[AuditEntry]) -> TallyResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut batch = String::new();
        for entry in entries {
            let line = serde_json::to_string(entry)
                .map_err(|e| TallyError::Json(format!("Failed to serialize audit entry: {}", e)))?;
            batch.push_str(&line);
            batch.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| TallyError::Io(format!("Failed to open audit log: {}", e)))?;
        file.write_all(batch.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| TallyError::Io(format!("Failed to write audit log: {}", e)))
    }

    /// All entries, oldest first
    pub fn read_all(&self) -> TallyResult<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        self.scan(|entry| entries.push(entry))?;
        Ok(entries)
    }

    /// The most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> TallyResult<Vec<AuditEntry>> {
        let mut tail = VecDeque::with_capacity(count.min(1024));
        self.scan(|entry| {
            if count == 0 {
                return;
            }
            if tail.len() == count {
                tail.pop_front();
            }
            tail.push_back(entry);
        })?;
        Ok(tail.into())
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Feed every record to `visit` in file order; blank lines are skipped
    fn scan(&self, mut visit: impl FnMut(AuditEntry)) -> TallyResult<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| TallyError::Io(format!("Failed to open audit log: {}", e)))?;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_num = index + 1;
            let line = line.map_err(|e| {
                TallyError::Io(format!("Failed to read audit log line {}: {}", line_num, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let entry = serde_json::from_str(&line).map_err(|e| {
                TallyError::Json(format!("Corrupt audit entry at line {}: {}", line_num, e))
            })?;
            visit(entry);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        let entry = AuditEntry::create(EntityType::Actor, "act-1", None, &json!({"name": "Reza"}));

        logger.append(&[entry]).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Actor);
    }

    #[test]
    fn test_read_recent_keeps_order() {
        let (logger, _temp) = create_test_logger();
        let entries: Vec<_> = (0..5)
            .map(|i| AuditEntry::create(EntityType::Entry, format!("ent-{}", i), None, &json!(i)))
            .collect();
        logger.append(&entries[..3]).unwrap();
        logger.append(&entries[3..]).unwrap();

        let recent = logger.read_recent(2).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["ent-3", "ent-4"]);
        assert_eq!(logger.read_recent(50).unwrap().len(), 5);
        assert!(logger.read_recent(0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let (logger, _temp) = create_test_logger();
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch_creates_no_file() {
        let (logger, _temp) = create_test_logger();
        logger.append(&[]).unwrap();
        assert!(!logger.path().exists());
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let (logger, _temp) = create_test_logger();
        std::fs::write(logger.path(), "{not json}\n").unwrap();

        let err = logger.read_all().unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
