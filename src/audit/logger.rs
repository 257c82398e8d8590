//! Append-only JSONL audit log
//!
//! Appends take the same advisory `FileLock` as the data files, keyed on the
//! log path, so lines from concurrent processes never interleave.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};
use crate::storage::file_io::FileLock;

use super::entry::AuditEntry;

/// Writes and reads `AuditEntry` lines
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry and sync it to disk
    pub fn log(&self, entry: &AuditEntry) -> LedgerResult<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| LedgerError::Json(format!("audit entry: {}", e)))?;
        line.push('\n');

        let _lock = FileLock::exclusive(&self.log_path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .and_then(|mut file| {
                file.write_all(line.as_bytes())?;
                Ok(file)
            })
            .map_err(|e| self.io_error("append to", e))?;
        file.sync_data().map_err(|e| self.io_error("sync", e))?;

        Ok(())
    }

    /// Every entry, oldest first
    pub fn read_all(&self) -> LedgerResult<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        self.for_each_entry(|entry| entries.push(entry))?;
        Ok(entries)
    }

    /// The newest `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> LedgerResult<Vec<AuditEntry>> {
        let mut window = VecDeque::with_capacity(count);
        self.for_each_entry(|entry| {
            if count == 0 {
                return;
            }
            if window.len() == count {
                window.pop_front();
            }
            window.push_back(entry);
        })?;
        Ok(window.into())
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn for_each_entry(&self, mut visit: impl FnMut(AuditEntry)) -> LedgerResult<()> {
        let contents = match fs::read_to_string(&self.log_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(self.io_error("read", e)),
        };

        for (idx, line) in contents.lines().enumerate() {
            if let Some(entry) = parse_line(idx + 1, line)? {
                visit(entry);
            }
        }
        Ok(())
    }

    fn io_error(&self, action: &str, err: io::Error) -> LedgerError {
        LedgerError::Io(format!(
            "could not {} audit log {}: {}",
            action,
            self.log_path.display(),
            err
        ))
    }
}

/// Blank lines are skipped
fn parse_line(line_num: usize, line: &str) -> LedgerResult<Option<AuditEntry>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| LedgerError::Json(format!("audit log line {}: {}", line_num, e)))
}
