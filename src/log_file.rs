//! Append-only diagnostic log file.
//!
//! Lines are buffered in memory with a local timestamp prefix and written to
//! disk only when [`LogFile::save`] is called.

use crate::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Buffered sink of timestamped text lines, shareable behind an `Arc`.
#[derive(Debug)]
pub struct LogFile {
    file_name: PathBuf,
    lines: Mutex<Vec<String>>,
}

impl LogFile {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn set_file_name(&mut self, file_name: impl Into<PathBuf>) {
        self.file_name = file_name.into();
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Buffer `message` as `[YYYY-MM-DD HH:MM:SS] message`.
    pub fn add_message(&self, message: impl AsRef<str>) {
        let line = format!(
            "[{}] {}",
            Local::now().format(TIMESTAMP_FORMAT),
            message.as_ref()
        );
        self.lock_lines().push(line);
    }

    /// Number of buffered lines not yet saved.
    pub fn pending(&self) -> usize {
        self.lock_lines().len()
    }

    /// Append every buffered line to the file, then clear the buffer.
    ///
    /// The buffer lock is held across the write, so saves are exclusive and
    /// no line added meanwhile is lost. An empty buffer leaves the file
    /// untouched. On I/O failure the buffer is kept for a later attempt.
    pub fn save(&self) -> Result<()> {
        let mut lines = self.lock_lines();
        if lines.is_empty() {
            return Ok(());
        }

        let mut content = String::new();
        for line in lines.iter() {
            content.push_str(line);
            content.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_name)?;
        file.write_all(content.as_bytes())?;

        debug!(
            file = %self.file_name.display(),
            lines = lines.len(),
            "log buffer flushed"
        );
        lines.clear();
        Ok(())
    }

    fn lock_lines(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
