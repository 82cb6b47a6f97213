use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::HistoryStoreError;
use crate::replay::replay_commands;
use crate::schema::HistoryRecord;

/// Append-only command history backed by a JSON-lines file.
///
/// Invariant: `commands` mirrors the well-formed lines of the file plus every
/// line appended through this store, in order.
pub struct HistoryStore {
    path: PathBuf,
    file: File,
    pid: u32,
    commands: Vec<String>,
}

impl HistoryStore {
    /// Opens `path`, creating it when absent, and replays its commands.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryStoreError> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|source| HistoryStoreError::io("opening history file", &path, source))?;

        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .map_err(|source| HistoryStoreError::io("reading history file", &path, source))?;
        let commands = replay_commands(&String::from_utf8_lossy(&raw));
        tracing::debug!(path = %path.display(), entries = commands.len(), "history loaded");

        Ok(Self {
            path,
            file,
            pid: std::process::id(),
            commands,
        })
    }

    /// Persists one record and mirrors it in memory. The line is written and
    /// flushed before this returns.
    pub fn append(&mut self, command: &str) -> Result<HistoryRecord, HistoryStoreError> {
        let record = HistoryRecord::now(self.pid, command)?;
        let mut line = serde_json::to_string(&record)
            .map_err(|source| HistoryStoreError::json_serialize(&self.path, source))?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|source| HistoryStoreError::io("appending history line", &self.path, source))?;

        self.commands.push(record.command.clone());
        Ok(record)
    }

    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
