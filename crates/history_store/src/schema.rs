use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::HistoryStoreError;

/// One persisted line of the history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub pid: u32,
    /// RFC 3339 timestamp of the commit.
    pub date: String,
    pub command: String,
}

impl HistoryRecord {
    #[must_use]
    pub fn new(pid: u32, date: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            pid,
            date: date.into(),
            command: command.into(),
        }
    }

    /// Stamps `command` with the current UTC time.
    pub fn now(pid: u32, command: impl Into<String>) -> Result<Self, HistoryStoreError> {
        let date = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(HistoryStoreError::ClockFormat)?;
        Ok(Self::new(pid, date, command))
    }
}

/// Replay only needs the command; other fields may be missing or malformed.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredCommand {
    pub(crate) command: String,
}
