//! File-backed notification outbox.
//!
//! Headless hosts (the CLI) have no OS notification service to hand alerts
//! to. The outbox stands in for one: scheduled alerts are written to a JSON
//! file and delivered by whichever process next finds them due.

use std::path::{Path, PathBuf};

use super::dispatcher::{
    DailyEntry, MemoryDispatcher, NotificationDispatcher, PendingAlert, ScheduledId,
};
use super::reminder::ReminderTime;
use super::schedule::ScheduleItem;
use crate::error::{DeliveryError, Result};
use crate::storage::data_dir;

const OUTBOX_FILE: &str = "outbox.json";

/// Write-through dispatcher persisted at `outbox.json` in the data dir.
#[derive(Debug)]
pub struct Outbox {
    inner: MemoryDispatcher,
    path: PathBuf,
}

impl Outbox {
    /// Open the outbox in the data directory, loading any pending entries.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(OUTBOX_FILE);
        let mut outbox = Self::new_with_path(path);
        outbox.load()?;
        Ok(outbox)
    }

    /// Create an empty outbox at a specific path (for testing).
    pub fn new_with_path(path: PathBuf) -> Self {
        Self {
            inner: MemoryDispatcher::new(),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace in-memory entries with the file's contents. A missing file is
    /// an empty outbox.
    pub fn load(&mut self) -> Result<()> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                self.inner = serde_json::from_str(&content)?;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.inner = MemoryDispatcher::new();
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.inner)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn pending(&self) -> &[PendingAlert] {
        self.inner.pending()
    }

    pub fn daily(&self) -> &[DailyEntry] {
        self.inner.daily()
    }

    /// Remove and return alerts that are due at `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> Result<Vec<PendingAlert>> {
        let due = self.inner.take_due(now_ms);
        if !due.is_empty() {
            self.persist()?;
        }
        Ok(due)
    }

    fn write_through(&self) -> std::result::Result<(), DeliveryError> {
        self.persist()
            .map_err(|e| DeliveryError::Unavailable(format!("{}: {e}", self.path.display())))
    }
}

impl NotificationDispatcher for Outbox {
    fn schedule_at(
        &mut self,
        item: &ScheduleItem,
        now_ms: u64,
    ) -> std::result::Result<Option<ScheduledId>, DeliveryError> {
        let id = self.inner.schedule_at(item, now_ms)?;
        if id.is_some() {
            self.write_through()?;
        }
        Ok(id)
    }

    fn schedule_daily(
        &mut self,
        time: ReminderTime,
        title: &str,
        body: &str,
    ) -> std::result::Result<ScheduledId, DeliveryError> {
        let id = self.inner.schedule_daily(time, title, body)?;
        self.write_through()?;
        Ok(id)
    }

    fn cancel(&mut self, id: &str) -> std::result::Result<(), DeliveryError> {
        self.inner.cancel(id)?;
        self.write_through()
    }

    fn cancel_all_scheduled(&mut self) -> std::result::Result<(), DeliveryError> {
        self.inner.cancel_all_scheduled()?;
        self.write_through()
    }
}
