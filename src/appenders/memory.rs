//! In-memory capture appender

use crate::core::{Appender, LogEntry, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Appender that keeps every entry in memory.
///
/// Created together with a [`MemoryRecords`] handle that stays readable after
/// the appender has been moved into a `Logger`.
pub struct MemoryAppender {
    records: MemoryRecords,
}

/// Shared read handle over the entries captured by a [`MemoryAppender`]
#[derive(Clone, Default)]
pub struct MemoryRecords {
    inner: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryAppender {
    pub fn new() -> (Self, MemoryRecords) {
        let records = MemoryRecords::default();
        (
            Self {
                records: records.clone(),
            },
            records,
        )
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        self.records.inner.lock().push(entry.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl MemoryRecords {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.inner.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Remove and return everything captured so far
    pub fn take(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
