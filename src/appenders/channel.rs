//! Channel appender implementation
//!
//! Hands entries to another thread over a bounded crossbeam channel, for
//! hosts whose log output side runs on its own worker.

use crate::core::{Appender, LogEntry, Result, TlsLogError};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

pub struct ChannelAppender {
    sender: Sender<LogEntry>,
    dropped: u64,
}

impl ChannelAppender {
    /// Create an appender and the receiving end of its channel
    pub fn bounded(capacity: usize) -> (Self, Receiver<LogEntry>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender, dropped: 0 }, receiver)
    }

    /// Number of entries refused because the channel was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Appender for ChannelAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        match self.sender.try_send(entry.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                Err(TlsLogError::appender(
                    self.name(),
                    format!("channel full, {} entries dropped", self.dropped),
                ))
            }
            Err(TrySendError::Disconnected(_)) => Err(TlsLogError::ChannelSendError),
        }
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "channel"
    }
}
