//! Error-message slot with stacked supplementary messages

use parking_lot::{const_mutex, Mutex};

static GLOBAL: ErrorBuffer = ErrorBuffer::new();

/// Primary error message followed by stacked detail messages
///
/// `set` starts a new error, `push` adds detail to it. The process-wide
/// instance from [`ErrorBuffer::global`] is shared by every thread.
#[derive(Debug)]
pub struct ErrorBuffer {
    messages: Mutex<Vec<String>>,
}

impl ErrorBuffer {
    pub const fn new() -> Self {
        Self {
            messages: const_mutex(Vec::new()),
        }
    }

    pub fn global() -> &'static ErrorBuffer {
        &GLOBAL
    }

    /// Replace the slot with a single primary message
    pub fn set(&self, message: impl Into<String>) {
        let mut messages = self.messages.lock();
        messages.clear();
        messages.push(message.into());
    }

    /// Stack a supplementary message
    pub fn push(&self, message: impl Into<String>) {
        self.messages.lock().push(message.into());
    }

    /// The primary message
    pub fn message(&self) -> Option<String> {
        self.messages.lock().first().cloned()
    }

    /// Primary message first, then stacked messages in push order
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Default for ErrorBuffer {
    fn default() -> Self {
        Self::new()
    }
}
