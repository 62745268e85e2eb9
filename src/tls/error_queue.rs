//! TLS library error queue abstraction

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::num::NonZeroU64;

/// Packed library error code; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(NonZeroU64);

impl ErrorCode {
    /// Returns `None` for 0, which the library uses for "no error"
    pub const fn new(code: u64) -> Option<Self> {
        match NonZeroU64::new(code) {
            Some(code) => Some(ErrorCode(code)),
            None => None,
        }
    }

    pub const fn get(&self) -> u64 {
        self.0.get()
    }

    /// Library number packed in bits 23..31
    pub const fn library(&self) -> u32 {
        ((self.0.get() >> 23) & 0xFF) as u32
    }

    /// Reason number packed in bits 0..23
    pub const fn reason(&self) -> u32 {
        (self.0.get() & 0x7F_FFFF) as u32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0.get())
    }
}

/// One entry popped from the error queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub file: String,
    pub line: u32,
    pub data: Option<String>,
    pub has_string_data: bool,
}

impl ErrorRecord {
    pub fn new(code: ErrorCode, file: impl Into<String>, line: u32) -> Self {
        Self {
            code,
            file: file.into(),
            line,
            data: None,
            has_string_data: false,
        }
    }

    /// Attach printable data to the record
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self.has_string_data = true;
        self
    }

    /// Data attached to the record, if flagged as printable
    pub fn string_data(&self) -> Option<&str> {
        if self.has_string_data {
            self.data.as_deref()
        } else {
            None
        }
    }
}

/// Per-context queue of diagnostics raised by the TLS library
pub trait ErrorQueue {
    /// Remove and return the oldest record
    fn pop_error(&mut self) -> Option<ErrorRecord>;

    /// Whether any record is queued, without consuming it
    fn peek_error(&self) -> bool;

    /// Human-readable description of `code`
    fn describe(&self, code: ErrorCode) -> String {
        format!(
            "error:{}:lib({})::reason({})",
            code,
            code.library(),
            code.reason()
        )
    }

    /// Discard every queued record, returning how many were dropped
    fn clear(&mut self) -> usize {
        let mut cleared = 0;
        while self.pop_error().is_some() {
            cleared += 1;
        }
        cleared
    }
}

/// In-memory error queue with a registry of reason strings
///
/// # Example
///
/// ```
/// use tls_log_adapter::tls::{ErrorCode, ErrorQueue, MemoryErrorQueue};
///
/// let code = ErrorCode::new(0x0A00_0086).unwrap();
/// let mut queue = MemoryErrorQueue::new()
///     .with_reason(code, "certificate verify failed");
/// queue.push_error(code, "ssl/statem/statem_clnt.c", 1889);
///
/// assert!(queue.peek_error());
/// assert_eq!(queue.describe(code), "error:0A000086:lib(20)::certificate verify failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryErrorQueue {
    records: VecDeque<ErrorRecord>,
    reasons: HashMap<ErrorCode, String>,
}

impl MemoryErrorQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the description used for `code`
    #[must_use]
    pub fn with_reason(mut self, code: ErrorCode, reason: impl Into<String>) -> Self {
        self.reasons.insert(code, reason.into());
        self
    }

    pub fn push(&mut self, record: ErrorRecord) {
        self.records.push_back(record);
    }

    pub fn push_error(&mut self, code: ErrorCode, file: impl Into<String>, line: u32) {
        self.push(ErrorRecord::new(code, file, line));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ErrorQueue for MemoryErrorQueue {
    fn pop_error(&mut self) -> Option<ErrorRecord> {
        self.records.pop_front()
    }

    fn peek_error(&self) -> bool {
        !self.records.is_empty()
    }

    fn describe(&self, code: ErrorCode) -> String {
        match self.reasons.get(&code) {
            Some(reason) => format!("error:{}:lib({})::{}", code, code.library(), reason),
            None => format!(
                "error:{}:lib({})::reason({})",
                code,
                code.library(),
                code.reason()
            ),
        }
    }

    fn clear(&mut self) -> usize {
        let cleared = self.records.len();
        self.records.clear();
        cleared
    }
}
