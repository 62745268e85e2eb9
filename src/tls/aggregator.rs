//! Line aggregation for fragmented BIO writes
//!
//! TLS libraries write trace output in arbitrary fragments: a single line may
//! arrive over several writes, and a single write may carry several lines.
//! `LineAggregator` buffers the fragments and yields complete lines, keeping
//! at most one pending line in memory.

use crate::core::{AdapterConfig, AdapterMetrics};
use std::sync::Arc;

/// Byte that terminates a line
pub const LINE_TERMINATOR: u8 = b'\n';

/// Bounded buffer turning byte fragments into complete lines.
///
/// Invariant: `cursor <= buffer.len() <= max_capacity`.
///
/// A line longer than `max_capacity - 1` bytes is truncated: its first
/// `max_capacity - 1` bytes are kept, the rest are dropped up to the next
/// terminator, and the kept prefix is emitted as one line. The result does not
/// depend on how the input was fragmented.
///
/// # Example
///
/// ```
/// use tls_log_adapter::tls::LineAggregator;
///
/// let mut aggregator = LineAggregator::new(16, 64);
/// let mut lines = Vec::new();
///
/// aggregator.feed(b"SSL_connect:before", |l| lines.push(l));
/// aggregator.feed(b" SSL initialization\n\nSSL_connect:SSLv3", |l| lines.push(l));
///
/// assert_eq!(lines, vec!["SSL_connect:before SSL initialization"]);
/// assert_eq!(aggregator.pending(), b"SSL_connect:SSLv3");
/// ```
#[derive(Debug)]
pub struct LineAggregator {
    buffer: Vec<u8>,
    cursor: usize,
    initial_capacity: usize,
    max_capacity: usize,
    /// Set while the bytes of an overlong line are being discarded
    truncating: bool,
    truncated_bytes: usize,
    truncations: u64,
    metrics: Option<Arc<AdapterMetrics>>,
}

impl LineAggregator {
    /// Create an aggregator; bounds are clamped to `1 <= initial <= max` and
    /// `max >= 2`
    pub fn new(initial_capacity: usize, max_capacity: usize) -> Self {
        let max_capacity = max_capacity.max(2);
        let initial_capacity = initial_capacity.clamp(1, max_capacity);
        Self {
            buffer: Vec::with_capacity(initial_capacity),
            cursor: 0,
            initial_capacity,
            max_capacity,
            truncating: false,
            truncated_bytes: 0,
            truncations: 0,
            metrics: None,
        }
    }

    pub fn from_config(config: &AdapterConfig) -> Self {
        Self::new(config.initial_capacity, config.max_capacity)
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<AdapterMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Buffer as much of `bytes` as fits, returning how many bytes were taken.
    ///
    /// Bytes belonging to an overlong line count as taken even though they are
    /// dropped. A return value below `bytes.len()` means the buffer is full:
    /// drain [`lines`](Self::lines) and push the remainder.
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        let mut taken = 0;

        if self.truncating {
            match bytes.iter().position(|&b| b == LINE_TERMINATOR) {
                None => {
                    self.drop_bytes(bytes.len());
                    return bytes.len();
                }
                Some(pos) => {
                    self.drop_bytes(pos);
                    self.finish_truncation();
                    taken = pos + 1;
                }
            }
        }

        let room = self.max_capacity - self.buffer.len();
        let take = room.min(bytes.len() - taken);
        if take > 0 {
            self.reserve_for(take);
            self.buffer.extend_from_slice(&bytes[taken..taken + take]);
        }

        taken + take
    }

    /// Complete lines not yet consumed, oldest first.
    ///
    /// Empty lines are skipped. Consumed bytes are compacted away when the
    /// iterator is dropped; lines left unread are yielded by the next call.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { aggregator: self }
    }

    /// Push `bytes` and hand every completed line to `emit`.
    ///
    /// Always returns `bytes.len()`: the writer is told everything was
    /// accepted even when part of an overlong line had to be dropped.
    pub fn feed<F>(&mut self, bytes: &[u8], mut emit: F) -> usize
    where
        F: FnMut(String),
    {
        let mut offset = 0;
        while offset < bytes.len() {
            offset += self.push(&bytes[offset..]);
            for line in self.lines() {
                emit(line);
            }
        }
        bytes.len()
    }

    /// Forget all buffered data and shrink back to the initial capacity.
    ///
    /// Returns `true` if an unterminated fragment (or unread line) was
    /// discarded.
    pub fn reset(&mut self) -> bool {
        let discarded = !self.pending().is_empty() || self.truncating;

        self.buffer.clear();
        self.buffer.shrink_to(self.initial_capacity);
        self.cursor = 0;
        self.truncating = false;
        self.truncated_bytes = 0;

        if discarded {
            if let Some(metrics) = &self.metrics {
                metrics.record_partial_discarded();
            }
        }
        discarded
    }

    /// Bytes buffered but not yet emitted
    pub fn pending(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Whether the current line overflowed and is being discarded
    pub fn is_truncating(&self) -> bool {
        self.truncating
    }

    /// Grow geometrically, never past `max_capacity`
    fn reserve_for(&mut self, additional: usize) {
        let needed = self.buffer.len() + additional;
        let capacity = self.buffer.capacity();
        if needed > capacity {
            let target = needed.max(capacity * 2).min(self.max_capacity).max(needed);
            self.buffer.reserve_exact(target - self.buffer.len());
        }
    }

    /// Discard consumed bytes; enter truncation if the pending line has
    /// filled the buffer without a terminator
    fn compact(&mut self) {
        if self.cursor > 0 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }

        let limit = self.max_capacity - 1;
        if !self.truncating
            && self.buffer.len() >= limit
            && !self.buffer.contains(&LINE_TERMINATOR)
        {
            let overflow = self.buffer.len() - limit;
            self.buffer.truncate(limit);
            self.truncating = true;
            self.drop_bytes(overflow);
        }
    }

    /// Terminate the truncated line so the next `lines()` emits its prefix
    fn finish_truncation(&mut self) {
        self.reserve_for(1);
        self.buffer.push(LINE_TERMINATOR);
        self.truncating = false;

        if self.truncated_bytes > 0 {
            self.truncations += 1;
            if let Some(metrics) = &self.metrics {
                metrics.record_truncated();
            }
            // Alert on first truncation and periodically thereafter
            if self.truncations == 1 || self.truncations % 1000 == 0 {
                eprintln!(
                    "[TLS LOG WARNING] Trace line exceeded {} bytes, {} bytes dropped \
                     ({} lines truncated so far)",
                    self.max_capacity - 1,
                    self.truncated_bytes,
                    self.truncations
                );
            }
        }
        self.truncated_bytes = 0;
    }

    fn drop_bytes(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.truncated_bytes += count;
        if let Some(metrics) = &self.metrics {
            metrics.record_bytes_dropped(count);
        }
    }
}

/// Iterator over completed lines, see [`LineAggregator::lines`]
pub struct Lines<'a> {
    aggregator: &'a mut LineAggregator,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let agg = &mut *self.aggregator;
        loop {
            let pos = agg.buffer[agg.cursor..]
                .iter()
                .position(|&b| b == LINE_TERMINATOR)?;
            let start = agg.cursor;
            agg.cursor = start + pos + 1;

            if pos == 0 {
                if let Some(metrics) = &agg.metrics {
                    metrics.record_empty_line();
                }
                continue;
            }

            if let Some(metrics) = &agg.metrics {
                metrics.record_line();
            }
            return Some(String::from_utf8_lossy(&agg.buffer[start..start + pos]).into_owned());
        }
    }
}

impl Drop for Lines<'_> {
    fn drop(&mut self) {
        self.aggregator.compact();
    }
}
