//! Metrics for observability
//!
//! Counters for the host log facility (`LoggerMetrics`) and for the TLS
//! adapters feeding it (`AdapterMetrics`): emitted lines, skipped empty
//! lines, bytes lost to degraded mode and adapter lifecycle events.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the host log facility
///
/// # Example
///
/// ```
/// use tls_log_adapter::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Number of records at least one appender failed to write
    dropped_count: AtomicU64,

    /// Total number of records written by every appender
    total_logged: AtomicU64,

    /// Number of records suppressed by a debug level gate
    filtered_count: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
            filtered_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    /// Record a dropped log, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no logs have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_logged.store(0, Ordering::Relaxed);
        self.filtered_count.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
            filtered_count: AtomicU64::new(self.filtered_count()),
        }
    }
}

/// Metrics for the log BIOs of one or more execution contexts
#[derive(Debug)]
pub struct AdapterMetrics {
    lines_emitted: AtomicU64,
    empty_lines_skipped: AtomicU64,
    bytes_dropped: AtomicU64,
    lines_truncated: AtomicU64,
    partials_discarded: AtomicU64,
    bios_created: AtomicU64,
    bios_released: AtomicU64,
}

impl AdapterMetrics {
    pub const fn new() -> Self {
        Self {
            lines_emitted: AtomicU64::new(0),
            empty_lines_skipped: AtomicU64::new(0),
            bytes_dropped: AtomicU64::new(0),
            lines_truncated: AtomicU64::new(0),
            partials_discarded: AtomicU64::new(0),
            bios_created: AtomicU64::new(0),
            bios_released: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn lines_emitted(&self) -> u64 {
        self.lines_emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn empty_lines_skipped(&self) -> u64 {
        self.empty_lines_skipped.load(Ordering::Relaxed)
    }

    /// Bytes accepted from the library but lost to an overlong line
    #[inline]
    pub fn bytes_dropped(&self) -> u64 {
        self.bytes_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lines_truncated(&self) -> u64 {
        self.lines_truncated.load(Ordering::Relaxed)
    }

    /// Unterminated fragments thrown away when a BIO was rebound
    #[inline]
    pub fn partials_discarded(&self) -> u64 {
        self.partials_discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bios_created(&self) -> u64 {
        self.bios_created.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bios_released(&self) -> u64 {
        self.bios_released.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_line(&self) -> u64 {
        self.lines_emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_empty_line(&self) -> u64 {
        self.empty_lines_skipped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_bytes_dropped(&self, count: usize) -> u64 {
        self.bytes_dropped.fetch_add(count as u64, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_truncated(&self) -> u64 {
        self.lines_truncated.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_partial_discarded(&self) -> u64 {
        self.partials_discarded.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_created(&self) -> u64 {
        self.bios_created.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_released(&self) -> u64 {
        self.bios_released.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of BIOs created but not yet torn down
    pub fn live_bios(&self) -> u64 {
        self.bios_created().saturating_sub(self.bios_released())
    }
}

impl Default for AdapterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AdapterMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            lines_emitted: AtomicU64::new(self.lines_emitted()),
            empty_lines_skipped: AtomicU64::new(self.empty_lines_skipped()),
            bytes_dropped: AtomicU64::new(self.bytes_dropped()),
            lines_truncated: AtomicU64::new(self.lines_truncated()),
            partials_discarded: AtomicU64::new(self.partials_discarded()),
            bios_created: AtomicU64::new(self.bios_created()),
            bios_released: AtomicU64::new(self.bios_released()),
        }
    }
}
