//! Logger metrics for observability
//!
//! Counters for the pipeline: what was accepted and written, and how
//! often (and why) the buffer was flushed. Failures of implicit flushes are
//! only visible here.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_buffered_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_written();
///
/// assert_eq!(metrics.lines_enqueued(), 1);
/// assert_eq!(metrics.lines_written(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Lines accepted by the level gate and placed on the queue
    lines_enqueued: AtomicU64,

    /// Lines written into the buffered sink by the worker
    lines_written: AtomicU64,

    /// Lines lost because the queue was already closed
    lines_dropped: AtomicU64,

    /// Flushes fired by the debounce timer
    debounced_flushes: AtomicU64,

    /// Flushes forced because a line did not fit the buffer
    pressure_flushes: AtomicU64,

    /// Flushes requested through `Logger::flush`
    explicit_flushes: AtomicU64,

    /// Implicit flushes that failed and were swallowed
    flush_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            lines_enqueued: AtomicU64::new(0),
            lines_written: AtomicU64::new(0),
            lines_dropped: AtomicU64::new(0),
            debounced_flushes: AtomicU64::new(0),
            pressure_flushes: AtomicU64::new(0),
            explicit_flushes: AtomicU64::new(0),
            flush_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn lines_enqueued(&self) -> u64 {
        self.lines_enqueued.load(Ordering::Relaxed)
    }


    #[inline]
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lines_dropped(&self) -> u64 {
        self.lines_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn debounced_flushes(&self) -> u64 {
        self.debounced_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn pressure_flushes(&self) -> u64 {
        self.pressure_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn explicit_flushes(&self) -> u64 {
        self.explicit_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flush_failures(&self) -> u64 {
        self.flush_failures.load(Ordering::Relaxed)
    }

    /// Record a line placed on the queue
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.lines_enqueued.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a line written into the buffer
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.lines_written.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a line lost to a closed queue
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.lines_dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_debounced_flush(&self) -> u64 {
        self.debounced_flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_pressure_flush(&self) -> u64 {
        self.pressure_flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_explicit_flush(&self) -> u64 {
        self.explicit_flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush_failure(&self) -> u64 {
        self.flush_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Lines accepted but not yet written by the worker
    pub fn in_flight(&self) -> u64 {
        self.lines_enqueued().saturating_sub(self.lines_written())
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.lines_enqueued.store(0, Ordering::Relaxed);
        self.lines_written.store(0, Ordering::Relaxed);
        self.lines_dropped.store(0, Ordering::Relaxed);
        self.debounced_flushes.store(0, Ordering::Relaxed);
        self.pressure_flushes.store(0, Ordering::Relaxed);
        self.explicit_flushes.store(0, Ordering::Relaxed);
        self.flush_failures.store(0, Ordering::Relaxed);
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
            lines_enqueued: AtomicU64::new(self.lines_enqueued()),
            lines_written: AtomicU64::new(self.lines_written()),
            lines_dropped: AtomicU64::new(self.lines_dropped()),
            debounced_flushes: AtomicU64::new(self.debounced_flushes()),
            pressure_flushes: AtomicU64::new(self.pressure_flushes()),
            explicit_flushes: AtomicU64::new(self.explicit_flushes()),
            flush_failures: AtomicU64::new(self.flush_failures()),
        }
    }
}
