use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::foundation::error::{OverlayError, OverlayResult};

/// Source of local wall-clock time in Unix milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Parses an HTTP `Date` header (`Tue, 15 Nov 1994 08:12:31 GMT`) into Unix milliseconds.
pub fn parse_http_date(value: &str) -> OverlayResult<i64> {
    chrono::DateTime::parse_from_rfc2822(value.trim())
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| OverlayError::invalid_parameter(format!("bad http date {value:?}: {e}")))
}

/// Running estimate of `remote - local` clock offset, averaged over observed responses.
///
/// With no window every sample counts equally forever. A window keeps only the most recent
/// samples so that old latency spikes eventually stop biasing the estimate.
#[derive(Clone, Debug, Default)]
pub struct ClockSynchronizer {
    diffs: VecDeque<i64>,
    window: Option<usize>,
}

impl ClockSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: Option<usize>) -> Self {
        Self {
            diffs: VecDeque::new(),
            window: window.filter(|&w| w > 0),
        }
    }

    pub fn record_remote_timestamp(&mut self, remote_ms: i64, local_ms: i64) -> i64 {
        let diff = remote_ms - local_ms;
        if let Some(window) = self.window {
            while self.diffs.len() >= window {
                self.diffs.pop_front();
            }
        }
        self.diffs.push_back(diff);
        diff
    }

    pub fn record_date_header(&mut self, header: &str, local_ms: i64) -> OverlayResult<i64> {
        let remote_ms = parse_http_date(header)?;
        Ok(self.record_remote_timestamp(remote_ms, local_ms))
    }

    pub fn sample_count(&self) -> usize {
        self.diffs.len()
    }

    pub fn samples(&self) -> impl Iterator<Item = i64> + '_ {
        self.diffs.iter().copied()
    }

    /// Mean offset in milliseconds, or `None` before the first sample.
    pub fn average_offset_ms(&self) -> Option<f64> {
        if self.diffs.is_empty() {
            return None;
        }
        let sum: i128 = self.diffs.iter().map(|&d| i128::from(d)).sum();
        Some(sum as f64 / self.diffs.len() as f64)
    }

    /// Synchronized time in seconds. Falls back to plain local time until a sample exists.
    pub fn synced_seconds(&self, local_ms: i64) -> f64 {
        let offset = self.average_offset_ms().unwrap_or(0.0);
        (local_ms as f64 + offset) / 1000.0
    }
}
