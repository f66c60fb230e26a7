//! Monotonic time sources for the tick loop.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Monotonic seconds since the clock was created.
///
/// # Implementations
///
/// - **Production**: `SystemClock` - wraps `Instant`
/// - **Headless / tests**: `ManualClock` - advanced explicitly by the host
pub trait ScanClock: Send + Sync {
    /// Seconds since creation. Never decreases.
    fn now_secs(&self) -> f64;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanClock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Virtual clock advanced by hand.
///
/// Clones share the same time, so the host loop and a replay thread can
/// observe one timeline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    /// Current virtual time (nanoseconds since start)
    time_ns: Arc<Mutex<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances virtual time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self.time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time = time.saturating_add(duration.as_nanos() as u64);
    }

    /// Advances virtual time by `secs` seconds. Negative or non-finite
    /// values are ignored.
    pub fn advance_secs(&self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.advance(Duration::from_secs_f64(secs));
        }
    }

    /// Moves the clock to `time_ns` unless that would go backwards.
    pub fn set_time_ns(&self, time_ns: u64) {
        let mut time = self.time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time = (*time).max(time_ns);
    }

    /// Current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.time_ns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScanClock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.time_ns() as f64 / 1e9
    }
}
