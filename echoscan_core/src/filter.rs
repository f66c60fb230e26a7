//! Median-of-window smoothing with frame-rate independent follow.
//!
//! Two stages:
//! 1. Each accepted sample enters a fixed-size window; the window median
//!    becomes the new *target*.
//! 2. `advance(dt)` moves the *current* value toward the target by
//!    `(target - current) * min(1, dt * gain)`.
//!
//! There is no outlier rejection beyond the median itself.

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Number of samples in the median window (default: 5)
    pub window: usize,

    /// Follow gain in 1/s (default: 8.0)
    pub gain: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window: 5,
            gain: 8.0,
        }
    }
}

impl FilterConfig {
    /// Checks the window and gain.
    pub fn validate(&self) -> ScanResult<()> {
        if self.window == 0 {
            return Err(ScanError::config("filter window must be at least 1"));
        }
        if !self.gain.is_finite() || self.gain <= 0.0 {
            return Err(ScanError::config(format!(
                "filter gain must be positive, got {}",
                self.gain
            )));
        }
        Ok(())
    }
}

/// Sliding median filter with exponential follow.
#[derive(Debug, Clone)]
pub struct ReadingFilter {
    /// Most recent accepted samples, oldest at the front
    window: VecDeque<f64>,

    /// Window capacity
    capacity: usize,

    /// Follow gain
    gain: f64,

    /// Median of the current window
    target: Option<f64>,

    /// Smoothed value moving toward `target`
    current: Option<f64>,
}

impl ReadingFilter {
    /// Creates a filter from a validated configuration.
    pub fn new(config: FilterConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self {
            window: VecDeque::with_capacity(config.window),
            capacity: config.window,
            gain: config.gain,
            target: None,
            current: None,
        })
    }

    /// Pushes a raw sample and returns the new median target.
    ///
    /// Zero, negative and non-finite samples are "no reading": they do not
    /// enter the window and `None` is returned.
    pub fn push(&mut self, sample: f64) -> Option<f64> {
        if !sample.is_finite() || sample <= 0.0 {
            return None;
        }
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(sample);

        let median = self.median();
        self.target = median;
        // The first sample seeds the follow state
        if self.current.is_none() {
            self.current = median;
        }
        median
    }

    /// Advances the follow step by `dt` seconds and returns the current value.
    pub fn advance(&mut self, dt: f64) -> Option<f64> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if let (Some(target), Some(current)) = (self.target, self.current) {
            let alpha = (dt * self.gain).min(1.0);
            self.current = Some(current + (target - current) * alpha);
        }
        self.current
    }

    /// Upper median of the window (element at `len / 2` after sorting).
    fn median(&self) -> Option<f64> {
        if self.window.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.window.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(sorted[sorted.len() / 2])
    }

    /// Latest median target.
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    /// Latest smoothed value.
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drops all samples and follow state.
    pub fn reset(&mut self) {
        self.window.clear();
        self.target = None;
        self.current = None;
    }
}
