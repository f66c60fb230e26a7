//! Decoded sensor values exchanged across the boundary.

use serde::{Deserialize, Serialize};

/// One decoded sensor line, not yet validated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Reported distance (cm)
    pub distance_cm: f64,

    /// Reported heading (degrees); `None` if absent or negative
    pub heading_deg: Option<f64>,

    /// Free-form state label
    pub state: Option<String>,
}

impl RawReading {
    pub fn new(distance_cm: f64) -> Self {
        Self {
            distance_cm,
            heading_deg: None,
            state: None,
        }
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = Some(heading_deg);
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}
