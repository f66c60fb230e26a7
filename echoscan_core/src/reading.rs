//! Typed sensor reading, validated at the boundary.

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};

/// One decoded range sample. Consumed by the engine, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Distance in cm, finite and > 0
    pub distance: f64,

    /// Heading in degrees, in [0, 360). Convention depends on projection mode.
    pub heading: Option<f64>,

    /// Opaque state label ("DRIVE", "REVERSE", ...). Not interpreted.
    pub state: Option<String>,
}

impl Reading {
    /// Validates and builds a reading.
    pub fn new(distance: f64, heading: Option<f64>, state: Option<String>) -> ScanResult<Self> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(ScanError::invalid(format!("distance {} is not positive", distance)));
        }
        if let Some(h) = heading {
            if !h.is_finite() || !(0.0..360.0).contains(&h) {
                return Err(ScanError::invalid(format!("heading {} outside [0, 360)", h)));
            }
        }
        Ok(Self {
            distance,
            heading,
            state,
        })
    }

    /// Reading without heading or state.
    pub fn distance_only(distance: f64) -> ScanResult<Self> {
        Self::new(distance, None, None)
    }
}
