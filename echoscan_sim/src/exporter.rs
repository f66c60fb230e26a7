//! JSON exporter for offline rendering.
//!
//! Exports snapshot frames as JSON: every point with its position, color,
//! size and alpha, plus the engine counters at that time.

use echoscan_core::{RenderPoint, ScanStats};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single frame of render state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Simulation time in seconds
    pub time_sec: f64,

    /// Visible points, oldest first
    pub points: Vec<ExportPoint>,

    /// Engine counters at this time
    pub stats: ScanStats,

    /// HUD values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// One exported point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportPoint {
    pub x: f64,
    pub y: f64,
    pub color: [u8; 3],
    pub size: f64,
    pub alpha: f64,
}

impl From<&RenderPoint> for ExportPoint {
    fn from(p: &RenderPoint) -> Self {
        Self {
            x: p.x,
            y: p.y,
            color: [p.color.r, p.color.g, p.color.b],
            size: p.size,
            alpha: p.alpha,
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Projection mode name
    pub projection: String,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    /// Counters at the end of the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_stats: Option<ScanStats>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, projection: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            projection: projection.to_string(),
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            final_stats: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, stats: ScanStats) {
        self.passed = passed;
        self.final_stats = Some(stats);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
