//! Rerun visualization for headless runs.
//!
//! Visualization is optional and only available with the `visualization`
//! feature.
//!
//! # What Gets Logged
//!
//! - Visible points as 2D points with their gradient color and fade alpha
//! - Buffer occupancy and last distance as scalar timelines
//! - Reading state changes as text

#[cfg(feature = "visualization")]
use rerun::{Color, Points2D, Position2D, Radius, RecordingStream};
use echoscan_core::{RenderPoint, ScanStats};

/// Rerun logger for scan visualization.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to watch the scan");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self {
                    rec: None,
                    enabled: false,
                }
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the simulation time for subsequent logs.
    #[cfg(feature = "visualization")]
    pub fn set_time(&self, seconds: f64) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("sim_time", seconds);
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn set_time(&self, _seconds: f64) {}

    /// Logs the visible point set.
    #[cfg(feature = "visualization")]
    pub fn log_points(&self, points: &[RenderPoint]) {
        if let Some(ref rec) = self.rec {
            let positions: Vec<Position2D> = points
                .iter()
                .map(|p| Position2D::new(p.x as f32, p.y as f32))
                .collect();
            let colors: Vec<Color> = points
                .iter()
                .map(|p| {
                    let [r, g, b, a] = p.color.with_alpha(p.alpha);
                    Color::from_unmultiplied_rgba(r, g, b, a)
                })
                .collect();
            let radii: Vec<Radius> = points
                .iter()
                .map(|p| Radius::new_ui_points(p.size as f32))
                .collect();

            let _ = rec.log(
                "scan/points",
                &Points2D::new(positions).with_colors(colors).with_radii(radii),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_points(&self, _points: &[RenderPoint]) {}

    /// Logs buffer occupancy and the last distance.
    #[cfg(feature = "visualization")]
    pub fn log_stats(&self, visible: usize, stats: &ScanStats, last_distance: Option<f64>) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log("metrics/visible_points", &rerun::Scalar::new(visible as f64));
            let _ = rec.log("metrics/evicted", &rerun::Scalar::new(stats.evicted as f64));
            if let Some(d) = last_distance {
                let _ = rec.log("metrics/last_distance_cm", &rerun::Scalar::new(d));
            }
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_stats(&self, _visible: usize, _stats: &ScanStats, _last_distance: Option<f64>) {}

    /// Logs a text annotation (e.g., rover state change).
    #[cfg(feature = "visualization")]
    pub fn log_event(&self, path: &str, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_event(&self, _path: &str, _message: &str) {}
}
