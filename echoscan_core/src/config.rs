//! Engine configuration and named presets.
//!
//! A `ScanConfig` is loaded from JSON (every field optional, defaults
//! below) and validated once when the engine is built. The presets
//! reproduce the six visualizer flavors: radar, lidar, point_cloud,
//! sonar_pulse, forward and depth_sweep.

use crate::color::{Gradient, GradientStop, DEFAULT_RESOLUTION};
use crate::environment::RayCastConfig;
use crate::error::{ScanError, ScanResult};
use crate::filter::FilterConfig;
use crate::projection::{ProjectionConfig, ProjectionMode, SweepPattern};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names accepted by [`ScanConfig::preset`].
pub const PRESET_NAMES: [&str; 6] = [
    "radar",
    "lidar",
    "point_cloud",
    "sonar_pulse",
    "forward",
    "depth_sweep",
];

// ============================================================================
// SCATTER
// ============================================================================

/// Beam scatter tuning.
///
/// The sub-point count for one reading is
/// `max(min_count, round(near_count - (near_count - far_count) * depth))`
/// with `depth = clamp(d / max_distance, 0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Sub-points at depth 0
    #[serde(alias = "beam_scatter_count")]
    pub near_count: usize,

    /// Sub-points at depth 1
    pub far_count: usize,

    /// Lower bound on sub-points
    pub min_count: usize,

    /// Absolute distance jitter (cm)
    #[serde(alias = "beam_scatter_stddev")]
    pub distance_stddev: f64,

    /// Distance jitter proportional to the distance
    pub distance_stddev_ratio: f64,

    /// Heading jitter in polar-planar mode (rad)
    pub angle_stddev_rad: f64,

    /// Horizontal jitter in forward and pseudo-3D modes (px)
    pub lateral_stddev: f64,

    /// Extra horizontal jitter per unit depth (px)
    pub lateral_depth_gain: f64,

    /// Vertical jitter in pseudo-3D mode (px)
    pub vertical_stddev: f64,

    /// Extra vertical jitter per unit closeness `1 - depth` (px)
    pub vertical_near_gain: f64,

    /// Size multiplier drawn from `U(1 - j, 1 + j)`
    pub size_jitter: f64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            near_count: 3,
            far_count: 3,
            min_count: 1,
            distance_stddev: 1.5,
            distance_stddev_ratio: 0.0,
            angle_stddev_rad: 0.05,
            lateral_stddev: 0.0,
            lateral_depth_gain: 0.0,
            vertical_stddev: 0.0,
            vertical_near_gain: 0.0,
            size_jitter: 0.0,
        }
    }
}

impl ScatterConfig {
    /// Sub-point count for a normalized depth.
    pub fn count_for(&self, depth: f64) -> usize {
        let depth = depth.clamp(0.0, 1.0);
        let near = self.near_count as f64;
        let far = self.far_count as f64;
        let count = (near - (near - far) * depth).round().max(0.0) as usize;
        count.max(self.min_count)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.near_count.max(self.far_count).max(self.min_count) == 0 {
            return Err(ScanError::config("scatter must produce at least one point"));
        }
        let stddevs = [
            ("distance_stddev", self.distance_stddev),
            ("distance_stddev_ratio", self.distance_stddev_ratio),
            ("angle_stddev_rad", self.angle_stddev_rad),
            ("lateral_stddev", self.lateral_stddev),
            ("lateral_depth_gain", self.lateral_depth_gain),
            ("vertical_stddev", self.vertical_stddev),
            ("vertical_near_gain", self.vertical_near_gain),
        ];
        for (name, value) in stddevs {
            if !value.is_finite() || value < 0.0 {
                return Err(ScanError::config(format!(
                    "scatter {} must be >= 0, got {}",
                    name, value
                )));
            }
        }
        if !self.size_jitter.is_finite() || !(0.0..1.0).contains(&self.size_jitter) {
            return Err(ScanError::config("scatter size_jitter must be in [0, 1)"));
        }
        Ok(())
    }
}

// ============================================================================
// DEMO
// ============================================================================

/// Synthetic-reading settings used by `tick_demo`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Heading advance per demo tick (degrees). Also used to invent a
    /// heading for live polar readings that carry none.
    pub heading_step_deg: f64,

    /// Ray march step (cm)
    pub ray_step: f64,

    /// Gaussian jitter on ray hits (cm)
    pub noise_stddev: f64,

    /// Half width of the beam fan (rad)
    pub beam_half_width_rad: f64,

    /// Rays per beam; 1 casts a single ray
    pub beam_rays: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            heading_step_deg: 2.0,
            ray_step: 1.0,
            noise_stddev: 2.0,
            beam_half_width_rad: 0.0,
            beam_rays: 1,
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> ScanResult<()> {
        if !self.heading_step_deg.is_finite() {
            return Err(ScanError::config("demo heading_step_deg must be finite"));
        }
        if !self.beam_half_width_rad.is_finite() || self.beam_half_width_rad < 0.0 {
            return Err(ScanError::config("demo beam_half_width_rad must be >= 0"));
        }
        if self.beam_rays == 0 {
            return Err(ScanError::config("demo beam_rays must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// SCAN CONFIG
// ============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Point buffer capacity
    pub max_points: usize,

    /// Normalization ceiling and valid range limit (cm)
    pub max_distance: f64,

    /// Readings below this are clamped up (cm)
    pub min_distance: f64,

    /// Age-out window (seconds)
    pub lifetime_seconds: f64,

    /// Projection mode and geometry
    pub projection: ProjectionConfig,

    /// Gradient keypoints, near (t=0) to far (t=1)
    #[serde(alias = "gradient_keypoints")]
    pub gradient: Vec<GradientStop>,

    /// Color lookup table size
    pub color_resolution: usize,

    /// Beam scatter tuning
    pub scatter: ScatterConfig,

    /// Median smoothing; `None` disables it
    pub smoothing: Option<FilterConfig>,

    /// Lowest alpha an aging point fades to
    pub fade: f64,

    /// Synthetic reading settings
    pub demo: DemoConfig,

    /// RNG seed (0 = entropy)
    pub seed: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_points: 8000,
            max_distance: 200.0,
            min_distance: 2.0,
            lifetime_seconds: 30.0,
            projection: ProjectionConfig::default(),
            gradient: Gradient::radar(),
            color_resolution: DEFAULT_RESOLUTION,
            scatter: ScatterConfig::default(),
            smoothing: None,
            fade: 0.1,
            demo: DemoConfig::default(),
            seed: 0,
        }
    }
}

impl ScanConfig {
    /// Overhead radar: 3 scatter points, heading +2° per tick.
    pub fn radar() -> Self {
        Self::default()
    }

    /// Wide beam lidar: 15-ray fan, 2 to 5 hits per ray.
    pub fn lidar() -> Self {
        Self {
            max_points: 15_000,
            max_distance: 250.0,
            lifetime_seconds: 45.0,
            gradient: Gradient::lidar(),
            scatter: ScatterConfig {
                near_count: 5,
                far_count: 2,
                min_count: 2,
                distance_stddev: 3.0,
                angle_stddev_rad: 0.08,
                ..Default::default()
            },
            demo: DemoConfig {
                heading_step_deg: 3.0,
                beam_half_width_rad: 0.3,
                beam_rays: 15,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Camera-sweep point cloud: dense near returns, sinusoidal sweep.
    pub fn point_cloud() -> Self {
        Self {
            max_points: 50_000,
            max_distance: 300.0,
            min_distance: 1.0,
            lifetime_seconds: 60.0,
            projection: ProjectionConfig {
                mode: ProjectionMode::Pseudo3d,
                camera_step_deg: 0.8,
                sweep: SweepPattern::Sinusoidal,
                ..Default::default()
            },
            gradient: Gradient::scanner(),
            scatter: ScatterConfig {
                near_count: 15,
                far_count: 5,
                min_count: 3,
                distance_stddev: 0.0,
                distance_stddev_ratio: 0.05,
                angle_stddev_rad: 0.0,
                lateral_stddev: 15.0,
                lateral_depth_gain: 30.0,
                vertical_stddev: 20.0,
                vertical_near_gain: 40.0,
                size_jitter: 0.5,
            },
            fade: 0.15,
            demo: DemoConfig {
                heading_step_deg: 0.8,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Smoothed forward view for an approach/reverse rover.
    pub fn sonar_pulse() -> Self {
        Self {
            max_points: 2000,
            max_distance: 150.0,
            lifetime_seconds: 3.0,
            projection: ProjectionConfig {
                mode: ProjectionMode::ForwardRelative,
                ..Default::default()
            },
            gradient: Gradient::pulse(),
            scatter: ScatterConfig {
                near_count: 6,
                far_count: 2,
                min_count: 1,
                distance_stddev: 1.0,
                angle_stddev_rad: 0.0,
                lateral_stddev: 6.0,
                lateral_depth_gain: 10.0,
                ..Default::default()
            },
            smoothing: Some(FilterConfig::default()),
            fade: 0.0,
            demo: DemoConfig {
                heading_step_deg: 0.0,
                noise_stddev: 1.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Single forward axis, one point per reading, short memory.
    pub fn forward() -> Self {
        Self {
            max_points: 500,
            max_distance: 200.0,
            lifetime_seconds: 8.0,
            projection: ProjectionConfig {
                mode: ProjectionMode::ForwardRelative,
                pixels_per_cm: 2.5,
                ..Default::default()
            },
            gradient: Gradient::proximity(),
            scatter: ScatterConfig {
                near_count: 1,
                far_count: 1,
                min_count: 1,
                distance_stddev: 0.0,
                angle_stddev_rad: 0.0,
                ..Default::default()
            },
            fade: 0.0,
            demo: DemoConfig {
                heading_step_deg: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Left-to-right depth sweep, 3 px per reading on a 500 px strip.
    pub fn depth_sweep() -> Self {
        let width = 500.0;
        Self {
            max_points: 500,
            max_distance: 200.0,
            lifetime_seconds: 20.0,
            projection: ProjectionConfig {
                mode: ProjectionMode::Pseudo3d,
                screen_width: width,
                screen_height: 350.0,
                camera_step_deg: 3.0 / width * 360.0,
                sweep: SweepPattern::Linear,
                ..Default::default()
            },
            gradient: Gradient::depth(),
            scatter: ScatterConfig {
                near_count: 1,
                far_count: 1,
                min_count: 1,
                distance_stddev: 0.0,
                angle_stddev_rad: 0.0,
                ..Default::default()
            },
            demo: DemoConfig {
                heading_step_deg: 3.0 / width * 360.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Looks up a preset by name.
    pub fn preset(name: &str) -> ScanResult<Self> {
        match name.to_lowercase().replace('-', "_").as_str() {
            "radar" => Ok(Self::radar()),
            "lidar" => Ok(Self::lidar()),
            "point_cloud" | "pointcloud" => Ok(Self::point_cloud()),
            "sonar_pulse" | "pulse" => Ok(Self::sonar_pulse()),
            "forward" | "sonar_radar" => Ok(Self::forward()),
            "depth_sweep" | "depth_scanner" => Ok(Self::depth_sweep()),
            _ => Err(ScanError::config(format!(
                "unknown preset '{}', expected one of {:?}",
                name, PRESET_NAMES
            ))),
        }
    }

    /// Same config with a different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> ScanResult<Self> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ScanResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> ScanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Ray-cast settings derived from the range limits and demo block.
    pub fn ray_cast(&self) -> RayCastConfig {
        RayCastConfig {
            step: self.demo.ray_step,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            noise_stddev: self.demo.noise_stddev,
        }
    }

    /// Checks every field. Called by `ScanEngine::new`.
    pub fn validate(&self) -> ScanResult<()> {
        if self.max_points == 0 {
            return Err(ScanError::config("max_points must be positive"));
        }
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(ScanError::config(format!(
                "max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !self.min_distance.is_finite()
            || self.min_distance < 0.0
            || self.min_distance >= self.max_distance
        {
            return Err(ScanError::config(format!(
                "min_distance must be in [0, max_distance), got {}",
                self.min_distance
            )));
        }
        if !self.lifetime_seconds.is_finite() || self.lifetime_seconds <= 0.0 {
            return Err(ScanError::config(format!(
                "lifetime_seconds must be positive, got {}",
                self.lifetime_seconds
            )));
        }
        if !(0.0..=1.0).contains(&self.fade) {
            return Err(ScanError::config("fade must be in [0, 1]"));
        }
        crate::color::validate_stops(&self.gradient)?;
        if self.color_resolution < 2 {
            return Err(ScanError::config("color_resolution must be >= 2"));
        }
        self.projection.validate(self.max_distance)?;
        self.scatter.validate()?;
        if let Some(smoothing) = &self.smoothing {
            smoothing.validate()?;
        }
        self.demo.validate()?;
        self.ray_cast().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_validate() {
        for name in PRESET_NAMES {
            let config = ScanConfig::preset(name).unwrap();
            assert!(config.validate().is_ok(), "preset {} invalid", name);
        }
        assert!(ScanConfig::preset("sonar").is_err());
    }

    #[test]
    fn test_preset_aliases() {
        assert_eq!(
            ScanConfig::preset("point-cloud").unwrap(),
            ScanConfig::point_cloud()
        );
        assert_eq!(ScanConfig::preset("Sonar_Radar").unwrap(), ScanConfig::forward());
    }

    #[test]
    fn test_scatter_count_falls_with_depth() {
        let scatter = ScanConfig::point_cloud().scatter;
        assert_eq!(scatter.count_for(0.0), 15);
        assert_eq!(scatter.count_for(0.5), 10);
        assert_eq!(scatter.count_for(1.0), 5);
        assert_eq!(scatter.count_for(7.0), 5);

        let floor = ScatterConfig {
            near_count: 4,
            far_count: 0,
            min_count: 3,
            ..Default::default()
        };
        assert_eq!(floor.count_for(1.0), 3);
    }

    #[test]
    fn test_json_partial_document_uses_defaults() {
        let config = ScanConfig::from_json_str(
            r#"{"max_points": 3, "lifetime_seconds": 10.0, "projection": {"mode": "forward-relative"}}"#,
        )
        .unwrap();
        assert_eq!(config.max_points, 3);
        assert_eq!(config.projection.mode, ProjectionMode::ForwardRelative);
        assert_eq!(config.max_distance, 200.0);
        assert_eq!(config.projection.pixels_per_cm, 2.5);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ScanConfig::radar().with_seed(7);
        let json = config.to_json_string().unwrap();
        assert_eq!(ScanConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_gradient_keypoint_alias() {
        let config = ScanConfig::from_json_str(
            r#"{"gradient_keypoints": [
                {"t": 0.0, "color": {"r": 0, "g": 0, "b": 0}},
                {"t": 1.0, "color": {"r": 255, "g": 255, "b": 255}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.gradient.len(), 2);
    }

    #[test]
    fn test_rejects_bad_config() {
        let zero_points = ScanConfig {
            max_points: 0,
            ..Default::default()
        };
        assert!(zero_points.validate().is_err());

        let bad_gradient = ScanConfig {
            gradient: vec![
                GradientStop::new(0.1, crate::color::Rgb::new(0, 0, 0)),
                GradientStop::new(1.0, crate::color::Rgb::new(1, 1, 1)),
            ],
            ..Default::default()
        };
        assert!(bad_gradient.validate().is_err());

        let bad_lifetime = ScanConfig {
            lifetime_seconds: 0.0,
            ..Default::default()
        };
        assert!(bad_lifetime.validate().is_err());

        let bad_range = ScanConfig {
            min_distance: 250.0,
            ..Default::default()
        };
        assert!(bad_range.validate().is_err());

        let bad_smoothing = ScanConfig {
            smoothing: Some(FilterConfig { window: 0, gain: 8.0 }),
            ..Default::default()
        };
        assert!(bad_smoothing.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = ScanConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ScanConfig::from_json_file("/nonexistent/echoscan.json").unwrap_err();
        assert!(matches!(err, ScanError::Io(_)));
    }
}
