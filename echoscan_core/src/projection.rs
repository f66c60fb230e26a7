//! Coordinate projection of readings into screen/world space.
//!
//! Conventions, fixed per mode:
//! - **Polar-planar**: heading in degrees, 0 = +y (away from the sensor),
//!   increasing clockwise. `x = d·sin θ`, `y = d·cos θ`, units cm.
//! - **Forward-relative**: heading ignored. `x = 0`, `y = d·pixels_per_cm`,
//!   +y is "ahead".
//! - **Pseudo-3D**: a virtual camera angle advances by `camera_step_deg` per
//!   reading. Horizontal position follows the camera sweep, vertical position
//!   and size follow `depth = d / max_distance` (closer ⇒ lower and larger).
//!   Real heading is never used.
//!
//! Every mode clamps its output to the viewport.

use crate::error::{ScanError, ScanResult};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Projection mode selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Overhead radar view from (heading, distance)
    #[serde(rename = "polar-planar")]
    PolarPlanar,

    /// Distance along a fixed "ahead" axis
    #[serde(rename = "forward-relative")]
    ForwardRelative,

    /// Camera-sweep floor projection
    #[serde(rename = "pseudo-3d")]
    Pseudo3d,
}

impl std::fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProjectionMode::PolarPlanar => "polar-planar",
            ProjectionMode::ForwardRelative => "forward-relative",
            ProjectionMode::Pseudo3d => "pseudo-3d",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ProjectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "polar-planar" | "polar" | "radar" => Ok(ProjectionMode::PolarPlanar),
            "forward-relative" | "forward" => Ok(ProjectionMode::ForwardRelative),
            "pseudo-3d" | "pseudo3d" | "sweep" => Ok(ProjectionMode::Pseudo3d),
            _ => Err(format!("Unknown projection mode: {}", s)),
        }
    }
}

/// Horizontal sweep pattern of the pseudo-3D camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPattern {
    /// `x = cx + 0.4·w·sin(camera)`
    #[default]
    Sinusoidal,

    /// `x = (camera mod 360) / 360 · w`, wrapping left to right
    Linear,
}

/// Axis-aligned output bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Viewport {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self { min_x, max_x, min_y, max_y }
    }

    /// Square viewport centered on the origin.
    pub fn centered(half_extent: f64) -> Self {
        Self::new(-half_extent, half_extent, -half_extent, half_extent)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Clamps a position into the viewport.
    pub fn clamp(&self, p: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }

    /// True if `p` lies inside (bounds inclusive).
    pub fn contains(&self, p: &Vector2<f64>) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn validate(&self) -> ScanResult<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(ScanError::config(format!("degenerate viewport {:?}", self)));
        }
        Ok(())
    }
}

/// Projection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Active projection mode
    pub mode: ProjectionMode,

    /// Output bounds; `None` uses the mode default
    pub viewport: Option<Viewport>,

    /// Screen width used by the pseudo-3D sweep (px)
    pub screen_width: f64,

    /// Screen height used by the pseudo-3D sweep (px)
    pub screen_height: f64,

    /// Forward-relative scale (px per cm)
    pub pixels_per_cm: f64,

    /// Pseudo-3D camera advance per reading (degrees)
    pub camera_step_deg: f64,

    /// Pseudo-3D horizontal pattern
    pub sweep: SweepPattern,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::PolarPlanar,
            viewport: None,
            screen_width: 1200.0,
            screen_height: 700.0,
            pixels_per_cm: 2.5,
            camera_step_deg: 0.8,
            sweep: SweepPattern::Sinusoidal,
        }
    }
}

impl ProjectionConfig {
    /// Resolves the viewport for this mode.
    pub fn resolved_viewport(&self, max_distance: f64) -> Viewport {
        if let Some(viewport) = self.viewport {
            return viewport;
        }
        match self.mode {
            ProjectionMode::PolarPlanar => Viewport::centered(max_distance),
            ProjectionMode::ForwardRelative => {
                let reach = max_distance * self.pixels_per_cm;
                Viewport::new(-reach / 2.0, reach / 2.0, 0.0, reach)
            }
            // Side and top margins of 10 px, bottom strip of 50 px for the HUD
            ProjectionMode::Pseudo3d => Viewport::new(
                10.0,
                self.screen_width - 10.0,
                10.0,
                self.screen_height - 50.0,
            ),
        }
    }

    pub fn validate(&self, max_distance: f64) -> ScanResult<()> {
        if self.mode == ProjectionMode::ForwardRelative
            && (!self.pixels_per_cm.is_finite() || self.pixels_per_cm <= 0.0)
        {
            return Err(ScanError::config("pixels_per_cm must be positive"));
        }
        if self.mode == ProjectionMode::Pseudo3d
            && (!self.screen_width.is_finite()
                || !self.screen_height.is_finite()
                || self.screen_width <= 20.0
                || self.screen_height <= 60.0)
        {
            return Err(ScanError::config("pseudo-3d screen is too small"));
        }
        if !self.camera_step_deg.is_finite() {
            return Err(ScanError::config("camera_step_deg must be finite"));
        }
        self.resolved_viewport(max_distance).validate()
    }
}

/// A projected reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Clamped position
    pub position: Vector2<f64>,

    /// Render size hint
    pub size: f64,

    /// Normalized depth `clamp(d / max_distance, 0, 1)`
    pub depth: f64,

    /// Heading used, in radians (polar-planar only)
    pub heading_rad: Option<f64>,
}

/// Polar (clockwise-from-+y) to cartesian, unclamped.
#[inline]
pub fn polar_to_cartesian(distance: f64, heading_rad: f64) -> Vector2<f64> {
    Vector2::new(distance * heading_rad.sin(), distance * heading_rad.cos())
}

/// Converts readings into positions for the configured mode.
#[derive(Debug, Clone)]
pub struct CoordinateProjector {
    config: ProjectionConfig,

    /// Resolved output bounds
    viewport: Viewport,

    /// Normalization ceiling (cm)
    max_distance: f64,

    /// Pseudo-3D camera angle (degrees, unwrapped)
    camera_angle_deg: f64,
}

impl CoordinateProjector {
    pub fn new(config: ProjectionConfig, max_distance: f64) -> ScanResult<Self> {
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(ScanError::config(format!(
                "max_distance must be positive, got {}",
                max_distance
            )));
        }
        config.validate(max_distance)?;
        Ok(Self {
            viewport: config.resolved_viewport(max_distance),
            config,
            max_distance,
            camera_angle_deg: 0.0,
        })
    }

    pub fn mode(&self) -> ProjectionMode {
        self.config.mode
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera_angle_deg(&self) -> f64 {
        self.camera_angle_deg
    }

    /// Normalized depth for a distance.
    #[inline]
    pub fn depth(&self, distance: f64) -> f64 {
        (distance / self.max_distance).clamp(0.0, 1.0)
    }

    /// Projects one reading.
    ///
    /// Polar-planar requires a heading; the other modes ignore it. In
    /// pseudo-3D mode every call advances the camera.
    pub fn project(&mut self, distance: f64, heading_deg: Option<f64>) -> ScanResult<Projection> {
        let depth = self.depth(distance);
        match self.config.mode {
            ProjectionMode::PolarPlanar => {
                let heading = heading_deg
                    .ok_or_else(|| ScanError::invalid("polar-planar projection needs a heading"))?;
                let heading_rad = heading.to_radians();
                Ok(Projection {
                    position: self.place_polar(distance, heading_rad),
                    size: 4.0 - 2.0 * depth,
                    depth,
                    heading_rad: Some(heading_rad),
                })
            }
            ProjectionMode::ForwardRelative => Ok(Projection {
                position: self.place_forward(distance, 0.0),
                size: 5.0,
                depth,
                heading_rad: None,
            }),
            ProjectionMode::Pseudo3d => {
                self.camera_angle_deg += self.config.camera_step_deg;
                Ok(Projection {
                    position: self.place_sweep(depth),
                    size: (8.0 - 6.0 * depth).max(1.0),
                    depth,
                    heading_rad: None,
                })
            }
        }
    }

    /// Polar position, clamped.
    pub fn place_polar(&self, distance: f64, heading_rad: f64) -> Vector2<f64> {
        self.viewport.clamp(polar_to_cartesian(distance, heading_rad))
    }

    /// Forward-relative position with a lateral offset (px), clamped.
    pub fn place_forward(&self, distance: f64, lateral_px: f64) -> Vector2<f64> {
        let center_x = (self.viewport.min_x + self.viewport.max_x) / 2.0;
        self.viewport.clamp(Vector2::new(
            center_x + lateral_px,
            distance * self.config.pixels_per_cm,
        ))
    }

    /// Pseudo-3D base position for the current camera angle.
    fn place_sweep(&self, depth: f64) -> Vector2<f64> {
        let w = self.config.screen_width;
        let h = self.config.screen_height;
        let x = match self.config.sweep {
            SweepPattern::Sinusoidal => {
                w / 2.0 + (w * 0.4) * self.camera_angle_deg.rem_euclid(360.0).to_radians().sin()
            }
            SweepPattern::Linear => self.camera_angle_deg.rem_euclid(360.0) / 360.0 * w,
        };
        let y = h * (0.3 + 0.5 * depth);
        self.viewport.clamp(Vector2::new(x, y))
    }

    /// Clamps an arbitrary position (used after scatter offsets).
    pub fn clamp(&self, p: Vector2<f64>) -> Vector2<f64> {
        self.viewport.clamp(p)
    }

    /// Resets the camera sweep.
    pub fn reset(&mut self) {
        self.camera_angle_deg = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projector(mode: ProjectionMode) -> CoordinateProjector {
        let config = ProjectionConfig {
            mode,
            ..Default::default()
        };
        CoordinateProjector::new(config, 200.0).unwrap()
    }

    #[test]
    fn test_polar_convention() {
        let mut p = projector(ProjectionMode::PolarPlanar);

        let ahead = p.project(100.0, Some(0.0)).unwrap();
        assert_relative_eq!(ahead.position.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ahead.position.y, 100.0, epsilon = 1e-9);

        // Clockwise: 90° is +x
        let right = p.project(50.0, Some(90.0)).unwrap();
        assert_relative_eq!(right.position.x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(right.position.y, 0.0, epsilon = 1e-9);

        let behind = p.project(50.0, Some(180.0)).unwrap();
        assert_relative_eq!(behind.position.y, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_requires_heading() {
        let mut p = projector(ProjectionMode::PolarPlanar);
        assert!(p.project(100.0, None).is_err());
    }

    #[test]
    fn test_polar_clamps_to_viewport() {
        let mut p = projector(ProjectionMode::PolarPlanar);
        let far = p.project(1000.0, Some(45.0)).unwrap();
        assert!(p.viewport().contains(&far.position));
        assert_relative_eq!(far.position.x, 200.0);
        assert_relative_eq!(far.position.y, 200.0);
    }

    #[test]
    fn test_forward_ignores_heading() {
        let mut p = projector(ProjectionMode::ForwardRelative);
        let a = p.project(40.0, Some(270.0)).unwrap();
        let b = p.project(40.0, None).unwrap();
        assert_eq!(a.position, b.position);
        assert_relative_eq!(a.position.x, 0.0);
        assert_relative_eq!(a.position.y, 100.0); // 40 cm * 2.5 px/cm
    }

    #[test]
    fn test_forward_clamps() {
        let mut p = projector(ProjectionMode::ForwardRelative);
        let beyond = p.project(10_000.0, None).unwrap();
        assert_relative_eq!(beyond.position.y, 500.0);
    }

    #[test]
    fn test_pseudo3d_depth_effect() {
        let mut p = projector(ProjectionMode::Pseudo3d);
        let near = p.project(20.0, None).unwrap();
        p.reset();
        let far = p.project(180.0, None).unwrap();

        // Closer is lower and larger
        assert!(near.position.y < far.position.y);
        assert!(near.size > far.size);
        assert_eq!(near.position.x, far.position.x);
    }

    #[test]
    fn test_pseudo3d_camera_advances_independent_of_heading() {
        let mut p = projector(ProjectionMode::Pseudo3d);
        p.project(100.0, Some(10.0)).unwrap();
        p.project(100.0, Some(300.0)).unwrap();
        assert_relative_eq!(p.camera_angle_deg(), 1.6, epsilon = 1e-9);
    }

    #[test]
    fn test_pseudo3d_stays_in_viewport() {
        let mut p = projector(ProjectionMode::Pseudo3d);
        for i in 0..1000 {
            let proj = p.project((i % 300) as f64 + 1.0, None).unwrap();
            assert!(p.viewport().contains(&proj.position));
            assert!(proj.size >= 1.0 && proj.size <= 8.0);
        }
    }

    #[test]
    fn test_linear_sweep_wraps() {
        let config = ProjectionConfig {
            mode: ProjectionMode::Pseudo3d,
            sweep: SweepPattern::Linear,
            camera_step_deg: 90.0,
            ..Default::default()
        };
        let mut p = CoordinateProjector::new(config, 200.0).unwrap();
        let xs: Vec<f64> = (0..5).map(|_| p.project(100.0, None).unwrap().position.x).collect();
        assert_relative_eq!(xs[0], 300.0);
        assert_relative_eq!(xs[1], 600.0);
        assert_relative_eq!(xs[2], 900.0);
        assert_relative_eq!(xs[3], 10.0); // 360° wraps to 0, clamped to margin
        assert_relative_eq!(xs[4], 300.0);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("polar-planar".parse::<ProjectionMode>().unwrap(), ProjectionMode::PolarPlanar);
        assert_eq!("Forward".parse::<ProjectionMode>().unwrap(), ProjectionMode::ForwardRelative);
        assert_eq!("pseudo-3d".parse::<ProjectionMode>().unwrap(), ProjectionMode::Pseudo3d);
        assert!("isometric".parse::<ProjectionMode>().is_err());
    }

    #[test]
    fn test_invalid_config() {
        assert!(CoordinateProjector::new(ProjectionConfig::default(), 0.0).is_err());

        let bad_viewport = ProjectionConfig {
            viewport: Some(Viewport::new(5.0, 5.0, 0.0, 1.0)),
            ..Default::default()
        };
        assert!(CoordinateProjector::new(bad_viewport, 100.0).is_err());

        let bad_scale = ProjectionConfig {
            mode: ProjectionMode::ForwardRelative,
            pixels_per_cm: 0.0,
            ..Default::default()
        };
        assert!(CoordinateProjector::new(bad_scale, 100.0).is_err());
    }
}
