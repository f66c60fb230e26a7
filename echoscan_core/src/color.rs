//! Distance-to-color mapping via a precomputed piecewise-linear gradient.
//!
//! The gradient is described by ordered keypoints `(t, color)` with
//! `t[0] = 0` and `t[last] = 1`. It is baked once into a fixed-size lookup
//! table so that the per-point cost at render time is a clamp and an index.

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};

/// Default lookup table resolution.
pub const DEFAULT_RESOLUTION: usize = 512;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Creates a color from 8-bit channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from unit-range float channels.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(r), q(g), q(b))
    }

    /// Returns the color as an `[r, g, b, a]` array.
    pub fn with_alpha(self, alpha: f64) -> [u8; 4] {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }

    /// Linear interpolation between two colors, rounded per channel.
    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// One keypoint of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, in [0, 1]
    pub t: f64,

    /// Color at this position
    pub color: Rgb,
}

impl GradientStop {
    pub const fn new(t: f64, color: Rgb) -> Self {
        Self { t, color }
    }
}

/// Named gradient presets taken from the visualizer variants.
pub struct Gradient;

impl Gradient {
    /// Spreads `colors` evenly over [0, 1].
    pub fn evenly_spaced(colors: &[Rgb]) -> Vec<GradientStop> {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        colors
            .iter()
            .enumerate()
            .map(|(i, &color)| GradientStop::new(i as f64 / last, color))
            .collect()
    }

    /// Blue (close) -> cyan -> green -> yellow -> orange -> red (far).
    pub fn radar() -> Vec<GradientStop> {
        Self::evenly_spaced(&[
            Rgb::from_unit(0.0, 0.2, 1.0),
            Rgb::from_unit(0.0, 0.8, 1.0),
            Rgb::from_unit(0.0, 1.0, 0.4),
            Rgb::from_unit(0.8, 1.0, 0.0),
            Rgb::from_unit(1.0, 0.5, 0.0),
            Rgb::from_unit(1.0, 0.0, 0.0),
        ])
    }

    /// Ten-stop lidar palette, dark blue (close) to red (far).
    pub fn lidar() -> Vec<GradientStop> {
        Self::evenly_spaced(&[
            Rgb::from_unit(0.0, 0.0, 0.8),
            Rgb::from_unit(0.0, 0.4, 1.0),
            Rgb::from_unit(0.0, 0.8, 1.0),
            Rgb::from_unit(0.0, 1.0, 0.5),
            Rgb::from_unit(0.2, 1.0, 0.2),
            Rgb::from_unit(0.6, 1.0, 0.0),
            Rgb::from_unit(1.0, 1.0, 0.0),
            Rgb::from_unit(1.0, 0.6, 0.0),
            Rgb::from_unit(1.0, 0.3, 0.0),
            Rgb::from_unit(1.0, 0.0, 0.0),
        ])
    }

    /// Point-cloud scanner palette, deep blue (close) to dark red (far).
    pub fn scanner() -> Vec<GradientStop> {
        Self::evenly_spaced(&[
            Rgb::from_unit(0.0, 0.0, 0.9),
            Rgb::from_unit(0.0, 0.3, 1.0),
            Rgb::from_unit(0.0, 0.7, 1.0),
            Rgb::from_unit(0.0, 1.0, 0.7),
            Rgb::from_unit(0.0, 1.0, 0.0),
            Rgb::from_unit(0.4, 1.0, 0.0),
            Rgb::from_unit(0.8, 0.9, 0.0),
            Rgb::from_unit(1.0, 0.6, 0.0),
            Rgb::from_unit(1.0, 0.2, 0.0),
            Rgb::from_unit(0.8, 0.0, 0.0),
        ])
    }

    /// Depth-sweep palette: blue (close) to red (far).
    pub fn depth() -> Vec<GradientStop> {
        Self::evenly_spaced(&[
            Rgb::from_unit(0.0, 0.0, 1.0),
            Rgb::from_unit(0.0, 0.5, 1.0),
            Rgb::from_unit(0.0, 1.0, 1.0),
            Rgb::from_unit(0.0, 1.0, 0.5),
            Rgb::from_unit(0.0, 1.0, 0.0),
            Rgb::from_unit(0.5, 1.0, 0.0),
            Rgb::from_unit(1.0, 1.0, 0.0),
            Rgb::from_unit(1.0, 0.5, 0.0),
            Rgb::from_unit(1.0, 0.0, 0.0),
        ])
    }

    /// Proximity warning: red (close) -> orange -> green (far).
    pub fn proximity() -> Vec<GradientStop> {
        Self::evenly_spaced(&[
            Rgb::new(255, 50, 50),
            Rgb::new(255, 180, 0),
            Rgb::new(50, 255, 50),
        ])
    }

    /// Pulse palette with uneven keypoints: bright red (close) to deep blue (far).
    pub fn pulse() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, Rgb::new(255, 30, 30)),
            GradientStop::new(0.12, Rgb::new(255, 80, 0)),
            GradientStop::new(0.25, Rgb::new(255, 160, 0)),
            GradientStop::new(0.38, Rgb::new(255, 230, 0)),
            GradientStop::new(0.50, Rgb::new(150, 255, 50)),
            GradientStop::new(0.62, Rgb::new(0, 255, 120)),
            GradientStop::new(0.75, Rgb::new(0, 230, 200)),
            GradientStop::new(0.88, Rgb::new(0, 150, 255)),
            GradientStop::new(1.0, Rgb::new(30, 60, 180)),
        ]
    }
}

/// Checks that keypoints form a usable gradient.
pub fn validate_stops(stops: &[GradientStop]) -> ScanResult<()> {
    if stops.len() < 2 {
        return Err(ScanError::config(format!(
            "gradient needs at least 2 keypoints, got {}",
            stops.len()
        )));
    }
    if stops.iter().any(|s| !s.t.is_finite()) {
        return Err(ScanError::config("gradient keypoint t must be finite"));
    }
    if stops[0].t != 0.0 {
        return Err(ScanError::config(format!(
            "gradient must start at t=0, starts at {}",
            stops[0].t
        )));
    }
    let last = stops[stops.len() - 1].t;
    if last != 1.0 {
        return Err(ScanError::config(format!("gradient must end at t=1, ends at {}", last)));
    }
    if stops.windows(2).any(|w| w[1].t <= w[0].t) {
        return Err(ScanError::config("gradient keypoints must be strictly increasing"));
    }
    Ok(())
}

/// Maps normalized distances to colors through a precomputed table.
#[derive(Debug, Clone)]
pub struct ColorMapper {
    /// Baked lookup table; entry `i` holds the color at `t = i / (len - 1)`
    table: Vec<Rgb>,

    /// Keypoints the table was built from
    stops: Vec<GradientStop>,
}

impl ColorMapper {
    /// Builds a mapper from validated keypoints.
    ///
    /// # Arguments
    /// * `stops` - Keypoints, strictly increasing, from t=0 to t=1
    /// * `resolution` - Number of table entries (at least 2)
    pub fn new(stops: &[GradientStop], resolution: usize) -> ScanResult<Self> {
        validate_stops(stops)?;
        if resolution < 2 {
            return Err(ScanError::config(format!(
                "color table resolution must be >= 2, got {}",
                resolution
            )));
        }

        let last = (resolution - 1) as f64;
        let mut table = Vec::with_capacity(resolution);
        let mut segment = 0;

        for i in 0..resolution {
            let t = i as f64 / last;
            // Advance to the segment bracketing t; t is non-decreasing
            while segment + 2 < stops.len() && t > stops[segment + 1].t {
                segment += 1;
            }
            let (lo, hi) = (stops[segment], stops[segment + 1]);
            let local_t = ((t - lo.t) / (hi.t - lo.t)).clamp(0.0, 1.0);
            table.push(lo.color.lerp(hi.color, local_t));
        }

        Ok(Self {
            table,
            stops: stops.to_vec(),
        })
    }

    /// Returns the color for `t`, clamped to [0, 1]. NaN maps to `t = 0`.
    #[inline]
    pub fn map(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let idx = (t * (self.table.len() - 1) as f64).round() as usize;
        self.table[idx.min(self.table.len() - 1)]
    }

    /// Returns the color for a distance normalized by `max_distance`.
    #[inline]
    pub fn map_distance(&self, distance: f64, max_distance: f64) -> Rgb {
        if max_distance <= 0.0 {
            return self.map(0.0);
        }
        self.map(distance / max_distance)
    }

    /// Number of table entries.
    pub fn resolution(&self) -> usize {
        self.table.len()
    }

    /// The keypoints this mapper was built from.
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_presets() -> Vec<Vec<GradientStop>> {
        vec![
            Gradient::radar(),
            Gradient::lidar(),
            Gradient::scanner(),
            Gradient::depth(),
            Gradient::pulse(),
        ]
    }

    #[test]
    fn test_endpoints_match_keypoints() {
        for stops in all_presets() {
            for resolution in [2, 256, 512] {
                let mapper = ColorMapper::new(&stops, resolution).unwrap();
                assert_eq!(mapper.map(0.0), stops[0].color);
                assert_eq!(mapper.map(1.0), stops[stops.len() - 1].color);
            }
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let stops = Gradient::pulse();
        let mapper = ColorMapper::new(&stops, 256).unwrap();

        assert_eq!(mapper.map(-3.0), mapper.map(0.0));
        assert_eq!(mapper.map(42.0), mapper.map(1.0));
        assert_eq!(mapper.map(f64::NAN), mapper.map(0.0));
        assert_eq!(mapper.map(f64::INFINITY), mapper.map(1.0));
    }

    #[test]
    fn test_midpoint_interpolation() {
        let stops = vec![
            GradientStop::new(0.0, Rgb::new(0, 0, 0)),
            GradientStop::new(1.0, Rgb::new(200, 100, 50)),
        ];
        let mapper = ColorMapper::new(&stops, 3).unwrap();
        assert_eq!(mapper.map(0.5), Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_interior_keypoint_is_exact() {
        // 0.5 lands exactly on table entry 2 of 5
        let stops = vec![
            GradientStop::new(0.0, Rgb::new(0, 0, 255)),
            GradientStop::new(0.5, Rgb::new(0, 255, 0)),
            GradientStop::new(1.0, Rgb::new(255, 0, 0)),
        ];
        let mapper = ColorMapper::new(&stops, 5).unwrap();
        assert_eq!(mapper.map(0.5), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_table_has_no_jumps() {
        for stops in all_presets() {
            let mapper = ColorMapper::new(&stops, 512).unwrap();
            for w in mapper.table.windows(2) {
                let dr = (w[0].r as i32 - w[1].r as i32).abs();
                let dg = (w[0].g as i32 - w[1].g as i32).abs();
                let db = (w[0].b as i32 - w[1].b as i32).abs();
                assert!(dr <= 8 && dg <= 8 && db <= 8, "jump between {:?} and {:?}", w[0], w[1]);
            }
        }
    }

    #[test]
    fn test_map_distance() {
        let mapper = ColorMapper::new(&Gradient::radar(), 256).unwrap();
        assert_eq!(mapper.map_distance(0.0, 200.0), mapper.map(0.0));
        assert_eq!(mapper.map_distance(500.0, 200.0), mapper.map(1.0));
        assert_eq!(mapper.map_distance(100.0, 0.0), mapper.map(0.0));
    }

    #[test]
    fn test_rejects_bad_keypoints() {
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);

        let not_from_zero = vec![GradientStop::new(0.1, red), GradientStop::new(1.0, blue)];
        assert!(ColorMapper::new(&not_from_zero, 256).is_err());

        let not_to_one = vec![GradientStop::new(0.0, red), GradientStop::new(0.9, blue)];
        assert!(ColorMapper::new(&not_to_one, 256).is_err());

        let not_increasing = vec![
            GradientStop::new(0.0, red),
            GradientStop::new(0.6, blue),
            GradientStop::new(0.6, red),
            GradientStop::new(1.0, blue),
        ];
        assert!(ColorMapper::new(&not_increasing, 256).is_err());

        let single = vec![GradientStop::new(0.0, red)];
        assert!(ColorMapper::new(&single, 256).is_err());

        let ok = vec![GradientStop::new(0.0, red), GradientStop::new(1.0, blue)];
        assert!(ColorMapper::new(&ok, 1).is_err());
    }

    #[test]
    fn test_evenly_spaced_bounds() {
        let stops = Gradient::lidar();
        assert_eq!(stops.len(), 10);
        assert_eq!(stops[0].t, 0.0);
        assert_eq!(stops[9].t, 1.0);
    }
}
