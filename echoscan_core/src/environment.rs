//! Procedural demo environment and ray caster.
//!
//! Used only when no live sensor is attached. The environment is an
//! explicitly constructed, immutable set of obstacles shared read-only by
//! every cast. The intersection search is a fixed-step march from the
//! origin and is fully deterministic; noise is added only after a hit is
//! found.

use crate::error::{ScanError, ScanResult};
use crate::noise::NoiseSource;
use crate::projection::polar_to_cartesian;
use nalgebra::Vector2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// OBSTACLES
// ============================================================================

/// A static obstacle in the demo world (cm, sensor at the origin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DemoObstacle {
    /// A line segment with a hit thickness
    Wall {
        start: Vector2<f64>,
        end: Vector2<f64>,
        thickness: f64,
    },

    /// A solid disc
    Circle { center: Vector2<f64>, radius: f64 },

    /// A solid axis-aligned box anchored at its minimum corner
    Rect {
        origin: Vector2<f64>,
        width: f64,
        height: f64,
    },
}

impl DemoObstacle {
    /// Convenience constructor for a wall.
    pub fn wall(x0: f64, y0: f64, x1: f64, y1: f64, thickness: f64) -> Self {
        Self::Wall {
            start: Vector2::new(x0, y0),
            end: Vector2::new(x1, y1),
            thickness,
        }
    }

    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        Self::Circle {
            center: Vector2::new(cx, cy),
            radius,
        }
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::Rect {
            origin: Vector2::new(x, y),
            width,
            height,
        }
    }

    /// Point-in-obstacle test.
    pub fn contains(&self, p: &Vector2<f64>) -> bool {
        match self {
            DemoObstacle::Wall { start, end, thickness } => {
                distance_to_segment(p, start, end) <= thickness / 2.0
            }
            DemoObstacle::Circle { center, radius } => (p - center).norm_squared() <= radius * radius,
            DemoObstacle::Rect { origin, width, height } => {
                p.x >= origin.x
                    && p.x <= origin.x + width
                    && p.y >= origin.y
                    && p.y <= origin.y + height
            }
        }
    }

    fn validate(&self) -> ScanResult<()> {
        let ok = match self {
            DemoObstacle::Wall { start, end, thickness } => {
                start.iter().chain(end.iter()).all(|v| v.is_finite())
                    && thickness.is_finite()
                    && *thickness > 0.0
            }
            DemoObstacle::Circle { center, radius } => {
                center.iter().all(|v| v.is_finite()) && radius.is_finite() && *radius > 0.0
            }
            DemoObstacle::Rect { origin, width, height } => {
                origin.iter().all(|v| v.is_finite())
                    && width.is_finite()
                    && height.is_finite()
                    && *width > 0.0
                    && *height > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(ScanError::config(format!("degenerate obstacle {:?}", self)))
        }
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: &Vector2<f64>, a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Immutable set of obstacles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoEnvironment {
    obstacles: Vec<DemoObstacle>,
}

impl DemoEnvironment {
    /// Builds an environment from explicit obstacles.
    pub fn new(obstacles: Vec<DemoObstacle>) -> ScanResult<Self> {
        for obstacle in &obstacles {
            obstacle.validate()?;
        }
        Ok(Self { obstacles })
    }

    /// A single wall at `y` spanning `x ∈ [x_min, x_max]`.
    pub fn single_wall(y: f64, x_min: f64, x_max: f64) -> Self {
        Self {
            obstacles: vec![DemoObstacle::wall(x_min, y, x_max, y, 2.0)],
        }
    }

    /// A room with a back wall, two side walls, a central pillar and four
    /// smaller pillars. Pillar radii are jittered from `seed`, so the layout
    /// is deterministic per seed.
    pub fn room(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut jitter = |radius: f64, std: f64| -> f64 {
            match Normal::new(0.0, std) {
                Ok(normal) => (radius + normal.sample(&mut rng)).max(radius * 0.5),
                Err(_) => radius,
            }
        };

        let mut obstacles = vec![
            // Back wall
            DemoObstacle::wall(-200.0, 180.0, 200.0, 180.0, 6.0),
            // Side walls
            DemoObstacle::wall(-180.0, 0.0, -180.0, 180.0, 6.0),
            DemoObstacle::wall(180.0, 0.0, 180.0, 180.0, 6.0),
        ];

        obstacles.push(DemoObstacle::circle(0.0, 100.0, jitter(25.0, 2.0)));

        for (x, y, r) in [(-80.0, 60.0, 15.0), (90.0, 80.0, 12.0), (-50.0, 140.0, 18.0), (70.0, 150.0, 10.0)] {
            obstacles.push(DemoObstacle::circle(x, y, jitter(r, 1.5)));
        }

        Self { obstacles }
    }

    /// A rectangular room (drawn as four walls) with two round obstacles and
    /// a box.
    pub fn radar_room() -> Self {
        let (x, y, w, h) = (-80.0, -60.0, 160.0, 120.0);
        Self {
            obstacles: vec![
                DemoObstacle::wall(x, y, x + w, y, 2.0),
                DemoObstacle::wall(x + w, y, x + w, y + h, 2.0),
                DemoObstacle::wall(x + w, y + h, x, y + h, 2.0),
                DemoObstacle::wall(x, y + h, x, y, 2.0),
                DemoObstacle::circle(40.0, 30.0, 20.0),
                DemoObstacle::circle(-50.0, -20.0, 15.0),
                DemoObstacle::rect(-30.0, 50.0, 25.0, 30.0),
            ],
        }
    }

    pub fn obstacles(&self) -> &[DemoObstacle] {
        &self.obstacles
    }

    /// True if any obstacle contains `p`.
    pub fn is_occupied(&self, p: &Vector2<f64>) -> bool {
        self.obstacles.iter().any(|o| o.contains(p))
    }
}

// ============================================================================
// RAY CASTER
// ============================================================================

/// Ray-cast parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayCastConfig {
    /// March step (cm)
    pub step: f64,

    /// Closest distance tested (cm); also the floor after noise
    pub min_distance: f64,

    /// Range ceiling returned on a miss (cm)
    pub max_distance: f64,

    /// Gaussian jitter added after a hit (cm)
    pub noise_stddev: f64,
}

impl Default for RayCastConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            min_distance: 2.0,
            max_distance: 200.0,
            noise_stddev: 2.0,
        }
    }
}

impl RayCastConfig {
    pub fn validate(&self) -> ScanResult<()> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(ScanError::config("ray max_distance must be positive"));
        }
        let min_step = self.max_distance / MAX_MARCH_STEPS;
        if !self.step.is_finite() || self.step < min_step {
            return Err(ScanError::config(format!(
                "ray step must be at least {} (max_distance / {})",
                min_step, MAX_MARCH_STEPS
            )));
        }
        if !self.min_distance.is_finite()
            || self.min_distance < 0.0
            || self.min_distance >= self.max_distance
        {
            return Err(ScanError::config("ray min_distance must be in [0, max_distance)"));
        }
        if !self.noise_stddev.is_finite() || self.noise_stddev < 0.0 {
            return Err(ScanError::config("ray noise_stddev must be >= 0"));
        }
        Ok(())
    }
}

/// Upper bound on march steps per cast.
const MAX_MARCH_STEPS: f64 = 1000.0;

/// Casts rays from the origin into a shared environment.
#[derive(Debug, Clone)]
pub struct RayCaster {
    environment: Arc<DemoEnvironment>,
    config: RayCastConfig,
}

impl RayCaster {
    pub fn new(environment: Arc<DemoEnvironment>, config: RayCastConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self { environment, config })
    }

    pub fn environment(&self) -> &DemoEnvironment {
        &self.environment
    }

    pub fn config(&self) -> &RayCastConfig {
        &self.config
    }

    /// Distance to the first hit along `heading_deg`, or `max_distance`.
    pub fn cast(&self, heading_deg: f64) -> f64 {
        self.cast_hit(heading_deg).unwrap_or(self.config.max_distance)
    }

    /// Distance to the first hit along `heading_deg`, `None` on a miss.
    ///
    /// Steps are computed as `min_distance + k·step` rather than summed, so
    /// repeated casts are bit-identical. Equal-distance grazes resolve to
    /// whichever obstacle the ascending scan meets first.
    pub fn cast_hit(&self, heading_deg: f64) -> Option<f64> {
        if !heading_deg.is_finite() {
            return None;
        }
        let heading_rad = heading_deg.to_radians();
        let mut k: u64 = 0;
        loop {
            let distance = self.config.min_distance + k as f64 * self.config.step;
            if distance >= self.config.max_distance {
                return None;
            }
            let p = polar_to_cartesian(distance, heading_rad);
            if self.environment.is_occupied(&p) {
                return Some(distance);
            }
            k += 1;
        }
    }

    /// `cast_hit` plus Gaussian jitter, clamped to the valid range.
    ///
    /// Hit or miss is settled before the jitter, so a hit pushed up to
    /// `max_distance` is still a hit.
    pub fn cast_noisy(&self, heading_deg: f64, noise: &mut NoiseSource) -> Option<f64> {
        let distance = self.cast_hit(heading_deg)?;
        Some(
            (distance + noise.gaussian(self.config.noise_stddev))
                .clamp(self.config.min_distance.max(f64::EPSILON), self.config.max_distance),
        )
    }

    /// Casts `rays` evenly spread sub-rays across `±half_width_rad` around
    /// `heading_deg`. Returns `(sub_heading_deg, hit)` for every ray.
    pub fn cast_beam(
        &self,
        heading_deg: f64,
        half_width_rad: f64,
        rays: usize,
        noise: &mut NoiseSource,
    ) -> Vec<(f64, Option<f64>)> {
        if rays <= 1 {
            return vec![(heading_deg, self.cast_noisy(heading_deg, noise))];
        }
        let half_width_deg = half_width_rad.to_degrees();
        let span = 2.0 * half_width_deg;
        (0..rays)
            .map(|i| {
                let offset = -half_width_deg + span * i as f64 / (rays - 1) as f64;
                let heading = (heading_deg + offset).rem_euclid(360.0);
                (heading, self.cast_noisy(heading, noise))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn caster(env: DemoEnvironment, noise_stddev: f64) -> RayCaster {
        let config = RayCastConfig {
            noise_stddev,
            ..Default::default()
        };
        RayCaster::new(Arc::new(env), config).unwrap()
    }

    #[test]
    fn test_single_wall_straight_ahead() {
        let rc = caster(DemoEnvironment::single_wall(100.0, -50.0, 50.0), 0.0);
        let d = rc.cast(0.0);
        assert_abs_diff_eq!(d, 100.0, epsilon = rc.config().step + 1.0);
    }

    #[test]
    fn test_single_wall_sideways_misses() {
        let rc = caster(DemoEnvironment::single_wall(100.0, -50.0, 50.0), 0.0);
        assert_eq!(rc.cast(90.0), 200.0);
        assert_eq!(rc.cast(180.0), 200.0);
        assert!(rc.cast_hit(270.0).is_none());
    }

    #[test]
    fn test_cast_deterministic() {
        let rc = caster(DemoEnvironment::room(7), 0.0);
        for heading in (0..360).step_by(7) {
            assert_eq!(rc.cast(heading as f64), rc.cast(heading as f64));
        }
    }

    #[test]
    fn test_noise_only_after_hit() {
        let rc = caster(DemoEnvironment::single_wall(100.0, -50.0, 50.0), 3.0);
        let clean = rc.cast(0.0);
        let mut noise = NoiseSource::new(11);
        let noisy: Vec<f64> = (0..50)
            .filter_map(|_| rc.cast_noisy(0.0, &mut noise))
            .collect();
        assert_eq!(noisy.len(), 50);
        assert!(noisy.iter().any(|&d| d != clean));
        let mean = noisy.iter().sum::<f64>() / noisy.len() as f64;
        assert_abs_diff_eq!(mean, clean, epsilon = 2.0);

        // Misses stay misses
        assert_eq!(rc.cast_noisy(90.0, &mut noise), None);
    }

    #[test]
    fn test_noisy_hit_near_range_stays_hit() {
        // Clean hit at 198 cm, two sigma from the 200 cm ceiling
        let rc = caster(DemoEnvironment::single_wall(199.0, -50.0, 50.0), 2.0);
        assert!(rc.cast_hit(0.0).is_some());
        let mut noise = NoiseSource::new(21);
        for _ in 0..500 {
            let d = rc.cast_noisy(0.0, &mut noise).unwrap();
            assert!(d <= rc.config().max_distance);
        }
    }

    #[test]
    fn test_circle_hit() {
        let env = DemoEnvironment::new(vec![DemoObstacle::circle(0.0, 50.0, 10.0)]).unwrap();
        let rc = caster(env, 0.0);
        assert_abs_diff_eq!(rc.cast(0.0), 40.0, epsilon = 1.0);
        assert_eq!(rc.cast(90.0), 200.0);
    }

    #[test]
    fn test_rect_hit() {
        let env = DemoEnvironment::new(vec![DemoObstacle::rect(20.0, -10.0, 30.0, 20.0)]).unwrap();
        let rc = caster(env, 0.0);
        assert_abs_diff_eq!(rc.cast(90.0), 20.0, epsilon = 1.0);
    }

    #[test]
    fn test_nearest_obstacle_wins() {
        let env = DemoEnvironment::new(vec![
            DemoObstacle::wall(-50.0, 150.0, 50.0, 150.0, 2.0),
            DemoObstacle::circle(0.0, 60.0, 5.0),
        ])
        .unwrap();
        let rc = caster(env, 0.0);
        assert_abs_diff_eq!(rc.cast(0.0), 55.0, epsilon = 1.0);
    }

    #[test]
    fn test_room_is_seed_deterministic() {
        assert_eq!(DemoEnvironment::room(42), DemoEnvironment::room(42));
        assert_ne!(DemoEnvironment::room(42), DemoEnvironment::room(43));
    }

    #[test]
    fn test_radar_room_is_closed() {
        // Sensor sits inside the room: every heading hits something
        let rc = caster(DemoEnvironment::radar_room(), 0.0);
        for heading in (0..360).step_by(5) {
            let d = rc.cast_hit(heading as f64);
            assert!(d.is_some(), "heading {} missed", heading);
            assert!(d.unwrap() > rc.config().min_distance);
        }
    }

    #[test]
    fn test_beam_spread() {
        let rc = caster(DemoEnvironment::single_wall(100.0, -50.0, 50.0), 0.0);
        let mut noise = NoiseSource::new(3);
        let beam = rc.cast_beam(0.0, 0.3, 15, &mut noise);
        assert_eq!(beam.len(), 15);
        assert_abs_diff_eq!(beam[7].1.unwrap(), rc.cast(0.0), epsilon = 1.0);
        assert!(beam.iter().all(|&(_, d)| d.is_some()));

        let single = rc.cast_beam(0.0, 0.3, 1, &mut noise);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_rejects_degenerate() {
        assert!(DemoEnvironment::new(vec![DemoObstacle::circle(0.0, 0.0, 0.0)]).is_err());
        assert!(DemoEnvironment::new(vec![DemoObstacle::rect(0.0, 0.0, -1.0, 1.0)]).is_err());

        let env = Arc::new(DemoEnvironment::new(vec![]).unwrap());
        let bad = RayCastConfig {
            step: 0.0,
            ..Default::default()
        };
        assert!(RayCaster::new(env.clone(), bad).is_err());
    }

    #[test]
    fn test_step_floor_bounds_march() {
        let env = Arc::new(DemoEnvironment::new(vec![]).unwrap());
        let tiny = RayCastConfig {
            step: 1e-9,
            ..Default::default()
        };
        assert!(RayCaster::new(env.clone(), tiny).is_err());

        // 200 cm / 1000 steps is the smallest accepted step
        let floor = RayCastConfig {
            step: 0.2,
            ..Default::default()
        };
        let rc = RayCaster::new(env, floor).unwrap();
        assert!(rc.cast_hit(0.0).is_none());
    }
}
