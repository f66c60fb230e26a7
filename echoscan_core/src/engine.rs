//! Scan engine: readings in, colored aging points out.
//!
//! One tick is: validate → (smooth) → project → scatter → append. Live
//! readings enter through [`ScanEngine::submit_reading`]; demo readings are
//! synthesized by the ray caster in [`ScanEngine::tick_demo`]. The renderer
//! pulls [`ScanEngine::snapshot`], which never mutates the engine.
//!
//! The engine is single-threaded. Readings from an I/O thread are handed
//! over through a channel and submitted from the tick loop.

use crate::color::{ColorMapper, Rgb};
use crate::config::ScanConfig;
use crate::environment::{DemoEnvironment, RayCaster};
use crate::error::{ScanError, ScanResult};
use crate::filter::ReadingFilter;
use crate::noise::{derive_seed, NoiseSource};
use crate::point_buffer::{Point, PointBuffer};
use crate::projection::{CoordinateProjector, Projection, ProjectionMode};
use crate::reading::Reading;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Size hint used when a stored point carries none.
const DEFAULT_POINT_SIZE: f64 = 2.0;

/// One point as handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPoint {
    pub x: f64,
    pub y: f64,
    pub color: Rgb,

    /// Size after age shrink
    pub size: f64,

    /// Opacity in [fade, 1], newest brightest
    pub alpha: f64,
}

/// Running counters for the HUD and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Readings accepted
    pub scans: u64,

    /// Readings dropped at validation
    pub rejected: u64,

    /// Demo casts that hit nothing
    pub misses: u64,

    /// Points stored
    pub points_appended: u64,

    /// Points removed by buffer overflow
    pub evicted: u64,
}

/// Point-cloud accumulation engine.
pub struct ScanEngine {
    config: ScanConfig,
    buffer: PointBuffer,
    colors: ColorMapper,
    projector: CoordinateProjector,
    filter: Option<ReadingFilter>,
    caster: Option<RayCaster>,

    /// Scatter jitter
    scatter_noise: NoiseSource,

    /// Ray-cast jitter
    demo_noise: NoiseSource,

    /// Engine time (monotonic seconds)
    clock: f64,

    /// Time of the previous accepted reading, for filter follow steps
    last_reading_at: Option<f64>,

    /// Heading the demo caster points at next
    demo_heading: f64,

    last_distance: Option<f64>,
    last_heading: Option<f64>,
    last_state: Option<String>,
    stats: ScanStats,
}

impl ScanEngine {
    /// Builds an engine. Configuration errors surface here, never later.
    ///
    /// `environment` enables [`tick_demo`](Self::tick_demo); without it demo
    /// ticks only advance the clock.
    pub fn new(config: ScanConfig, environment: Option<Arc<DemoEnvironment>>) -> ScanResult<Self> {
        config.validate()?;

        let buffer = PointBuffer::new(config.max_points)?;
        let colors = ColorMapper::new(&config.gradient, config.color_resolution)?;
        let projector = CoordinateProjector::new(config.projection, config.max_distance)?;
        let filter = config.smoothing.map(ReadingFilter::new).transpose()?;
        let caster = environment
            .map(|env| RayCaster::new(env, config.ray_cast()))
            .transpose()?;

        info!(
            "ScanEngine ready: mode={}, max_points={}, max_distance={}, lifetime={}s, smoothing={}, demo={}",
            config.projection.mode,
            config.max_points,
            config.max_distance,
            config.lifetime_seconds,
            filter.is_some(),
            caster.is_some()
        );

        Ok(Self {
            scatter_noise: NoiseSource::new(derive_seed(config.seed, 1)),
            demo_noise: NoiseSource::new(derive_seed(config.seed, 2)),
            config,
            buffer,
            colors,
            projector,
            filter,
            caster,
            clock: 0.0,
            last_reading_at: None,
            demo_heading: 0.0,
            last_distance: None,
            last_heading: None,
            last_state: None,
            stats: ScanStats::default(),
        })
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// Submits one live reading taken at `timestamp` (monotonic seconds).
    ///
    /// Invalid readings (non-positive or non-finite distance, distance
    /// beyond `max_distance`, heading outside [0, 360)) are dropped and
    /// counted. Returns the number of points appended.
    pub fn submit_reading(
        &mut self,
        distance_cm: f64,
        heading_deg: Option<f64>,
        state: Option<&str>,
        timestamp: f64,
    ) -> usize {
        if timestamp.is_finite() {
            self.clock = self.clock.max(timestamp);
        }

        let reading = match self.validate(distance_cm, heading_deg, state) {
            Ok(reading) => reading,
            Err(e) => {
                self.stats.rejected += 1;
                trace!("Dropped reading: {}", e);
                return 0;
            }
        };

        let dt = self.elapsed_since_last_reading();
        self.ingest(reading, dt)
    }

    /// Submits a pre-validated reading at the current engine time.
    pub fn submit(&mut self, reading: Reading) -> usize {
        self.submit_reading(
            reading.distance,
            reading.heading,
            reading.state.as_deref(),
            self.clock,
        )
    }

    /// Advances the clock by `dt` and casts one synthetic reading.
    ///
    /// With `beam_rays > 1` a fan of rays is cast and every hit becomes a
    /// reading. Misses produce no points. Returns the number appended.
    pub fn tick_demo(&mut self, dt: f64) -> usize {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;

        let Some(caster) = self.caster.as_ref() else {
            return 0;
        };

        let heading = self.demo_heading;
        self.demo_heading = (heading + self.config.demo.heading_step_deg).rem_euclid(360.0);

        let rays = caster.cast_beam(
            heading,
            self.config.demo.beam_half_width_rad,
            self.config.demo.beam_rays,
            &mut self.demo_noise,
        );
        let hits: Vec<(f64, f64)> = rays
            .into_iter()
            .filter_map(|(ray_heading, hit)| hit.map(|distance| (ray_heading, distance)))
            .collect();

        let misses = self.config.demo.beam_rays.max(1) - hits.len();
        self.stats.misses += misses as u64;
        if hits.is_empty() {
            trace!("Demo cast at {:.1}° missed", heading);
            return 0;
        }

        let dt = self.elapsed_since_last_reading();
        let mut appended = 0;
        for (i, (heading, distance)) in hits.into_iter().enumerate() {
            let reading = Reading {
                distance,
                heading: Some(heading),
                state: None,
            };
            // Only the first ray of a fan carries the elapsed time
            appended += self.ingest(reading, if i == 0 { dt } else { 0.0 });
        }
        appended
    }

    fn validate(
        &self,
        distance_cm: f64,
        heading_deg: Option<f64>,
        state: Option<&str>,
    ) -> ScanResult<Reading> {
        let reading = Reading::new(distance_cm, heading_deg, state.map(str::to_string))?;
        if reading.distance > self.config.max_distance {
            return Err(ScanError::invalid(format!(
                "distance {} beyond max_distance {}",
                reading.distance, self.config.max_distance
            )));
        }
        Ok(reading)
    }

    fn elapsed_since_last_reading(&mut self) -> f64 {
        let dt = self
            .last_reading_at
            .map_or(0.0, |last| (self.clock - last).max(0.0));
        self.last_reading_at = Some(self.clock);
        dt
    }

    /// Runs an accepted reading through smoothing, projection and scatter.
    fn ingest(&mut self, reading: Reading, dt: f64) -> usize {
        let raw = reading.distance.max(self.config.min_distance);

        let distance = match self.filter.as_mut() {
            Some(filter) => {
                filter.push(raw);
                filter.advance(dt).unwrap_or(raw)
            }
            None => raw,
        };

        let heading = match (self.projector.mode(), reading.heading) {
            (_, Some(h)) => Some(h),
            (ProjectionMode::PolarPlanar, None) => {
                let step = self.config.demo.heading_step_deg;
                Some(self.last_heading.map_or(0.0, |h| (h + step).rem_euclid(360.0)))
            }
            (_, None) => None,
        };

        let projection = match self.projector.project(distance, heading) {
            Ok(p) => p,
            Err(e) => {
                self.stats.rejected += 1;
                trace!("Dropped reading: {}", e);
                return 0;
            }
        };

        let appended = self.scatter(distance, &projection);

        self.stats.scans += 1;
        self.stats.points_appended += appended as u64;
        self.last_distance = Some(distance);
        if heading.is_some() {
            self.last_heading = heading;
        }
        if reading.state.is_some() {
            self.last_state = reading.state;
        }

        debug!(
            "Scan #{}: d={:.1}cm heading={:?} points={} buffered={}",
            self.stats.scans,
            distance,
            heading,
            appended,
            self.buffer.len()
        );
        appended
    }

    // ========================================================================
    // SCATTER
    // ========================================================================

    /// Appends the jittered sub-points of one projected reading.
    fn scatter(&mut self, distance: f64, projection: &Projection) -> usize {
        let scatter = self.config.scatter;
        let count = scatter.count_for(projection.depth);
        let now = self.clock;
        let depth = projection.depth;
        let evicted_before = self.buffer.evicted();
        let mut appended = 0;

        for _ in 0..count {
            let distance_std = scatter.distance_stddev + scatter.distance_stddev_ratio * distance;
            let sub_distance = (distance + self.scatter_noise.gaussian(distance_std))
                .clamp(self.config.min_distance.max(f64::EPSILON), self.config.max_distance);

            let position: Vector2<f64> = match self.projector.mode() {
                ProjectionMode::PolarPlanar => {
                    let heading = projection.heading_rad.unwrap_or(0.0)
                        + self.scatter_noise.gaussian(scatter.angle_stddev_rad);
                    self.projector.place_polar(sub_distance, heading)
                }
                ProjectionMode::ForwardRelative => {
                    let lateral = self
                        .scatter_noise
                        .gaussian(scatter.lateral_stddev + scatter.lateral_depth_gain * depth);
                    self.projector.place_forward(sub_distance, lateral)
                }
                ProjectionMode::Pseudo3d => {
                    let dx = self
                        .scatter_noise
                        .gaussian(scatter.lateral_stddev + scatter.lateral_depth_gain * depth);
                    let dy = self.scatter_noise.gaussian(
                        scatter.vertical_stddev + scatter.vertical_near_gain * (1.0 - depth),
                    );
                    self.projector
                        .clamp(projection.position + Vector2::new(dx, dy))
                }
            };

            let size = if scatter.size_jitter > 0.0 {
                projection.size
                    * self
                        .scatter_noise
                        .uniform(1.0 - scatter.size_jitter, 1.0 + scatter.size_jitter)
            } else {
                projection.size
            };

            if self
                .buffer
                .append(Point::new(position, sub_distance, Some(size), now))
            {
                appended += 1;
            }
        }
        self.stats.evicted += self.buffer.evicted() - evicted_before;
        appended
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    /// Render state of every point younger than the lifetime at `now`,
    /// in insertion order. Pure.
    pub fn snapshot(&self, now: f64) -> Vec<RenderPoint> {
        let lifetime = self.config.lifetime_seconds;
        self.buffer
            .visible(now, lifetime)
            .map(|p| {
                let age = (p.age(now) / lifetime).clamp(0.0, 1.0);
                RenderPoint {
                    x: p.position.x,
                    y: p.position.y,
                    color: self.colors.map_distance(p.distance, self.config.max_distance),
                    size: p.size.unwrap_or(DEFAULT_POINT_SIZE) * (1.0 - 0.5 * age),
                    alpha: (1.0 - age).max(self.config.fade),
                }
            })
            .collect()
    }

    /// Number of points visible at `now`.
    pub fn visible_count(&self, now: f64) -> usize {
        self.buffer.visible_count(now, self.config.lifetime_seconds)
    }

    /// Drops expired points from the buffer front. Does not change any
    /// snapshot.
    pub fn purge_expired(&mut self, now: f64) -> usize {
        self.buffer.purge_expired(now, self.config.lifetime_seconds)
    }

    // ========================================================================
    // STATE
    // ========================================================================

    /// Empties the point buffer, keeping counters and filter state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        info!("Point buffer cleared");
    }

    /// Clears points, smoothing, camera sweep, HUD state and counters.
    pub fn reset(&mut self) {
        self.buffer.clear();
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
        self.projector.reset();
        self.last_reading_at = None;
        self.demo_heading = 0.0;
        self.last_distance = None;
        self.last_heading = None;
        self.last_state = None;
        self.stats = ScanStats::default();
        info!("ScanEngine reset");
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Engine time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Last distance fed to the projector (smoothed when enabled).
    pub fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }

    pub fn last_heading(&self) -> Option<f64> {
        self.last_heading
    }

    pub fn last_state(&self) -> Option<&str> {
        self.last_state.as_deref()
    }

    /// Smoothed distance, if smoothing is enabled and has samples.
    pub fn smoothed_distance(&self) -> Option<f64> {
        self.filter.as_ref().and_then(ReadingFilter::current)
    }

    /// Pseudo-3D camera angle (degrees).
    pub fn camera_angle_deg(&self) -> f64 {
        self.projector.camera_angle_deg()
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    pub fn projector(&self) -> &CoordinateProjector {
        &self.projector
    }

    pub fn has_demo(&self) -> bool {
        self.caster.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Gradient;
    use crate::config::ScatterConfig;
    use crate::filter::FilterConfig;
    use crate::projection::ProjectionConfig;
    use approx::assert_relative_eq;

    fn single_point_config() -> ScanConfig {
        ScanConfig {
            scatter: ScatterConfig {
                near_count: 1,
                far_count: 1,
                min_count: 1,
                distance_stddev: 0.0,
                angle_stddev_rad: 0.0,
                ..Default::default()
            },
            seed: 42,
            ..Default::default()
        }
    }

    fn engine(config: ScanConfig) -> ScanEngine {
        ScanEngine::new(config, None).unwrap()
    }

    #[test]
    fn test_rejects_negative_distance() {
        let mut e = engine(single_point_config());
        assert_eq!(e.submit_reading(-5.0, Some(0.0), None, 0.0), 0);
        assert!(e.snapshot(0.0).is_empty());
        assert_eq!(e.stats().rejected, 1);
        assert_eq!(e.stats().scans, 0);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let mut e = engine(single_point_config());
        e.submit_reading(f64::NAN, Some(0.0), None, 0.0);
        e.submit_reading(0.0, Some(0.0), None, 0.0);
        e.submit_reading(50.0, Some(360.0), None, 0.0);
        e.submit_reading(50.0, Some(-1.0), None, 0.0);
        e.submit_reading(500.0, Some(0.0), None, 0.0); // beyond max_distance
        assert_eq!(e.stats().rejected, 5);
        assert!(e.buffer().is_empty());
    }

    #[test]
    fn test_max_points_keeps_last_three() {
        let mut e = engine(ScanConfig {
            max_points: 3,
            ..single_point_config()
        });
        for i in 1..=5 {
            assert_eq!(e.submit_reading(i as f64 * 10.0, Some(0.0), None, i as f64), 1);
        }
        let snapshot = e.snapshot(5.0);
        assert_eq!(snapshot.len(), 3);
        let ys: Vec<f64> = snapshot.iter().map(|p| p.y).collect();
        assert_relative_eq!(ys[0], 30.0, epsilon = 1e-9);
        assert_relative_eq!(ys[1], 40.0, epsilon = 1e-9);
        assert_relative_eq!(ys[2], 50.0, epsilon = 1e-9);
        assert_eq!(e.stats().evicted, 2);
    }

    #[test]
    fn test_lifetime_window() {
        let mut e = engine(ScanConfig {
            lifetime_seconds: 10.0,
            ..single_point_config()
        });
        e.submit_reading(80.0, Some(45.0), None, 0.0);
        assert_eq!(e.snapshot(9.0).len(), 1);
        assert_eq!(e.snapshot(11.0).len(), 0);
    }

    #[test]
    fn test_snapshot_is_pure() {
        let mut e = engine(single_point_config());
        e.submit_reading(80.0, Some(45.0), None, 0.0);
        let a = e.snapshot(5.0);
        let b = e.snapshot(5.0);
        assert_eq!(a, b);
        assert_eq!(e.buffer().len(), 1);
    }

    #[test]
    fn test_fade_and_shrink_with_age() {
        let mut e = engine(ScanConfig {
            lifetime_seconds: 10.0,
            fade: 0.2,
            ..single_point_config()
        });
        e.submit_reading(100.0, Some(0.0), None, 0.0);

        let fresh = e.snapshot(0.0)[0];
        assert_relative_eq!(fresh.alpha, 1.0);

        let half = e.snapshot(5.0)[0];
        assert_relative_eq!(half.alpha, 0.5, epsilon = 1e-9);
        assert_relative_eq!(half.size, fresh.size * 0.75, epsilon = 1e-9);

        let old = e.snapshot(9.9)[0];
        assert_relative_eq!(old.alpha, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_color_follows_distance() {
        let mut e = engine(ScanConfig {
            min_distance: 0.0,
            ..single_point_config()
        });
        e.submit_reading(0.1, Some(0.0), None, 0.0);
        e.submit_reading(200.0, Some(0.0), None, 0.0);
        let snapshot = e.snapshot(0.0);
        let stops = Gradient::radar();
        assert_eq!(snapshot[0].color, stops[0].color);
        assert_eq!(snapshot[1].color, stops[stops.len() - 1].color);
    }

    #[test]
    fn test_min_distance_clamp() {
        let mut e = engine(single_point_config());
        e.submit_reading(0.5, Some(0.0), None, 0.0);
        assert_relative_eq!(e.last_distance().unwrap(), 2.0);
    }

    #[test]
    fn test_missing_heading_steps_from_last() {
        let mut e = engine(single_point_config());
        e.submit_reading(50.0, Some(10.0), None, 0.0);
        e.submit_reading(50.0, None, None, 0.1);
        assert_relative_eq!(e.last_heading().unwrap(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scatter_count_near_and_far() {
        let mut e = engine(ScanConfig {
            scatter: ScatterConfig {
                near_count: 10,
                far_count: 2,
                min_count: 1,
                ..Default::default()
            },
            seed: 3,
            ..Default::default()
        });
        assert_eq!(e.submit_reading(2.0, Some(0.0), None, 0.0), 10);
        assert_eq!(e.submit_reading(200.0, Some(0.0), None, 0.0), 2);
    }

    #[test]
    fn test_points_stay_in_viewport() {
        let mut e = engine(ScanConfig::point_cloud().with_seed(9));
        for i in 0..200 {
            e.submit_reading(1.0 + (i % 299) as f64, None, None, i as f64 * 0.01);
        }
        let viewport = *e.projector().viewport();
        for p in e.snapshot(2.0) {
            assert!(viewport.contains(&Vector2::new(p.x, p.y)));
        }
    }

    #[test]
    fn test_forward_mode_ignores_heading() {
        let mut e = engine(ScanConfig {
            projection: ProjectionConfig {
                mode: ProjectionMode::ForwardRelative,
                ..Default::default()
            },
            ..single_point_config()
        });
        e.submit_reading(40.0, Some(200.0), None, 0.0);
        let p = e.snapshot(0.0)[0];
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 100.0);
    }

    #[test]
    fn test_smoothing_follows_median() {
        let mut e = engine(ScanConfig {
            smoothing: Some(FilterConfig { window: 5, gain: 8.0 }),
            projection: ProjectionConfig {
                mode: ProjectionMode::ForwardRelative,
                ..Default::default()
            },
            ..single_point_config()
        });
        for (i, d) in [50.0, 50.0, 50.0, 50.0].iter().enumerate() {
            e.submit_reading(*d, None, Some("DRIVE"), i as f64 * 0.1);
        }
        // A single spike does not move the median
        e.submit_reading(140.0, None, Some("DRIVE"), 0.4);
        assert_relative_eq!(e.smoothed_distance().unwrap(), 50.0, epsilon = 1e-9);
        assert_eq!(e.last_state(), Some("DRIVE"));
    }

    #[test]
    fn test_demo_single_wall() {
        let env = Arc::new(DemoEnvironment::single_wall(100.0, -50.0, 50.0));
        let config = ScanConfig {
            demo: crate::config::DemoConfig {
                heading_step_deg: 0.0,
                noise_stddev: 0.0,
                ..Default::default()
            },
            ..single_point_config()
        };
        let mut e = ScanEngine::new(config, Some(env)).unwrap();
        assert_eq!(e.tick_demo(0.1), 1);
        assert_relative_eq!(e.last_distance().unwrap(), 99.0, epsilon = 1.0);
        assert_relative_eq!(e.clock(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_demo_miss_produces_nothing() {
        let env = Arc::new(DemoEnvironment::single_wall(100.0, -50.0, 50.0));
        let config = ScanConfig {
            demo: crate::config::DemoConfig {
                heading_step_deg: 90.0,
                ..Default::default()
            },
            ..single_point_config()
        };
        let mut e = ScanEngine::new(config, Some(env)).unwrap();
        // First cast looks straight ahead at the wall, the second sideways
        assert_eq!(e.tick_demo(0.1), 1);
        assert_eq!(e.tick_demo(0.1), 0);
        assert_eq!(e.stats().misses, 1);
        assert_eq!(e.buffer().len(), 1);
    }

    #[test]
    fn test_demo_sweep_starts_at_zero() {
        let env = Arc::new(DemoEnvironment::radar_room());
        let mut e = ScanEngine::new(single_point_config(), Some(env)).unwrap();
        e.tick_demo(0.1);
        assert_relative_eq!(e.last_heading().unwrap(), 0.0);
        e.tick_demo(0.1);
        assert_relative_eq!(e.last_heading().unwrap(), 2.0);

        e.reset();
        e.tick_demo(0.1);
        assert_relative_eq!(e.last_heading().unwrap(), 0.0);
    }

    #[test]
    fn test_demo_hit_near_range_is_kept() {
        // Clean hit two sigma inside the range ceiling
        let env = Arc::new(DemoEnvironment::single_wall(199.0, -50.0, 50.0));
        let config = ScanConfig {
            demo: crate::config::DemoConfig {
                heading_step_deg: 0.0,
                noise_stddev: 2.0,
                ..Default::default()
            },
            ..single_point_config()
        };
        let mut e = ScanEngine::new(config, Some(env)).unwrap();
        for _ in 0..200 {
            e.tick_demo(0.05);
        }
        assert_eq!(e.stats().misses, 0);
        assert_eq!(e.stats().scans, 200);
    }

    #[test]
    fn test_demo_without_environment() {
        let mut e = engine(single_point_config());
        assert_eq!(e.tick_demo(0.5), 0);
        assert_relative_eq!(e.clock(), 0.5);
        assert!(!e.has_demo());
    }

    #[test]
    fn test_lidar_beam_fan() {
        let env = Arc::new(DemoEnvironment::radar_room());
        let mut e = ScanEngine::new(ScanConfig::lidar().with_seed(5), Some(env)).unwrap();
        let appended = e.tick_demo(0.05);
        // 15 rays, 2 to 5 points each, all inside the closed room
        assert!((30..=75).contains(&appended), "appended {}", appended);
    }

    #[test]
    fn test_same_seed_same_snapshot() {
        let run = || {
            let env = Arc::new(DemoEnvironment::room(11));
            let mut e = ScanEngine::new(ScanConfig::radar().with_seed(11), Some(env)).unwrap();
            for _ in 0..50 {
                e.tick_demo(0.05);
            }
            e.snapshot(e.clock())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut e = engine(single_point_config());
        e.submit_reading(50.0, Some(0.0), None, 5.0);
        e.submit_reading(50.0, Some(0.0), None, 3.0);
        assert_relative_eq!(e.clock(), 5.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut e = engine(single_point_config());
        e.submit_reading(50.0, Some(0.0), Some("DRIVE"), 0.0);
        e.reset();
        assert!(e.snapshot(0.0).is_empty());
        assert_eq!(e.last_distance(), None);
        assert_eq!(e.last_state(), None);
        assert_eq!(e.stats().scans, 0);
    }

    #[test]
    fn test_invalid_config_fails_at_construction() {
        let config = ScanConfig {
            max_points: 0,
            ..Default::default()
        };
        let err = ScanEngine::new(config, None).err().unwrap();
        assert!(err.is_fatal());
    }
}
