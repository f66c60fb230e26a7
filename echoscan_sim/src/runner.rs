//! Scenario runner - drives the engine at a fixed tick rate under a
//! virtual clock and checks the buffer invariants every tick.

use crate::error::SimError;
use crate::exporter::{ExportPoint, SimExport, SimFrame};
use crate::rover::RoverProfile;
use crate::scenarios::{ReadingSource, ScenarioId};
use crate::visualizer::RerunLogger;

use echoscan_core::noise::derive_seed;
use echoscan_core::{RenderPoint, ScanConfig, ScanEngine, ScanStats};
use echoscan_env::{ManualClock, ReadingReceiver, ScanClock};
use nalgebra::Vector2;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether every per-tick check held
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Points visible at the end
    pub final_visible_points: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioMetrics {
    /// Engine counters at the end
    pub stats: ScanStats,

    /// Largest buffer length seen
    pub peak_buffer: usize,

    /// Largest visible set seen
    pub peak_visible: usize,
}

/// Runs scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Tick rate in Hz
    tick_rate_hz: u32,

    /// Maximum duration in seconds
    max_duration_secs: f64,

    /// Export a frame every N ticks
    export_interval: u64,

    /// Replaces the scenario preset when set
    config_override: Option<ScanConfig>,

    /// Readings consumed per tick during replay
    replay_batch: usize,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tick_rate_hz: 30,
            max_duration_secs: 10.0,
            export_interval: 10,
            config_override: None,
            replay_batch: 1,
        }
    }

    /// Sets the tick rate.
    pub fn with_tick_rate(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz.max(1);
        self
    }

    /// Sets the maximum duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    /// Sets how often frames are exported.
    pub fn with_export_interval(mut self, ticks: u64) -> Self {
        self.export_interval = ticks.max(1);
        self
    }

    /// Uses `config` instead of the scenario preset.
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config_override = Some(config);
        self
    }

    /// Sets how many replayed readings are consumed per tick.
    pub fn with_replay_batch(mut self, readings: usize) -> Self {
        self.replay_batch = readings.max(1);
        self
    }

    fn dt(&self) -> f64 {
        1.0 / self.tick_rate_hz as f64
    }

    fn target_ticks(&self) -> u64 {
        (self.max_duration_secs.max(0.0) * self.tick_rate_hz as f64) as u64
    }

    fn build_engine(&self, scenario: ScenarioId) -> Result<ScanEngine, SimError> {
        let config = self
            .config_override
            .clone()
            .unwrap_or_else(|| scenario.config())
            .with_seed(self.seed);
        let environment = scenario
            .environment(derive_seed(self.seed, 3))
            .map(Arc::new);
        Ok(ScanEngine::new(config, environment)?)
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        self.run_recorded(scenario, None, &RerunLogger::disabled())
    }

    /// Runs a scenario, exporting frames and logging to Rerun.
    pub fn run_recorded(
        &self,
        scenario: ScenarioId,
        mut export: Option<&mut SimExport>,
        logger: &RerunLogger,
    ) -> Result<ScenarioResult, SimError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        let mut engine = self.build_engine(scenario)?;
        let clock = ManualClock::new();
        let mut rover = RoverProfile::new(derive_seed(self.seed, 4));
        let mut check = TickCheck::default();
        let dt = self.dt();
        let target_ticks = self.target_ticks();
        let mut last_state: Option<&'static str> = None;

        for tick in 0..target_ticks {
            // Demo casts keep engine time; live readings are stamped by the clock
            let now = match scenario.source() {
                ReadingSource::RayCast => {
                    engine.tick_demo(dt);
                    engine.clock()
                }
                ReadingSource::Rover => {
                    clock.advance_secs(dt);
                    let now = clock.now_secs();
                    let (distance, state) = rover.step(dt);
                    engine.submit_reading(distance, None, Some(state.label()), now);
                    if last_state != Some(state.label()) {
                        logger.log_event("scan/state", state.label());
                        last_state = Some(state.label());
                    }
                    now
                }
            };

            let snapshot = engine.snapshot(now);
            check.observe(&engine, &snapshot, now);
            self.record(tick, now, &engine, &snapshot, export.as_deref_mut(), logger);

            if tick % self.tick_rate_hz as u64 == 0 {
                debug!(
                    "  t={:.1}s | visible={} | buffered={} | last={:?}",
                    now,
                    snapshot.len(),
                    engine.buffer().len(),
                    engine.last_distance()
                );
            }
        }

        Ok(check.finish(scenario, self.seed, target_ticks, engine.clock(), &engine))
    }

    /// Runs `scenario`'s configuration on readings from `receiver` until the
    /// channel closes or the duration runs out.
    pub fn run_replay(
        &self,
        scenario: ScenarioId,
        mut receiver: ReadingReceiver,
        mut export: Option<&mut SimExport>,
        logger: &RerunLogger,
    ) -> Result<ScenarioResult, SimError> {
        info!("Replaying into scenario: {} (seed={})", scenario.name(), self.seed);

        // Replayed readings replace the demo source entirely
        let config = self
            .config_override
            .clone()
            .unwrap_or_else(|| scenario.config())
            .with_seed(self.seed);
        let mut engine = ScanEngine::new(config, None)?;
        let clock = ManualClock::new();
        let mut check = TickCheck::default();
        let dt = self.dt();
        let target_ticks = self.target_ticks();
        let mut ticks = 0;
        let mut exhausted = false;

        for tick in 0..target_ticks {
            clock.advance_secs(dt);
            let now = clock.now_secs();

            // Block until a full batch arrives or the source closes
            let mut batch = Vec::with_capacity(self.replay_batch);
            let mut closed = false;
            while batch.len() < self.replay_batch {
                match receiver.blocking_recv() {
                    Some(reading) => batch.push(reading),
                    None => {
                        closed = true;
                        break;
                    }
                }
            }
            for r in &batch {
                engine.submit_reading(r.distance_cm, r.heading_deg, r.state.as_deref(), now);
            }

            let snapshot = engine.snapshot(now);
            check.observe(&engine, &snapshot, now);
            self.record(tick, now, &engine, &snapshot, export.as_deref_mut(), logger);
            ticks = tick + 1;

            if closed {
                exhausted = true;
                info!("Replay source exhausted after {} ticks", ticks);
                break;
            }
        }

        if !exhausted {
            warn!("Replay stopped at the duration limit ({}s)", self.max_duration_secs);
        }
        Ok(check.finish(scenario, self.seed, ticks, clock.now_secs(), &engine))
    }

    fn record(
        &self,
        tick: u64,
        now: f64,
        engine: &ScanEngine,
        snapshot: &[RenderPoint],
        export: Option<&mut SimExport>,
        logger: &RerunLogger,
    ) {
        if tick % self.export_interval != 0 {
            return;
        }
        if let Some(export) = export {
            export.add_frame(SimFrame {
                time_sec: now,
                points: snapshot.iter().map(ExportPoint::from).collect(),
                stats: engine.stats(),
                last_distance: engine.last_distance(),
                last_heading: engine.last_heading(),
                state: engine.last_state().map(str::to_string),
            });
        }
        if logger.is_enabled() {
            logger.set_time(now);
            logger.log_points(snapshot);
            logger.log_stats(snapshot.len(), &engine.stats(), engine.last_distance());
        }
    }
}

/// Per-tick invariant checks.
#[derive(Default)]
struct TickCheck {
    metrics: ScenarioMetrics,
    failure: Option<String>,
}

impl TickCheck {
    fn observe(&mut self, engine: &ScanEngine, snapshot: &[RenderPoint], now: f64) {
        let buffered = engine.buffer().len();
        self.metrics.peak_buffer = self.metrics.peak_buffer.max(buffered);
        self.metrics.peak_visible = self.metrics.peak_visible.max(snapshot.len());

        if self.failure.is_some() {
            return;
        }
        let max_points = engine.config().max_points;
        if buffered > max_points {
            self.failure = Some(format!(
                "buffer holds {} points, capacity {} (t={:.2}s)",
                buffered, max_points, now
            ));
        } else if snapshot.len() != engine.visible_count(now) {
            self.failure = Some(format!("snapshot size differs from visible count (t={:.2}s)", now));
        } else {
            let viewport = engine.projector().viewport();
            if let Some(p) = snapshot
                .iter()
                .find(|p| !viewport.contains(&Vector2::new(p.x, p.y)))
            {
                self.failure = Some(format!(
                    "point ({:.1}, {:.1}) outside viewport (t={:.2}s)",
                    p.x, p.y, now
                ));
            }
        }
    }

    fn finish(
        mut self,
        scenario: ScenarioId,
        seed: u64,
        total_ticks: u64,
        final_time_secs: f64,
        engine: &ScanEngine,
    ) -> ScenarioResult {
        self.metrics.stats = engine.stats();
        if self.failure.is_none() && total_ticks > 0 && engine.stats().points_appended == 0 {
            self.failure = Some("no points were produced".to_string());
        }
        ScenarioResult {
            scenario,
            seed,
            passed: self.failure.is_none(),
            total_ticks,
            final_time_secs,
            final_visible_points: engine.visible_count(final_time_secs),
            failure_reason: self.failure,
            metrics: self.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use echoscan_env::{reading_channel, RawReading};

    #[test]
    fn test_every_scenario_passes() {
        let runner = ScenarioRunner::new(42).with_duration(3.0);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario).unwrap();
            assert!(
                result.passed,
                "{} failed: {:?}",
                scenario,
                result.failure_reason
            );
            assert_eq!(result.total_ticks, 90);
            assert_relative_eq!(result.final_time_secs, 3.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_final_time_tracks_tick_rate() {
        let runner = ScenarioRunner::new(8).with_tick_rate(20).with_duration(1.5);
        for scenario in [ScenarioId::Radar, ScenarioId::Forward] {
            let result = runner.run(scenario).unwrap();
            assert_eq!(result.total_ticks, 30);
            assert_relative_eq!(result.final_time_secs, 1.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_buffer_respects_capacity_under_load() {
        let config = ScanConfig {
            max_points: 50,
            ..ScanConfig::lidar()
        };
        let runner = ScenarioRunner::new(7).with_duration(2.0).with_config(config);
        let result = runner.run(ScenarioId::Lidar).unwrap();
        assert!(result.passed);
        assert_eq!(result.metrics.peak_buffer, 50);
        assert!(result.metrics.stats.evicted > 0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let runner = ScenarioRunner::new(1234).with_duration(2.0);
        let a = runner.run(ScenarioId::PointCloud).unwrap();
        let b = runner.run(ScenarioId::PointCloud).unwrap();
        assert_eq!(a.metrics.stats, b.metrics.stats);
        assert_eq!(a.final_visible_points, b.final_visible_points);
    }

    #[test]
    fn test_export_frames() {
        let runner = ScenarioRunner::new(5)
            .with_duration(1.0)
            .with_export_interval(10);
        let mut export = SimExport::new("radar", 5, "polar-planar");
        let result = runner
            .run_recorded(ScenarioId::Radar, Some(&mut export), &RerunLogger::disabled())
            .unwrap();
        assert!(result.passed);
        // Ticks 0, 10 and 20 of 30
        assert_eq!(export.frames.len(), 3);
        assert!(!export.frames[2].points.is_empty());
    }

    #[test]
    fn test_rover_reports_state() {
        let runner = ScenarioRunner::new(3).with_duration(1.0).with_export_interval(1);
        let mut export = SimExport::new("sonar_pulse", 3, "forward-relative");
        runner
            .run_recorded(ScenarioId::SonarPulse, Some(&mut export), &RerunLogger::disabled())
            .unwrap();
        let last = export.frames.last().unwrap();
        assert_eq!(last.state.as_deref(), Some("DRIVE"));
        assert!(last.last_distance.is_some());
    }

    #[test]
    fn test_replay_until_closed() {
        let (tx, rx) = reading_channel(64);
        for i in 0..20 {
            tx.try_send(RawReading::new(20.0 + i as f64).with_heading(i as f64 * 5.0))
                .unwrap();
        }
        tx.try_send(RawReading::new(-5.0)).unwrap();
        drop(tx);

        let runner = ScenarioRunner::new(11).with_duration(10.0).with_replay_batch(4);
        let result = runner
            .run_replay(ScenarioId::Radar, rx, None, &RerunLogger::disabled())
            .unwrap();
        assert!(result.passed);
        assert_eq!(result.metrics.stats.scans, 20);
        assert_eq!(result.metrics.stats.rejected, 1);
        assert!(result.total_ticks < 300);
    }

    #[test]
    fn test_invalid_override_is_error() {
        let config = ScanConfig {
            max_points: 0,
            ..Default::default()
        };
        let runner = ScenarioRunner::new(1).with_config(config);
        assert!(matches!(runner.run(ScenarioId::Radar), Err(SimError::Engine(_))));
    }
}
