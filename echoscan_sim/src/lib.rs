//! EchoScan headless host.
//!
//! Drives a [`ScanEngine`](echoscan_core::ScanEngine) the way an interactive
//! visualizer would, but under a virtual clock so every run is
//! reproducible from one seed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                       │
//! │                                                          │
//! │  ManualClock ──► tick (1/30 s) ──► ScanEngine            │
//! │                    │                   │                 │
//! │       ┌────────────┼──────────┐        ▼                 │
//! │       │            │          │    snapshot(now)         │
//! │   tick_demo    RoverProfile  replay    │                 │
//! │  (ray cast)   (live stream)  (file)    ├──► checks       │
//! │                                        ├──► SimExport    │
//! │                                        └──► RerunLogger  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use echoscan_sim::{ScenarioRunner, ScenarioId};
//!
//! let runner = ScenarioRunner::new(42).with_duration(5.0);
//! let result = runner.run(ScenarioId::PointCloud)?;
//! assert!(result.passed);
//! ```

mod error;
mod exporter;
mod replay;
mod rover;
mod runner;
pub mod scenarios;
mod visualizer;

pub use error::SimError;
pub use exporter::{ExportPoint, SimExport, SimFrame};
pub use replay::{replay_lines, spawn_replay, ReplayStats};
pub use rover::{RoverProfile, RoverState};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use scenarios::{ReadingSource, ScenarioId};
pub use visualizer::RerunLogger;
