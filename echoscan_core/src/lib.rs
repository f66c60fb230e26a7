//! EchoScan Core - Bounded-Memory Point-Cloud Engine for Range Sensors
//!
//! Turns a stream of distance readings into colored, time-decaying points:
//!
//! ```text
//!   live Reading ──┐
//!                  ├─► ReadingFilter ─► CoordinateProjector ─► scatter ─► PointBuffer
//!   RayCaster ─────┘     (optional)      (polar / forward /               (FIFO, max_points)
//!   (DemoEnvironment)                     pseudo-3D)                           │
//!                                                                              ▼
//!                                          snapshot(now) ◄── ColorMapper ◄── visible(now, lifetime)
//! ```
//!
//! 1. **Bounded memory**: the buffer never exceeds `max_points`; overflow
//!    evicts the oldest point.
//! 2. **Temporal eviction**: snapshots only contain points younger than the
//!    configured lifetime.
//! 3. **Deterministic demos**: environments and noise are seeded, so a demo
//!    run is reproducible.

pub mod color;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod filter;
pub mod noise;
pub mod point_buffer;
pub mod projection;
pub mod reading;

// Re-export key types for convenience
pub use color::{ColorMapper, Gradient, GradientStop, Rgb};
pub use config::{DemoConfig, ScanConfig, ScatterConfig, PRESET_NAMES};
pub use engine::{RenderPoint, ScanEngine, ScanStats};
pub use environment::{DemoEnvironment, DemoObstacle, RayCastConfig, RayCaster};
pub use error::{ScanError, ScanResult};
pub use filter::{FilterConfig, ReadingFilter};
pub use noise::NoiseSource;
pub use point_buffer::{Point, PointBuffer};
pub use projection::{CoordinateProjector, ProjectionConfig, ProjectionMode, SweepPattern, Viewport};
pub use reading::Reading;
