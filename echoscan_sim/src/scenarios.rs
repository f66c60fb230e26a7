//! Visualizer scenarios for headless runs.

use echoscan_core::{DemoEnvironment, ScanConfig};

/// Where a scenario's readings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingSource {
    /// `tick_demo` against the scenario environment
    RayCast,

    /// Scripted approach/reverse rover, submitted as live readings
    Rover,
}

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Overhead radar sweep of a closed room
    Radar,

    /// Wide-beam fan against the pillar room
    Lidar,

    /// Camera-sweep point cloud of the pillar room
    PointCloud,

    /// Smoothed forward blob tracking an approaching rover
    SonarPulse,

    /// Single forward axis fed by the rover
    Forward,

    /// Left-to-right depth strip
    DepthSweep,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Radar,
            ScenarioId::Lidar,
            ScenarioId::PointCloud,
            ScenarioId::SonarPulse,
            ScenarioId::Forward,
            ScenarioId::DepthSweep,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Radar => "radar",
            ScenarioId::Lidar => "lidar",
            ScenarioId::PointCloud => "point_cloud",
            ScenarioId::SonarPulse => "sonar_pulse",
            ScenarioId::Forward => "forward",
            ScenarioId::DepthSweep => "depth_sweep",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Radar => "Polar sweep at +2°/tick, 3 scatter points, 30s memory",
            ScenarioId::Lidar => "15-ray fan ±0.3 rad, 2-5 hits per ray, 45s memory",
            ScenarioId::PointCloud => "Pseudo-3D sinusoidal sweep, 3-15 points per reading",
            ScenarioId::SonarPulse => "Median-smoothed forward view of a rover that approaches and backs off",
            ScenarioId::Forward => "One point per reading on a fixed forward axis, 8s fade",
            ScenarioId::DepthSweep => "Linear 3px-per-reading depth strip, wraps every 360°",
        }
    }

    /// Engine configuration for this scenario.
    pub fn config(&self) -> ScanConfig {
        match self {
            ScenarioId::Radar => ScanConfig::radar(),
            ScenarioId::Lidar => ScanConfig::lidar(),
            ScenarioId::PointCloud => ScanConfig::point_cloud(),
            ScenarioId::SonarPulse => ScanConfig::sonar_pulse(),
            ScenarioId::Forward => ScanConfig::forward(),
            ScenarioId::DepthSweep => ScanConfig::depth_sweep(),
        }
    }

    pub fn source(&self) -> ReadingSource {
        match self {
            ScenarioId::SonarPulse | ScenarioId::Forward => ReadingSource::Rover,
            _ => ReadingSource::RayCast,
        }
    }

    /// Demo environment, or `None` for rover-driven scenarios.
    pub fn environment(&self, seed: u64) -> Option<DemoEnvironment> {
        match self {
            ScenarioId::Radar => Some(DemoEnvironment::radar_room()),
            ScenarioId::Lidar | ScenarioId::PointCloud | ScenarioId::DepthSweep => {
                Some(DemoEnvironment::room(seed))
            }
            ScenarioId::SonarPulse | ScenarioId::Forward => None,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "radar" => Ok(ScenarioId::Radar),
            "lidar" => Ok(ScenarioId::Lidar),
            "point_cloud" | "pointcloud" => Ok(ScenarioId::PointCloud),
            "sonar_pulse" | "pulse" => Ok(ScenarioId::SonarPulse),
            "forward" | "sonar_radar" => Ok(ScenarioId::Forward),
            "depth_sweep" | "depth_scanner" => Ok(ScenarioId::DepthSweep),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
