//! Scripted rover that drives toward an obstacle, backs off and waits.
//!
//! Provides live-style readings (distance + state label) for scenarios
//! without a ray-cast environment.

use echoscan_core::NoiseSource;

/// Approach speed (cm/s, negative = closing)
const DRIVE_VELOCITY: f64 = -20.0;

/// Back-off speed (cm/s)
const REVERSE_VELOCITY: f64 = 25.0;

/// Reverse below this distance (cm)
const REVERSE_BELOW: f64 = 5.0;

/// Stop reversing beyond this distance (cm)
const WAIT_BEYOND: f64 = 20.0;

/// Turn back toward the obstacle beyond this distance (cm)
const TURN_BACK_BEYOND: f64 = 130.0;

/// Chance per step of leaving WAIT
const RESUME_PROBABILITY: f64 = 0.03;

/// Smallest distance the sensor reports (cm)
const MIN_REPORTED: f64 = 3.0;

/// Rover driving state, reported as the reading label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoverState {
    Drive,
    Reverse,
    Wait,
}

impl RoverState {
    pub fn label(&self) -> &'static str {
        match self {
            RoverState::Drive => "DRIVE",
            RoverState::Reverse => "REVERSE",
            RoverState::Wait => "WAIT",
        }
    }
}

/// Approach/reverse/wait motion profile with Gaussian sensor noise.
pub struct RoverProfile {
    /// True distance to the obstacle (cm)
    distance: f64,

    /// Current velocity (cm/s)
    velocity: f64,

    state: RoverState,

    noise: NoiseSource,

    /// Sensor noise (cm)
    noise_stddev: f64,
}

impl RoverProfile {
    /// Starts 80 cm out, driving in, with 1 cm sensor noise.
    pub fn new(seed: u64) -> Self {
        Self::with_noise(seed, 1.0)
    }

    pub fn with_noise(seed: u64, noise_stddev: f64) -> Self {
        Self {
            distance: 80.0,
            velocity: DRIVE_VELOCITY,
            state: RoverState::Drive,
            noise: NoiseSource::new(seed),
            noise_stddev: if noise_stddev.is_finite() { noise_stddev.abs() } else { 0.0 },
        }
    }

    /// Advances by `dt` seconds and returns `(reported distance, state)`.
    pub fn step(&mut self, dt: f64) -> (f64, RoverState) {
        self.distance += self.velocity * dt;

        if self.distance < REVERSE_BELOW {
            self.state = RoverState::Reverse;
            self.velocity = REVERSE_VELOCITY;
        } else if self.distance > WAIT_BEYOND && self.state == RoverState::Reverse {
            self.state = RoverState::Wait;
            self.velocity = 0.0;
        } else if self.state == RoverState::Wait && self.noise.chance(RESUME_PROBABILITY) {
            self.state = RoverState::Drive;
            self.velocity = DRIVE_VELOCITY;
        } else if self.distance > TURN_BACK_BEYOND {
            self.velocity = DRIVE_VELOCITY;
        }

        let reported = (self.distance + self.noise.gaussian(self.noise_stddev)).max(MIN_REPORTED);
        (reported, self.state)
    }

    /// True distance (cm).
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn state(&self) -> RoverState {
        self.state
    }
}
