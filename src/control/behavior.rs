//! Behavioral state machine: INIT, FOLLOW, AVOID.
//!
//! The mode is recomputed every control tick from the sensor state and the
//! configuration; the only persistent piece is the one-way INIT latch that
//! sets once the robot has reached its starting position next to an
//! obstacle.

use crate::config::ControllerConfig;
use crate::control::pi::PiController;
use crate::control::{PiState, VelocityCommand};
use crate::sensors::SensorState;

/// Creep speed during the avoidance maneuver (m/s).
const AVOID_LINEAR_MPS: f32 = 0.001;
/// Fixed turn rate during the avoidance maneuver (rad/s), away from the wall.
const AVOID_ANGULAR_RADPS: f32 = 0.7;

/// Controller mode for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerMode {
    /// Drive forward until the first frontal obstacle is reached
    Init,
    /// Hold the side-wall clearance with the PI regulator
    Follow,
    /// Fixed open-loop turn away from a frontal obstacle
    Avoid,
}

/// Pure mode transition, evaluated in order: latch, front threshold, follow.
pub fn next_mode(
    sensors: &SensorState,
    config: &ControllerConfig,
    initialized: bool,
) -> ControllerMode {
    if !initialized {
        ControllerMode::Init
    } else if sensors.front_distance_m <= config.front_threshold_m {
        ControllerMode::Avoid
    } else {
        ControllerMode::Follow
    }
}

/// Wall follower: owns the INIT latch and the PI regulator state, and
/// produces one velocity command per tick.
pub struct WallFollower {
    config: ControllerConfig,
    pi: PiController,
    /// One-way latch; set when INIT completes and never cleared.
    initialized: bool,
}

impl WallFollower {
    pub fn new(config: ControllerConfig) -> Self {
        let pi = PiController::new(config.k_p, config.k_i);
        Self {
            config,
            pi,
            initialized: false,
        }
    }

    /// Whether the INIT phase has completed.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Regulator state, for status reporting.
    pub fn pi_state(&self) -> PiState {
        self.pi.state()
    }

    /// Evaluate one control tick.
    pub fn step(&mut self, sensors: &SensorState) -> (ControllerMode, VelocityCommand) {
        let mode = next_mode(sensors, &self.config, self.initialized);

        let command = match mode {
            ControllerMode::Init => self.step_init(sensors),
            ControllerMode::Follow => self.step_follow(sensors),
            ControllerMode::Avoid => self.step_avoid(),
        };

        (mode, command)
    }

    /// INIT: stay put until a front reading exists, then drive forward
    /// until the first obstacle is within threshold. Reaching it sets the
    /// latch; angular velocity is always zero here.
    fn step_init(&mut self, sensors: &SensorState) -> VelocityCommand {
        let linear = if !sensors.front_seen {
            // Must not move blind
            0.0
        } else if sensors.front_distance_m > self.config.front_threshold_m {
            self.config.desired_linear_velocity_mps
        } else {
            self.initialized = true;
            tracing::info!(
                "Starting position reached ({:.3}m ahead); switching to wall-following",
                sensors.front_distance_m
            );
            0.0
        };

        VelocityCommand::new(linear, 0.0)
    }

    /// FOLLOW: PI correction on the side-wall clearance.
    fn step_follow(&mut self, sensors: &SensorState) -> VelocityCommand {
        let side = sensors.side_distance(self.config.follow_right_wall);
        let angular = self.pi.update(
            self.config.desired_side_clearance_m,
            side,
            self.config.follow_right_wall,
            self.config.desired_linear_velocity_mps,
        );

        VelocityCommand::new(self.config.desired_linear_velocity_mps, angular)
    }

    /// AVOID: fixed open-loop turn away from the followed wall. Not
    /// sensor-driven; it ends when a later tick's front distance clears
    /// the threshold. The regulator is zeroed on every avoid tick.
    fn step_avoid(&mut self) -> VelocityCommand {
        self.pi.reset();

        let angular = if self.config.follow_right_wall {
            AVOID_ANGULAR_RADPS
        } else {
            -AVOID_ANGULAR_RADPS
        };

        VelocityCommand::new(AVOID_LINEAR_MPS, angular)
    }
}
