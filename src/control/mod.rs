//! Control core: behavioral state machine and PI wall-distance regulator.

mod behavior;
mod pi;

pub use behavior::{ControllerMode, WallFollower, next_mode};
pub use pi::{DT_S, PiController, PiState, angular_max};

use serde::{Deserialize, Serialize};

/// Velocity command for the differential-drive base.
///
/// Produced fresh each control tick; has no persistent identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    /// Linear velocity (m/s)
    pub linear_mps: f32,
    /// Angular velocity (rad/s)
    pub angular_radps: f32,
}

impl VelocityCommand {
    pub fn new(linear_mps: f32, angular_radps: f32) -> Self {
        Self {
            linear_mps,
            angular_radps,
        }
    }
}
