//! PI regulator holding the robot at a target distance from a side wall.

// Drivetrain geometry used to bound the turn rate request.
const WHEEL_RADIUS_M: f32 = 0.016;
const MIN_WHEEL_RATE_RADPS: f32 = 0.075;
const WHEEL_BASE_M: f32 = 0.094;

/// Fixed control interval; matches the 10 Hz tick of the control loop.
pub const DT_S: f32 = 0.1;

/// Error band treated as exactly zero to suppress chatter at the setpoint.
const DEADBAND_M: f32 = 0.02;

/// Maximum turn rate the drivetrain can honor at the given forward speed.
///
/// Differential-drive constraint: the inner wheel must keep turning, so the
/// turn rate budget shrinks as commanded forward speed drops.
pub fn angular_max(linear_mps: f32) -> f32 {
    (2.0 * linear_mps - 2.0 * WHEEL_RADIUS_M * MIN_WHEEL_RATE_RADPS) / WHEEL_BASE_M
}

/// Regulator state persisting across ticks.
///
/// This is the only cross-tick memory of the controller besides the INIT
/// latch. Zeroed whenever the avoidance maneuver runs, so wall-following
/// resumes without a residual integral term.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PiState {
    /// Deadbanded error of the last update (meters)
    pub error: f32,
    /// Accumulated error * dt (meter-seconds)
    pub integral_error: f32,
}

/// PI wall-distance regulator.
pub struct PiController {
    k_p: f32,
    k_i: f32,
    state: PiState,
}

impl PiController {
    pub fn new(k_p: f32, k_i: f32) -> Self {
        Self {
            k_p,
            k_i,
            state: PiState::default(),
        }
    }

    /// Zero the regulator state.
    pub fn reset(&mut self) {
        self.state = PiState::default();
    }

    pub fn state(&self) -> PiState {
        self.state
    }

    /// One regulator step; returns the angular velocity to command.
    ///
    /// The deadband is applied on the right-wall path only, matching the
    /// behavior the platform was tuned with. The sign of the output keeps
    /// "turn toward the wall" consistent for either side.
    pub fn update(
        &mut self,
        desired_clearance_m: f32,
        side_distance_m: f32,
        follow_right_wall: bool,
        linear_velocity_mps: f32,
    ) -> f32 {
        let mut error = desired_clearance_m - side_distance_m;
        if follow_right_wall && error.abs() < DEADBAND_M {
            error = 0.0;
        }
        self.state.error = error;

        let proportional = error * self.k_p;

        self.state.integral_error += error * DT_S;
        let integral = self.state.integral_error * self.k_i;

        // At very low forward speeds the drivetrain formula goes negative;
        // floor it so the clamp range stays valid and the turn rate is
        // simply zero.
        let limit = angular_max(linear_velocity_mps).max(0.0);
        let correction = (proportional + integral).clamp(-limit, limit);

        tracing::debug!(
            "PI update: error={:.4}, p={:.4}, i={:.4}, angular={:.4}",
            error,
            proportional,
            integral,
            correction
        );

        if follow_right_wall {
            correction
        } else {
            -correction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deadband_applies_on_right_wall_only() {
        // |error| = 0.01 < 0.02 band
        let mut right = PiController::new(2.0, 0.5);
        let out = right.update(0.30, 0.31, true, 0.2);
        assert_eq!(right.state().error, 0.0);
        assert_eq!(out, 0.0);

        // Same magnitude error on the left wall passes through untouched
        let mut left = PiController::new(2.0, 0.5);
        let out = left.update(0.30, 0.31, false, 0.2);
        assert_relative_eq!(left.state().error, -0.01, epsilon = 1e-6);
        // p = -0.02, i = -0.001 * 0.5 = -0.0005; output negated for left wall
        assert_relative_eq!(out, 0.0205, epsilon = 1e-6);
    }

    #[test]
    fn integral_accumulates_across_ticks() {
        let mut pi = PiController::new(2.0, 0.5);

        pi.update(0.25, 0.20, true, 0.2);
        assert_relative_eq!(pi.state().integral_error, 0.005, epsilon = 1e-6);

        pi.update(0.25, 0.20, true, 0.2);
        assert_relative_eq!(pi.state().integral_error, 0.010, epsilon = 1e-6);
    }

    #[test]
    fn output_saturates_at_kinematic_limit() {
        let mut pi = PiController::new(50.0, 10.0);
        let limit = angular_max(0.2);

        // Wall far away: large positive error
        let out = pi.update(0.25, 5.0, true, 0.2);
        assert_relative_eq!(out, -limit, epsilon = 1e-4);

        // And the mirrored case
        let mut pi = PiController::new(50.0, 10.0);
        let out = pi.update(5.0, 0.0, true, 0.2);
        assert_relative_eq!(out, limit, epsilon = 1e-4);
    }

    #[test]
    fn low_linear_velocity_floors_the_limit_at_zero() {
        // angular_max(0.0) is negative; the output must degrade to a zero
        // turn rate instead of panicking on an inverted clamp range.
        let mut pi = PiController::new(2.0, 0.5);
        let out = pi.update(0.25, 0.20, true, 0.0);
        assert_eq!(out, 0.0);

        // Just under the break-even speed (0.0012 m/s), same story
        let mut pi = PiController::new(2.0, 0.5);
        let out = pi.update(0.25, 0.60, false, 0.001);
        assert_eq!(out, 0.0);

        // State still accumulates; only the output is floored
        assert_relative_eq!(pi.state().integral_error, -0.035, epsilon = 1e-6);
    }

    #[test]
    fn reset_zeroes_state() {
        let mut pi = PiController::new(2.0, 0.5);
        pi.update(0.25, 0.10, true, 0.2);
        assert!(pi.state() != PiState::default());

        pi.reset();
        assert_eq!(pi.state(), PiState::default());
    }

    #[test]
    fn angular_max_matches_drivetrain_formula() {
        assert_relative_eq!(
            angular_max(0.2),
            (2.0 * 0.2 - 2.0 * 0.016 * 0.075) / 0.094,
            epsilon = 1e-6
        );
    }
}
