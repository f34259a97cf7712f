//! reactive-nav - Reactive wall-following controller
//!
//! Converts streaming range readings from three short-range sensors
//! (front, left, right) into periodic velocity commands for a
//! differential-drive robot, switching between initialization,
//! wall-following, and obstacle-avoidance behaviors.
//!
//! The control core is transport-agnostic: readings arrive on an
//! in-process channel and commands leave through a [`CommandSink`].
//! The binary wires both ends to UDP JSON datagrams.

pub mod config;
pub mod control;
pub mod control_loop;
pub mod error;
pub mod link;
pub mod sensors;

// Re-export commonly used types
pub use config::{ControllerConfig, NavConfig};
pub use control::{
    ControllerMode, PiController, PiState, VelocityCommand, WallFollower, angular_max,
};
pub use control_loop::{CommandSink, ControlLoop, TICK_INTERVAL};
pub use error::{NavError, Result};
pub use sensors::{RangeBus, RangeReading, RangeSender, SensorId, SensorState, range_channel};
