//! Range sensor state and inbound channel wiring.
//!
//! Three short-range sensors (front, left, right) deliver distance readings
//! asynchronously. `SensorState` keeps only the most recent value per
//! sensor; individual readings are not retained.

use crate::error::{NavError, Result};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, Sender, channel};

/// Front distance below which a collision-risk warning is logged.
/// Log-only side channel; it never alters the commanded velocity.
const COLLISION_WARN_M: f32 = 0.15;

/// Identity of one of the three range sensors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorId {
    Front,
    Left,
    Right,
}

/// A single distance measurement from one sensor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RangeReading {
    pub sensor: SensorId,
    pub distance_m: f32,
}

/// Most recent distance per sensor.
///
/// Distances default to 0.0 until the first reading arrives, so a
/// never-updated side sensor reads as "touching the wall". The control
/// loop does not validate range bounds; a bad reading is simply
/// overwritten by the next one.
#[derive(Clone, Copy, Debug, Default)]
pub struct SensorState {
    pub front_distance_m: f32,
    pub left_distance_m: f32,
    pub right_distance_m: f32,
    /// Set on the first front reading; never cleared afterwards.
    pub front_seen: bool,
}

impl SensorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one reading, overwriting the matching distance field.
    pub fn apply(&mut self, reading: RangeReading) {
        match reading.sensor {
            SensorId::Front => {
                if reading.distance_m < COLLISION_WARN_M {
                    tracing::warn!(
                        "Collision risk: obstacle {:.3}m ahead of the robot",
                        reading.distance_m
                    );
                }
                self.front_distance_m = reading.distance_m;
                self.front_seen = true;
            }
            SensorId::Left => self.left_distance_m = reading.distance_m,
            SensorId::Right => self.right_distance_m = reading.distance_m,
        }
    }

    /// Distance to the followed wall.
    pub fn side_distance(&self, follow_right_wall: bool) -> f32 {
        if follow_right_wall {
            self.right_distance_m
        } else {
            self.left_distance_m
        }
    }
}

/// Sending half of the inbound range channel, permanently bound to one
/// sensor identity at wiring time.
#[derive(Clone)]
pub struct RangeSender {
    sensor: SensorId,
    tx: Sender<RangeReading>,
}

impl RangeSender {
    /// Deliver one distance reading.
    pub fn send(&self, distance_m: f32) -> Result<()> {
        self.tx
            .send(RangeReading {
                sensor: self.sensor,
                distance_m,
            })
            .map_err(|_| NavError::Channel("range channel closed".to_string()))
    }
}

/// Hands out per-sensor senders for the inbound range channel.
#[derive(Clone)]
pub struct RangeBus {
    tx: Sender<RangeReading>,
}

impl RangeBus {
    /// Create a sender bound to one sensor.
    pub fn sender(&self, sensor: SensorId) -> RangeSender {
        RangeSender {
            sensor,
            tx: self.tx.clone(),
        }
    }
}

/// Create the inbound range channel: a bus for producers and the receiver
/// the control loop drains between ticks.
pub fn range_channel() -> (RangeBus, Receiver<RangeReading>) {
    let (tx, rx) = channel();
    (RangeBus { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_overwrite_distance_fields() {
        let mut state = SensorState::new();

        state.apply(RangeReading {
            sensor: SensorId::Left,
            distance_m: 0.4,
        });
        assert_eq!(state.left_distance_m, 0.4);

        state.apply(RangeReading {
            sensor: SensorId::Left,
            distance_m: 0.6,
        });
        assert_eq!(state.left_distance_m, 0.6);
        assert_eq!(state.right_distance_m, 0.0);
    }

    #[test]
    fn front_seen_latches_on_first_front_reading() {
        let mut state = SensorState::new();
        assert!(!state.front_seen);

        state.apply(RangeReading {
            sensor: SensorId::Right,
            distance_m: 0.3,
        });
        assert!(!state.front_seen);

        state.apply(RangeReading {
            sensor: SensorId::Front,
            distance_m: 0.5,
        });
        assert!(state.front_seen);

        // Stays set no matter what arrives later
        state.apply(RangeReading {
            sensor: SensorId::Front,
            distance_m: 0.05,
        });
        assert!(state.front_seen);
    }

    #[test]
    fn missing_side_sensor_reads_as_zero() {
        // Accepted weak point: an absent side reading is indistinguishable
        // from a wall at zero distance.
        let state = SensorState::new();
        assert_eq!(state.side_distance(true), 0.0);
        assert_eq!(state.side_distance(false), 0.0);
    }

    #[test]
    fn senders_are_bound_to_their_sensor() {
        let (bus, rx) = range_channel();
        let front = bus.sender(SensorId::Front);
        let right = bus.sender(SensorId::Right);

        right.send(0.31).unwrap();
        front.send(0.8).unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.sensor, SensorId::Right);
        assert_eq!(first.distance_m, 0.31);

        let second = rx.try_recv().unwrap();
        assert_eq!(second.sensor, SensorId::Front);
    }
}
