//! Fixed-rate control loop driving the wall follower.
//!
//! One logical thread owns all mutable state: the sensor state, the PI
//! regulator, and the INIT latch. Between ticks the loop drains pending
//! range readings, so readings are never processed concurrently with a
//! tick's computation. The 10 Hz rate is best-effort; overruns are not
//! compensated and ticks are never coalesced.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use crate::config::ControllerConfig;
use crate::control::{ControllerMode, VelocityCommand, WallFollower};
use crate::error::{NavError, Result};
use crate::sensors::{RangeReading, SensorState};

/// Control tick interval (10 Hz); the PI regulator's dt matches this.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Outbound seam for velocity commands.
pub trait CommandSink {
    fn publish(&mut self, command: VelocityCommand) -> Result<()>;
}

/// In-process sink, used by tests and tooling.
impl CommandSink for Sender<VelocityCommand> {
    fn publish(&mut self, command: VelocityCommand) -> Result<()> {
        self.send(command)
            .map_err(|_| NavError::Channel("command channel closed".to_string()))
    }
}

/// The fixed-rate driver: drains sensor updates, evaluates the state
/// machine and regulator, and publishes one command per tick.
pub struct ControlLoop<S: CommandSink> {
    follower: WallFollower,
    sensors: SensorState,
    range_rx: Receiver<RangeReading>,
    sink: S,
    shutdown: Arc<AtomicBool>,
    tick_count: u64,
    last_status: Instant,
}

impl<S: CommandSink> ControlLoop<S> {
    pub fn new(
        config: ControllerConfig,
        range_rx: Receiver<RangeReading>,
        sink: S,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            follower: WallFollower::new(config),
            sensors: SensorState::new(),
            range_rx,
            sink,
            shutdown,
            tick_count: 0,
            last_status: Instant::now(),
        }
    }

    /// Run until shutdown is signaled.
    ///
    /// The loop exits without publishing a final stop command; the last
    /// command emitted before shutdown stands.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Control loop started ({}ms tick)", TICK_INTERVAL.as_millis());

        loop {
            let tick_start = Instant::now();

            if self.shutdown.load(Ordering::Acquire) {
                tracing::info!("Control loop shutting down after {} ticks", self.tick_count);
                break;
            }

            self.step_once()?;

            let elapsed = tick_start.elapsed();
            if elapsed < TICK_INTERVAL {
                std::thread::sleep(TICK_INTERVAL - elapsed);
            }
        }

        Ok(())
    }

    /// One scheduling step: drain pending readings, then evaluate a tick.
    pub fn step_once(&mut self) -> Result<()> {
        self.drain_readings();
        self.tick()
    }

    /// Apply all pending range readings to the sensor state.
    fn drain_readings(&mut self) {
        loop {
            match self.range_rx.try_recv() {
                Ok(reading) => self.sensors.apply(reading),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Producers are gone; keep ticking on the last values
                    break;
                }
            }
        }
    }

    /// Evaluate one control tick and publish the command.
    ///
    /// Nothing is published until the first front reading has arrived.
    fn tick(&mut self) -> Result<()> {
        self.tick_count += 1;

        let (mode, command) = self.follower.step(&self.sensors);

        tracing::debug!(
            "Tick {}: mode={:?}, front={:.3}m, cmd=({:.3}, {:.3})",
            self.tick_count,
            mode,
            self.sensors.front_distance_m,
            command.linear_mps,
            command.angular_radps
        );

        if self.sensors.front_seen {
            self.sink.publish(command)?;
        }

        if self.last_status.elapsed() >= Duration::from_secs(3) {
            self.log_status(mode, command);
            self.last_status = Instant::now();
        }

        Ok(())
    }

    /// Periodic status log.
    fn log_status(&self, mode: ControllerMode, command: VelocityCommand) {
        let mode_str = match mode {
            ControllerMode::Init => "Init",
            ControllerMode::Follow => "Follow",
            ControllerMode::Avoid => "Avoid",
        };

        tracing::info!(
            "Status: mode={}, ticks={}, front={:.3}m, error={:.4}, cmd=({:.3}, {:.3})",
            mode_str,
            self.tick_count,
            self.sensors.front_distance_m,
            self.follower.pi_state().error,
            command.linear_mps,
            command.angular_radps
        );
    }
}
