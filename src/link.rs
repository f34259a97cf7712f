//! UDP link for the binary: JSON range datagrams in, JSON velocity
//! command datagrams out.
//!
//! One datagram carries one message. Inbound:
//! `{"sensor":"front","distance_m":0.42}`. Outbound:
//! `{"linear_mps":0.2,"angular_radps":0.1}`. A malformed datagram is
//! logged and discarded; the socket stays open.

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::control::VelocityCommand;
use crate::control_loop::CommandSink;
use crate::error::Result;
use crate::sensors::{RangeBus, RangeReading, RangeSender, SensorId};

const DATAGRAM_BUFFER_SIZE: usize = 512;

/// Parse one inbound datagram; `None` for malformed payloads.
pub fn parse_range_datagram(payload: &[u8]) -> Option<RangeReading> {
    match serde_json::from_slice::<RangeReading>(payload) {
        Ok(reading) => Some(reading),
        Err(e) => {
            tracing::warn!("Discarding malformed range datagram: {}", e);
            None
        }
    }
}

/// Listens for range datagrams and forwards them through per-sensor
/// senders wired at construction time.
pub struct RangeListener {
    socket: UdpSocket,
    front: RangeSender,
    left: RangeSender,
    right: RangeSender,
}

impl RangeListener {
    /// Bind the listening socket and wire the three sensor channels.
    pub fn bind(addr: &str, bus: &RangeBus) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        // Short timeout so the shutdown flag is observed promptly
        socket.set_read_timeout(Some(Duration::from_millis(100)))?;

        tracing::info!("Range listener bound to {}", addr);

        Ok(Self {
            socket,
            front: bus.sender(SensorId::Front),
            left: bus.sender(SensorId::Left),
            right: bus.sender(SensorId::Right),
        })
    }

    /// Receive and forward datagrams until shutdown.
    pub fn run(&mut self, shutdown: Arc<AtomicBool>) -> Result<()> {
        let mut buffer = [0u8; DATAGRAM_BUFFER_SIZE];

        loop {
            if shutdown.load(Ordering::Acquire) {
                tracing::info!("Range listener shutting down");
                return Ok(());
            }

            let len = match self.socket.recv(&mut buffer) {
                Ok(len) => len,
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let reading = match parse_range_datagram(&buffer[..len]) {
                Some(reading) => reading,
                None => continue,
            };

            let sender = match reading.sensor {
                SensorId::Front => &self.front,
                SensorId::Left => &self.left,
                SensorId::Right => &self.right,
            };

            if sender.send(reading.distance_m).is_err() {
                // Control loop is gone; nothing left to feed
                tracing::info!("Range channel closed, listener exiting");
                return Ok(());
            }
        }
    }
}

/// Publishes velocity commands as JSON datagrams to a fixed target.
pub struct UdpCommandPublisher {
    socket: UdpSocket,
}

impl UdpCommandPublisher {
    /// Bind an ephemeral local port and connect to the command target.
    pub fn connect(target: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(target)?;

        tracing::info!("Publishing velocity commands to {}", target);

        Ok(Self { socket })
    }
}

impl CommandSink for UdpCommandPublisher {
    fn publish(&mut self, command: VelocityCommand) -> Result<()> {
        let payload = serde_json::to_vec(&command).map_err(|e| {
            crate::error::NavError::Channel(format!("Command serialization failed: {}", e))
        })?;
        self.socket.send(&payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_datagram() {
        let reading = parse_range_datagram(br#"{"sensor":"front","distance_m":0.42}"#).unwrap();
        assert_eq!(reading.sensor, SensorId::Front);
        assert_eq!(reading.distance_m, 0.42);

        let reading = parse_range_datagram(br#"{"sensor":"left","distance_m":0.1}"#).unwrap();
        assert_eq!(reading.sensor, SensorId::Left);
    }

    #[test]
    fn malformed_datagrams_are_discarded() {
        assert!(parse_range_datagram(b"not json").is_none());
        assert!(parse_range_datagram(br#"{"sensor":"rear","distance_m":0.1}"#).is_none());
        assert!(parse_range_datagram(br#"{"sensor":"front"}"#).is_none());
        assert!(parse_range_datagram(b"").is_none());
    }

    #[test]
    fn command_round_trips_through_json() {
        let command = VelocityCommand::new(0.2, 0.1025);
        let payload = serde_json::to_vec(&command).unwrap();
        let decoded: VelocityCommand = serde_json::from_slice(&payload).unwrap();
        assert_eq!(decoded, command);
    }
}
