//! Configuration loading for reactive-nav

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub link: LinkConfig,
}

/// Wall-following controller parameters.
///
/// Loaded once at startup and immutable afterwards; gains are not
/// reconfigurable at runtime.
#[derive(Clone, Debug, Deserialize)]
pub struct ControllerConfig {
    /// Commanded forward speed in INIT and FOLLOW (m/s)
    #[serde(default = "default_linear_velocity")]
    pub desired_linear_velocity_mps: f32,

    /// Target perpendicular distance to the followed wall (meters)
    #[serde(default = "default_side_clearance")]
    pub desired_side_clearance_m: f32,

    /// Front distance at which the avoidance maneuver triggers (meters)
    #[serde(default = "default_front_threshold")]
    pub front_threshold_m: f32,

    /// Follow the right wall (true) or the left wall (false)
    #[serde(default = "default_follow_right")]
    pub follow_right_wall: bool,

    /// Proportional gain of the wall-distance regulator
    #[serde(default = "default_k_p")]
    pub k_p: f32,

    /// Integral gain of the wall-distance regulator
    #[serde(default = "default_k_i")]
    pub k_i: f32,
}

/// UDP link settings for the binary
#[derive(Clone, Debug, Deserialize)]
pub struct LinkConfig {
    /// Address to bind for inbound range datagrams
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Address velocity commands are sent to
    #[serde(default = "default_command_addr")]
    pub command_addr: String,
}

// Default value functions
fn default_linear_velocity() -> f32 {
    0.2
}
fn default_side_clearance() -> f32 {
    0.25
}
fn default_front_threshold() -> f32 {
    0.15
}
fn default_follow_right() -> bool {
    true
}
fn default_k_p() -> f32 {
    2.0
}
fn default_k_i() -> f32 {
    0.5
}
fn default_listen_addr() -> String {
    "0.0.0.0:5600".to_string()
}
fn default_command_addr() -> String {
    "127.0.0.1:5601".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            desired_linear_velocity_mps: default_linear_velocity(),
            desired_side_clearance_m: default_side_clearance(),
            front_threshold_m: default_front_threshold(),
            follow_right_wall: default_follow_right(),
            k_p: default_k_p(),
            k_i: default_k_i(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            command_addr: default_command_addr(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            link: LinkConfig::default(),
        }
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::NavError::Config(format!("Failed to read config file: {}", e))
        })?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: NavConfig = toml::from_str("").unwrap();
        assert_eq!(config.controller.desired_linear_velocity_mps, 0.2);
        assert_eq!(config.controller.desired_side_clearance_m, 0.25);
        assert_eq!(config.controller.front_threshold_m, 0.15);
        assert!(config.controller.follow_right_wall);
        assert_eq!(config.controller.k_p, 2.0);
        assert_eq!(config.controller.k_i, 0.5);
    }

    #[test]
    fn partial_toml_overrides_selected_fields() {
        let config: NavConfig = toml::from_str(
            r#"
            [controller]
            follow_right_wall = false
            k_p = 3.5

            [link]
            command_addr = "10.0.0.2:5601"
            "#,
        )
        .unwrap();

        assert!(!config.controller.follow_right_wall);
        assert_eq!(config.controller.k_p, 3.5);
        // Untouched fields keep their defaults
        assert_eq!(config.controller.k_i, 0.5);
        assert_eq!(config.link.listen_addr, "0.0.0.0:5600");
        assert_eq!(config.link.command_addr, "10.0.0.2:5601");
    }
}
