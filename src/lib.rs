//! Eos Dock - docking action for Roomba-class vacuum robots
//!
//! Drives the robot back onto its charging station by steering on the dock's
//! infrared buoys. The control loop lives in [`navigation`]; the optional
//! `ros2` feature wires it to ROS 2 topics and an action server.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod core;
pub mod navigation;
#[cfg(feature = "ros2")]
pub mod ros_interface;

// Re-export commonly used items for easier access
pub use crate::core::{BeaconCode, BeaconReading, SensorSnapshot, SensorState};
pub use crate::navigation::{
    AbortReason, DockingController, DockingFeedback, DockingGoal, DockingStatus, FixedRate,
    Outcome, TickRate, TickResult, VelocityCommand, VelocitySink,
};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Main configuration structure for the docking node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// ROS 2 configuration
    pub ros: RosConfig,
    /// Docking behavior
    pub docking: DockingConfig,
}

/// ROS 2 specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosConfig {
    /// Node name
    pub node_name: String,
    /// Node namespace
    pub namespace: String,
    /// Name of the docking action server
    pub action_name: String,
    /// IR character topic, `[omni, left, right]`
    pub ir_topic: String,
    /// Dock contact topic
    pub dock_topic: String,
    /// Velocity command topic
    pub cmd_vel_topic: String,
    /// QoS history depth for every topic
    pub qos_depth: usize,
}

impl Default for RosConfig {
    fn default() -> Self {
        RosConfig {
            node_name: "eos_dock".to_string(),
            namespace: String::new(),
            action_name: "dock".to_string(),
            ir_topic: "/ir_character".to_string(),
            dock_topic: "/dock".to_string(),
            cmd_vel_topic: "/cmd_vel".to_string(),
            qos_depth: 1,
        }
    }
}

/// Docking behavior switches. Speeds and thresholds are fixed and not part
/// of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingConfig {
    /// Send a zero velocity when a request is canceled. Off by default: a
    /// canceled request leaves the base at its last commanded velocity.
    pub stop_on_cancel: bool,
}

impl DockConfig {
    /// Loads a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DockError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| DockError::IoError(format!("{}: {}", path.display(), e)))?;
        let config: DockConfig = serde_yaml::from_reader(file)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses a YAML configuration string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DockError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Eos Dock error types
#[derive(Debug)]
pub enum DockError {
    /// ROS interface error
    RosError(String),
    /// Configuration error
    ConfigError(String),
    /// File access error
    IoError(String),
}

impl std::fmt::Display for DockError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DockError::RosError(msg) => write!(f, "ROS error: {}", msg),
            DockError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DockError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DockError {}

impl From<std::io::Error> for DockError {
    fn from(e: std::io::Error) -> Self {
        DockError::IoError(e.to_string())
    }
}

impl From<serde_yaml::Error> for DockError {
    fn from(e: serde_yaml::Error) -> Self {
        DockError::ConfigError(e.to_string())
    }
}

#[cfg(feature = "ros2")]
impl From<r2r::Error> for DockError {
    fn from(e: r2r::Error) -> Self {
        DockError::RosError(e.to_string())
    }
}
