// src/ros_interface/publisher.rs
// Velocity output: publishes docking commands as geometry_msgs/Twist on /cmd_vel.

use crate::navigation::{VelocityCommand, VelocitySink};
use crate::DockError;
use log::warn;
use r2r::geometry_msgs::msg::{Twist, Vector3};
use r2r::QosProfile;
use std::sync::Mutex;

/// Publisher for base velocity commands.
/// Shared between the executor thread and the docking thread.
pub struct CmdVelPublisher {
    inner: Mutex<r2r::Publisher<Twist>>,
}

impl CmdVelPublisher {
    /// Creates a new publisher on the given topic with specified QoS
    pub fn new(node: &mut r2r::Node, topic: &str, qos: QosProfile) -> Result<Self, DockError> {
        let publisher = node.create_publisher::<Twist>(topic, qos)?;
        Ok(CmdVelPublisher {
            inner: Mutex::new(publisher),
        })
    }
}

impl VelocitySink for CmdVelPublisher {
    fn send(&self, command: VelocityCommand) {
        let publisher = match self.inner.lock() {
            Ok(publisher) => publisher,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Fire-and-forget: a dropped command is superseded by the next tick.
        if let Err(e) = publisher.publish(&to_twist(command)) {
            warn!("Failed to publish velocity {:?}: {}", command, e);
        }
    }
}

/// Convert to ROS Twist message
pub fn to_twist(command: VelocityCommand) -> Twist {
    Twist {
        linear: Vector3 {
            x: command.linear as f64,
            y: 0.0,
            z: 0.0,
        },
        angular: Vector3 {
            x: 0.0,
            y: 0.0,
            z: command.angular as f64,
        },
    }
}
