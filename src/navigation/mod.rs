//! Docking navigation for Eos
//!
//! This module turns IR beacon readings into velocity commands and runs the
//! docking control loop until the robot is charging, loses the beacon or the
//! request is canceled.

pub mod controller;
pub mod heuristics;
pub mod rate;

pub use controller::{
    AbortReason, DockingController, DockingFeedback, DockingGoal, DockingStatus, Outcome,
    TickResult, NO_SIGNAL_LIMIT, TICK_HZ, TICK_PERIOD,
};
pub use heuristics::{select_command, DockingRule, DOCKING_RULES};
pub use rate::{FixedRate, TickRate};

/// Velocity command for the base
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    /// Linear velocity (m/s)
    pub linear: f32,
    /// Angular velocity (rad/s), positive turns left
    pub angular: f32,
}

impl VelocityCommand {
    /// Zero velocity
    pub const STOP: VelocityCommand = VelocityCommand { linear: 0.0, angular: 0.0 };

    /// Creates a command from its two components
    pub const fn new(linear: f32, angular: f32) -> Self {
        VelocityCommand { linear, angular }
    }
}

/// Where velocity commands go. Fire-and-forget: each command supersedes the
/// previous one and nothing is acknowledged.
pub trait VelocitySink {
    /// Sends one command to the base
    fn send(&self, command: VelocityCommand);
}

impl<T: VelocitySink + ?Sized> VelocitySink for std::sync::Arc<T> {
    fn send(&self, command: VelocityCommand) {
        (**self).send(command)
    }
}
