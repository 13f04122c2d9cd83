// src/navigation/heuristics.rs
//! Fixed steering rules for the final approach to the dock.
//
// Rules are checked in order and the first match wins. A reading that no
// rule matches produces no command, so the base keeps the last velocity.

use super::VelocityCommand;
use crate::core::{BeaconCode, BeaconReading};
use log::debug;

/// Forward speed used by every rule (m/s)
pub const APPROACH_SPEED: f32 = 0.05;
/// Turn rate used when only one buoy is visible (rad/s)
pub const CORRECTION_TURN: f32 = 0.1;

/// One steering rule
#[derive(Debug, Clone, Copy)]
pub struct DockingRule {
    /// Used in logs
    pub name: &'static str,
    /// Whether the rule applies to a reading
    pub matches: fn(&BeaconReading) -> bool,
    /// Command sent when it does
    pub command: VelocityCommand,
}

/// The rule table, highest priority first
pub static DOCKING_RULES: [DockingRule; 3] = [
    DockingRule {
        name: "centered",
        matches: centered,
        command: VelocityCommand::new(APPROACH_SPEED, 0.0),
    },
    DockingRule {
        name: "red_left",
        matches: red_on_left,
        command: VelocityCommand::new(APPROACH_SPEED, CORRECTION_TURN),
    },
    DockingRule {
        name: "green_right",
        matches: green_on_right,
        command: VelocityCommand::new(APPROACH_SPEED, -CORRECTION_TURN),
    },
];

/// Picks the command for a reading, if any rule applies
pub fn select_command(reading: &BeaconReading) -> Option<&'static DockingRule> {
    let rule = DOCKING_RULES.iter().find(|rule| (rule.matches)(reading));
    match rule {
        Some(rule) => debug!("Rule {} matched {:?}", rule.name, reading),
        None => debug!("No rule for {:?}, coasting", reading),
    }
    rule
}

// Both sides must agree on the force-field flag.
fn centered(reading: &BeaconReading) -> bool {
    matches!(
        (reading.left, reading.right),
        (BeaconCode::RedBuoyGreenBuoy, BeaconCode::RedBuoyGreenBuoy)
            | (BeaconCode::RedBuoyGreenBuoyForceField, BeaconCode::RedBuoyGreenBuoyForceField)
    )
}

fn red_on_left(reading: &BeaconReading) -> bool {
    matches!(reading.left, BeaconCode::RedBuoy | BeaconCode::RedBuoyForceField)
}

fn green_on_right(reading: &BeaconReading) -> bool {
    matches!(reading.right, BeaconCode::GreenBuoy | BeaconCode::GreenBuoyForceField)
}
