// core/beacon.rs
//! IR beacon classifications

// Infrared beacon classifications as reported by the Roomba 500 series
// IR receivers. The dock emits a red buoy on its left, a green buoy on its
// right and a short-range force field; virtual walls use the same channel.

use serde::{Deserialize, Serialize};

/// One IR character byte
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum BeaconCode {
    /// Nothing received
    #[default]
    NoSignal,
    /// Dock force field only
    ForceField,
    /// Virtual wall beam
    VirtualWall,
    /// Green buoy (right side of the dock)
    GreenBuoy,
    /// Green buoy inside the force field
    GreenBuoyForceField,
    /// Red buoy (left side of the dock)
    RedBuoy,
    /// Red buoy inside the force field
    RedBuoyForceField,
    /// Both buoys, i.e. lined up with the dock
    RedBuoyGreenBuoy,
    /// Both buoys inside the force field
    RedBuoyGreenBuoyForceField,
    /// Any other byte, kept as received
    Other(u8),
}

#[allow(missing_docs)]
impl BeaconCode {
    pub const NO_SIGNAL: u8 = 0;
    pub const FORCE_FIELD: u8 = 161;
    pub const VIRTUAL_WALL: u8 = 162;
    pub const GREEN_BUOY: u8 = 164;
    pub const GREEN_BUOY_FORCE_FIELD: u8 = 165;
    pub const RED_BUOY: u8 = 168;
    pub const RED_BUOY_FORCE_FIELD: u8 = 169;
    pub const RED_BUOY_GREEN_BUOY: u8 = 172;
    pub const RED_BUOY_GREEN_BUOY_FORCE_FIELD: u8 = 173;

    /// Raw byte on the wire
    pub fn as_u8(self) -> u8 {
        match self {
            BeaconCode::NoSignal => Self::NO_SIGNAL,
            BeaconCode::ForceField => Self::FORCE_FIELD,
            BeaconCode::VirtualWall => Self::VIRTUAL_WALL,
            BeaconCode::GreenBuoy => Self::GREEN_BUOY,
            BeaconCode::GreenBuoyForceField => Self::GREEN_BUOY_FORCE_FIELD,
            BeaconCode::RedBuoy => Self::RED_BUOY,
            BeaconCode::RedBuoyForceField => Self::RED_BUOY_FORCE_FIELD,
            BeaconCode::RedBuoyGreenBuoy => Self::RED_BUOY_GREEN_BUOY,
            BeaconCode::RedBuoyGreenBuoyForceField => Self::RED_BUOY_GREEN_BUOY_FORCE_FIELD,
            BeaconCode::Other(raw) => raw,
        }
    }

    /// True for anything but `NoSignal`
    pub fn is_signal(self) -> bool {
        self != BeaconCode::NoSignal
    }
}

impl From<u8> for BeaconCode {
    fn from(raw: u8) -> Self {
        match raw {
            Self::NO_SIGNAL => BeaconCode::NoSignal,
            Self::FORCE_FIELD => BeaconCode::ForceField,
            Self::VIRTUAL_WALL => BeaconCode::VirtualWall,
            Self::GREEN_BUOY => BeaconCode::GreenBuoy,
            Self::GREEN_BUOY_FORCE_FIELD => BeaconCode::GreenBuoyForceField,
            Self::RED_BUOY => BeaconCode::RedBuoy,
            Self::RED_BUOY_FORCE_FIELD => BeaconCode::RedBuoyForceField,
            Self::RED_BUOY_GREEN_BUOY => BeaconCode::RedBuoyGreenBuoy,
            Self::RED_BUOY_GREEN_BUOY_FORCE_FIELD => BeaconCode::RedBuoyGreenBuoyForceField,
            other => BeaconCode::Other(other),
        }
    }
}

impl From<BeaconCode> for u8 {
    fn from(code: BeaconCode) -> Self {
        code.as_u8()
    }
}

/// Latest sample from the three IR receivers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeaconReading {
    /// Omni-directional receiver on top of the bumper
    pub omni: BeaconCode,
    /// Left directional receiver
    pub left: BeaconCode,
    /// Right directional receiver
    pub right: BeaconCode,
}

impl BeaconReading {
    /// Builds a reading from its three codes
    pub fn new(omni: BeaconCode, left: BeaconCode, right: BeaconCode) -> Self {
        BeaconReading { omni, left, right }
    }

    /// Decodes `[omni, left, right]`. Missing bytes count as no signal,
    /// trailing bytes are ignored.
    pub fn from_raw(raw: &[u8]) -> Self {
        let at = |i: usize| BeaconCode::from(raw.get(i).copied().unwrap_or(BeaconCode::NO_SIGNAL));
        BeaconReading {
            omni: at(0),
            left: at(1),
            right: at(2),
        }
    }

    /// True when none of the receivers sees anything
    pub fn is_silent(&self) -> bool {
        !self.omni.is_signal() && !self.left.is_signal() && !self.right.is_signal()
    }
}
