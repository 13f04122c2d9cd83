// core/state.rs
//! Shared sensor state

// Latest sensor state shared between the middleware callbacks and the
// docking loop. Writers replace whole fields, the loop copies both fields
// under one lock so every tick works on a consistent snapshot.

use log::trace;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::beacon::BeaconReading;

/// Beacon and dock status as seen at one instant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Most recent IR sample
    pub beacon: BeaconReading,
    /// Charging contacts engaged
    pub docked: bool,
}

/// Cloneable handle to the shared sensor state
#[derive(Clone, Debug, Default)]
pub struct SensorState {
    inner: Arc<Mutex<SensorSnapshot>>,
}

impl SensorState {
    /// Starts with no beacon signal and the robot off the dock
    pub fn new() -> Self {
        SensorState::default()
    }

    /// Replaces the stored beacon reading
    pub fn set_beacon(&self, reading: BeaconReading) {
        trace!("Beacon update: {:?}", reading);
        self.lock().beacon = reading;
    }

    /// Replaces the stored dock status
    pub fn set_docked(&self, docked: bool) {
        trace!("Dock status update: {}", docked);
        self.lock().docked = docked;
    }

    /// Copy of both fields taken under one lock
    pub fn snapshot(&self) -> SensorSnapshot {
        *self.lock()
    }

    // A writer that panicked mid-update can only have left a whole value
    // behind, so the poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, SensorSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
