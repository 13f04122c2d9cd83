// core/mod.rs
//! IR beacon types and the shared sensor store

// Sensor-side types for the docking action: IR beacon classifications and the
// shared store the middleware callbacks write into.

pub mod beacon;
pub mod state;

pub use beacon::{BeaconCode, BeaconReading};
pub use state::{SensorSnapshot, SensorState};
