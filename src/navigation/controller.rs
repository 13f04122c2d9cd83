// src/navigation/controller.rs
//! Docking control loop: polls the latest beacon and dock state at a fixed
//! rate, steers with the heuristic rules and reports one terminal outcome per
//! docking request.

use super::heuristics::select_command;
use super::rate::TickRate;
use super::{VelocityCommand, VelocitySink};
use crate::core::{BeaconReading, SensorSnapshot, SensorState};
use crate::DockingConfig;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// Control loop frequency (Hz)
pub const TICK_HZ: f64 = 10.0;
/// Control loop period at `TICK_HZ`
pub const TICK_PERIOD: Duration = Duration::from_millis(100);
/// Consecutive silent ticks before the request is aborted (one second at 10 Hz)
pub const NO_SIGNAL_LIMIT: u32 = 10;

/// Why a docking request was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// No beacon seen on any receiver for `NO_SIGNAL_LIMIT` ticks
    SignalLost,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AbortReason::SignalLost => write!(f, "beacon signal lost"),
        }
    }
}

/// How a docking request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Charging contacts engaged
    Succeeded,
    /// Gave up, the caller has to send a new request
    Aborted(AbortReason),
    /// The request was canceled from outside; nothing is reported back
    Canceled,
}

/// Result of a single control tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// Keep going after the next sleep
    Continue,
    /// The request is finished
    Done(Outcome),
}

/// Progress published once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DockingFeedback {
    /// Any receiver currently sees the dock
    pub sees_dock: bool,
    /// Current run of silent ticks
    pub no_signal_ticks: u32,
}

/// The active docking request, as seen from the controller
pub trait DockingGoal {
    /// False once the request has been canceled or preempted
    fn is_active(&self) -> bool;
    /// Publishes progress
    fn publish_feedback(&self, feedback: DockingFeedback);
    /// Reports success
    fn set_succeeded(&self);
    /// Reports failure
    fn set_aborted(&self, reason: AbortReason);
}

/// Controller status snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockingStatus {
    /// A request is being executed
    pub running: bool,
    /// Current run of silent ticks
    pub no_signal_ticks: u32,
    /// Latest sensor values
    pub sensors: SensorSnapshot,
}

/// Drives the robot onto the dock
pub struct DockingController<V> {
    sensors: SensorState,
    velocity: V,
    config: DockingConfig,
    no_signal: AtomicU32,
    running: AtomicBool,
}

impl<V: VelocitySink> DockingController<V> {
    /// Creates a controller that sends its commands to `velocity`
    pub fn new(velocity: V, config: &DockingConfig) -> Self {
        DockingController {
            sensors: SensorState::new(),
            velocity,
            config: config.clone(),
            no_signal: AtomicU32::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Stores a new beacon reading; read by the next tick
    pub fn on_beacon_update(&self, reading: BeaconReading) {
        self.sensors.set_beacon(reading);
    }

    /// Stores a new dock status; read by the next tick
    pub fn on_dock_status_update(&self, docked: bool) {
        self.sensors.set_docked(docked);
    }

    /// Runs a docking request to completion, blocking the caller.
    ///
    /// Ticks once per `rate` period until the robot docks, the beacon is lost
    /// or `goal` stops being active. Succeeded and aborted outcomes are also
    /// reported to `goal`; a canceled request is only returned.
    pub fn begin_docking<G, R>(&self, goal: &G, rate: &mut R) -> Outcome
    where
        G: DockingGoal + ?Sized,
        R: TickRate + ?Sized,
    {
        self.start_request();
        let _running = RunningGuard(&self.running);

        loop {
            if let TickResult::Done(outcome) = self.tick(goal) {
                return outcome;
            }
            rate.sleep();
        }
    }

    /// Prepares the controller for a new request: clears the silent-tick
    /// count and marks it running. `begin_docking` calls this itself; a
    /// scheduler driving `tick` directly calls it once per request.
    pub fn start_request(&self) {
        info!("Initiating docking procedure...");
        self.no_signal.store(0, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    /// One control cycle. Exposed so an external scheduler can drive the
    /// controller instead of `begin_docking`; the running flag is cleared
    /// when the request finishes.
    pub fn tick<G: DockingGoal + ?Sized>(&self, goal: &G) -> TickResult {
        let result = self.step(goal);
        if let TickResult::Done(_) = result {
            self.running.store(false, Ordering::SeqCst);
        }
        result
    }

    fn step<G: DockingGoal + ?Sized>(&self, goal: &G) -> TickResult {
        if !goal.is_active() {
            if self.config.stop_on_cancel {
                self.velocity.send(VelocityCommand::STOP);
            } else {
                debug!("Canceled without stopping, base keeps its last velocity");
            }
            info!("Docking request canceled");
            return TickResult::Done(Outcome::Canceled);
        }

        let snapshot = self.sensors.snapshot();
        let no_signal = if snapshot.beacon.is_silent() {
            self.no_signal.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.no_signal.store(0, Ordering::SeqCst);
            0
        };

        if no_signal >= NO_SIGNAL_LIMIT {
            self.velocity.send(VelocityCommand::STOP);
            goal.set_aborted(AbortReason::SignalLost);
            warn!("No beacon for {} ticks, aborting docking", no_signal);
            return TickResult::Done(Outcome::Aborted(AbortReason::SignalLost));
        }

        if snapshot.docked {
            self.velocity.send(VelocityCommand::STOP);
            goal.set_succeeded();
            info!("Docked, charging!");
            return TickResult::Done(Outcome::Succeeded);
        }

        if let Some(rule) = select_command(&snapshot.beacon) {
            self.velocity.send(rule.command);
        }

        goal.publish_feedback(DockingFeedback {
            sees_dock: !snapshot.beacon.is_silent(),
            no_signal_ticks: no_signal,
        });
        TickResult::Continue
    }

    /// Whether a request is currently being executed
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current run of silent ticks
    pub fn no_signal_ticks(&self) -> u32 {
        self.no_signal.load(Ordering::SeqCst)
    }

    /// Current controller status
    pub fn status(&self) -> DockingStatus {
        DockingStatus {
            running: self.is_running(),
            no_signal_ticks: self.no_signal_ticks(),
            sensors: self.sensors.snapshot(),
        }
    }
}

// Clears the running flag however `begin_docking` exits.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
