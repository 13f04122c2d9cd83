// src/navigation/rate.rs
//! Loop pacing for the docking controller.

use crate::DockError;
use std::time::{Duration, Instant};

/// Waits for the next control tick
pub trait TickRate {
    /// Blocks until the next tick boundary
    fn sleep(&mut self);
}

/// Wall-clock rate, deadline based like a ROS `Rate`.
///
/// Each call sleeps until one period after the previous deadline. If the loop
/// body overran the period the schedule restarts from now instead of firing a
/// burst of late ticks.
#[derive(Debug, Clone)]
pub struct FixedRate {
    period: Duration,
    next_deadline: Instant,
}

impl FixedRate {
    /// Rate firing `hz` times per second. `hz` must be finite and positive.
    pub fn new(hz: f64) -> Result<Self, DockError> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err(DockError::ConfigError(format!("invalid loop rate: {} Hz", hz)));
        }
        let period = Duration::try_from_secs_f64(1.0 / hz)
            .map_err(|e| DockError::ConfigError(format!("invalid loop rate: {} Hz ({})", hz, e)))?;
        Ok(Self::with_period(period))
    }

    /// Rate with an explicit period
    pub fn with_period(period: Duration) -> Self {
        FixedRate {
            period,
            next_deadline: Instant::now() + period,
        }
    }

    /// Configured period
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl TickRate for FixedRate {
    fn sleep(&mut self) {
        let now = Instant::now();
        if let Some(remaining) = self.next_deadline.checked_duration_since(now) {
            std::thread::sleep(remaining);
            self.next_deadline += self.period;
        } else {
            self.next_deadline = now + self.period;
        }
    }
}
