//! Phase durations.

use std::time::Duration;

use crate::error::SimulateError;

use super::state::Phase;

/// How long the forward phase lasts before the mid-cycle re-check.
pub const FORWARD_DURATION: Duration = Duration::from_millis(2500);

/// How long the lateral phase lasts before the next iteration.
pub const LATERAL_DURATION: Duration = Duration::from_millis(500);

/// Suspension length for each phase of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    forward: Duration,
    lateral: Duration,
}

impl CycleTiming {
    /// Builds a timing with custom phase durations.
    ///
    /// # Errors
    ///
    /// Returns [`SimulateError::InvalidTiming`] if either duration is zero;
    /// a zero suspension would never yield to other inputs.
    pub fn new(forward: Duration, lateral: Duration) -> Result<Self, SimulateError> {
        if forward.is_zero() {
            return Err(SimulateError::InvalidTiming {
                phase: "forward",
                duration: forward,
            });
        }
        if lateral.is_zero() {
            return Err(SimulateError::InvalidTiming {
                phase: "lateral",
                duration: lateral,
            });
        }
        Ok(Self { forward, lateral })
    }

    /// Forward phase duration.
    #[must_use]
    pub const fn forward(&self) -> Duration {
        self.forward
    }

    /// Lateral phase duration.
    #[must_use]
    pub const fn lateral(&self) -> Duration {
        self.lateral
    }

    /// Suspension that follows the report of `phase`.
    #[must_use]
    pub const fn phase_duration(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Forward => self.forward,
            Phase::Lateral => self.lateral,
        }
    }

    /// Length of one uninterrupted forward + lateral iteration.
    #[must_use]
    pub fn cycle_length(&self) -> Duration {
        self.forward + self.lateral
    }
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self {
            forward: FORWARD_DURATION,
            lateral: LATERAL_DURATION,
        }
    }
}
