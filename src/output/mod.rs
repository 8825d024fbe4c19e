//! Pulse output module
//!
//! This module defines the hardware boundary the timer engine drives, along
//! with the backends that implement it.

pub mod recording;
#[cfg(feature = "hardware")]
pub mod rpi;
pub mod simulated;

use std::fmt;

use crate::error::TimerError;

pub use recording::{RecordedWrite, RecordingOutput};
pub use simulated::SimulatedOutput;
#[cfg(feature = "hardware")]
pub use rpi::RpiOutput;

/// Output line identifier as numbered by the backend
pub type Line = u32;

/// Logic level of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

impl Level {
    pub fn toggled(self) -> Self {
        match self {
            Level::High => Level::Low,
            Level::Low => Level::High,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::High => write!(f, "HIGH"),
            Level::Low => write!(f, "LOW"),
        }
    }
}

/// Direction a line is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Hardware line driver used by the signal generator.
///
/// `configure` is called once at startup and its failure is fatal. `write` is
/// fire-and-forget: backends log their own failures.
pub trait PulseOutput: Send + Sync {
    fn configure(&self, line: Line, direction: Direction) -> Result<(), TimerError>;

    fn write(&self, line: Line, level: Level);
}
