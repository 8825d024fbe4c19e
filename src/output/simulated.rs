//! In-process output backend for development machines without GPIO

use std::{collections::HashMap, sync::Mutex};
use tracing::{debug, info};

use super::{Direction, Level, Line, PulseOutput};
use crate::error::TimerError;

/// Output backend that only logs what it would have driven
#[derive(Debug, Default)]
pub struct SimulatedOutput {
    levels: Mutex<HashMap<Line, Level>>,
}

impl SimulatedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last level written to `line`, if any
    pub fn level(&self, line: Line) -> Option<Level> {
        self.levels.lock().ok().and_then(|levels| levels.get(&line).copied())
    }
}

impl PulseOutput for SimulatedOutput {
    fn configure(&self, line: Line, direction: Direction) -> Result<(), TimerError> {
        info!("Simulated output: line {} configured as {:?}", line, direction);
        if let Ok(mut levels) = self.levels.lock() {
            levels.insert(line, Level::Low);
        }
        Ok(())
    }

    fn write(&self, line: Line, level: Level) {
        debug!("Output state of line {} is {}", line, level);
        if let Ok(mut levels) = self.levels.lock() {
            levels.insert(line, level);
        }
    }
}
