//! Instrumented output backend that records every write

use std::sync::Mutex;
use tokio::time::Instant;

use super::{Direction, Level, Line, PulseOutput};
use crate::error::TimerError;

/// A single write observed by [`RecordingOutput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedWrite {
    pub line: Line,
    pub level: Level,
    pub at: Instant,
}

/// Output backend that keeps an ordered log of writes.
///
/// Used to correlate what the generator drove against what the controller
/// reported at the same moment.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    configured: Mutex<Vec<(Line, Direction)>>,
    writes: Mutex<Vec<RecordedWrite>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all writes so far, oldest first
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or(0)
    }

    pub fn last_level(&self, line: Line) -> Option<Level> {
        self.writes.lock().ok().and_then(|writes| {
            writes
                .iter()
                .rev()
                .find(|write| write.line == line)
                .map(|write| write.level)
        })
    }

    pub fn configured(&self) -> Vec<(Line, Direction)> {
        self.configured.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl PulseOutput for RecordingOutput {
    fn configure(&self, line: Line, direction: Direction) -> Result<(), TimerError> {
        if let Ok(mut configured) = self.configured.lock() {
            configured.push((line, direction));
        }
        Ok(())
    }

    fn write(&self, line: Line, level: Level) {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(RecordedWrite {
                line,
                level,
                at: Instant::now(),
            });
        }
    }
}
