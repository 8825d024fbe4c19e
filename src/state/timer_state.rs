//! Timer status snapshots reported to clients

use serde::{Deserialize, Serialize};

/// Position of the controller in its Idle / Running / Finished cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Idle,
    Running,
    /// Countdown elapsed; collapses to idle on the next status read
    Finished,
}

/// Point-in-time view of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerStatus {
    pub running: bool,
    pub seconds_remaining: f64,
}

impl TimerStatus {
    /// Create an idle status
    pub fn idle() -> Self {
        Self {
            running: false,
            seconds_remaining: 0.0,
        }
    }

    /// Create a running status. A countdown that is past its deadline but not
    /// yet torn down reports zero remaining.
    pub fn running(seconds_remaining: f64) -> Self {
        Self {
            running: true,
            seconds_remaining: seconds_remaining.max(0.0),
        }
    }

    /// Check if the timer is running
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for TimerStatus {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdue_countdown_reports_zero_remaining() {
        let status = TimerStatus::running(-0.25);
        assert!(status.is_running());
        assert_eq!(status.seconds_remaining, 0.0);
    }

    #[test]
    fn idle_reports_zero_remaining() {
        assert_eq!(TimerStatus::default(), TimerStatus::idle());
        assert_eq!(TimerStatus::idle().seconds_remaining, 0.0);
    }
}
