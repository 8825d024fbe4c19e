//! Error types for the timer engine and its collaborators

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerError {
    /// Internal misuse of a timer or generator, e.g. starting one twice.
    #[error("invalid state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Timer Already Running...")]
    AlreadyRunning,

    #[error("Non numeric value of time provided...")]
    NonNumericInput { field: &'static str, value: String },

    #[error("Time provided below threshold...")]
    BelowThreshold { total_seconds: f64 },

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("output error on line {line}: {source}")]
    Output {
        line: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl TimerError {
    /// Whether this error is the caller's fault and should be reported back as
    /// a failed request rather than logged as a fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TimerError::AlreadyRunning
                | TimerError::NonNumericInput { .. }
                | TimerError::BelowThreshold { .. }
                | TimerError::InvalidDuration(_)
        )
    }
}
