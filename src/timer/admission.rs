//! Conversion of client-supplied time fields into a countdown duration

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// A single time field as clients send it: a JSON number, or text from a form
/// or JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeField {
    Number(f64),
    Text(String),
}

impl From<&str> for TimeField {
    fn from(value: &str) -> Self {
        TimeField::Text(value.to_string())
    }
}

impl From<f64> for TimeField {
    fn from(value: f64) -> Self {
        TimeField::Number(value)
    }
}

/// Requested countdown length split into hours, minutes and seconds.
/// Absent or empty fields count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationRequest {
    #[serde(default)]
    pub hours: Option<TimeField>,
    #[serde(default)]
    pub minutes: Option<TimeField>,
    #[serde(default)]
    pub seconds: Option<TimeField>,
}

impl DurationRequest {
    pub fn new(
        hours: impl Into<TimeField>,
        minutes: impl Into<TimeField>,
        seconds: impl Into<TimeField>,
    ) -> Self {
        Self {
            hours: Some(hours.into()),
            minutes: Some(minutes.into()),
            seconds: Some(seconds.into()),
        }
    }

    /// Total requested seconds. Every field must be numeric and the total
    /// must be positive.
    pub fn total_seconds(&self) -> Result<f64, TimerError> {
        let hours = component("hours", self.hours.as_ref())?;
        let minutes = component("minutes", self.minutes.as_ref())?;
        let seconds = component("seconds", self.seconds.as_ref())?;

        let total = hours * 3600.0 + minutes * 60.0 + seconds;
        if !total.is_finite() {
            return Err(TimerError::InvalidDuration(format!(
                "{} seconds cannot be represented",
                total
            )));
        }
        if total <= 0.0 {
            return Err(TimerError::BelowThreshold {
                total_seconds: total,
            });
        }
        Ok(total)
    }

    pub fn to_duration(&self) -> Result<Duration, TimerError> {
        let total = self.total_seconds()?;
        Duration::try_from_secs_f64(total)
            .map_err(|e| TimerError::InvalidDuration(format!("{} seconds: {}", total, e)))
    }
}

fn component(field: &'static str, value: Option<&TimeField>) -> Result<f64, TimerError> {
    let parsed = match value {
        None => return Ok(0.0),
        Some(TimeField::Number(n)) => *n,
        Some(TimeField::Text(text)) if text.is_empty() => return Ok(0.0),
        Some(TimeField::Text(text)) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| TimerError::NonNumericInput {
                    field,
                    value: text.clone(),
                })?
        }
    };

    if !parsed.is_finite() {
        return Err(TimerError::NonNumericInput {
            field,
            value: parsed.to_string(),
        });
    }
    Ok(parsed)
}
