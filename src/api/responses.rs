//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::TimerError, state::TimerStatus};

/// Response for start and stop requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: "Ok".to_string(),
        }
    }

    pub fn failed(error: &TimerError) -> Self {
        Self {
            ok: false,
            message: error.to_string(),
        }
    }
}

/// Response for status requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub ok: bool,
    pub is_running: bool,
    pub seconds_remaining: f64,
}

impl From<TimerStatus> for StatusResponse {
    fn from(status: TimerStatus) -> Self {
        Self {
            ok: true,
            is_running: status.running,
            seconds_remaining: status.seconds_remaining,
        }
    }
}

/// Envelope spoken by the `/ajax/` routes of the original web page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyResponse {
    #[serde(rename = "Error")]
    pub error: bool,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(rename = "Left", skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

impl LegacyResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            status: None,
            left: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            status: None,
            left: None,
        }
    }

    pub fn status(status: TimerStatus) -> Self {
        Self {
            error: false,
            message: String::new(),
            status: Some(status.running),
            left: Some(status.seconds_remaining),
        }
    }
}

impl From<Result<(), TimerError>> for LegacyResponse {
    fn from(result: Result<(), TimerError>) -> Self {
        match result {
            Ok(()) => Self::ok("Ok"),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
    pub line: u32,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_response_uses_client_field_names() {
        let body = serde_json::to_value(StatusResponse::from(TimerStatus::running(12.5))).unwrap();
        assert_eq!(
            body,
            json!({"ok": true, "isRunning": true, "secondsRemaining": 12.5})
        );
    }

    #[test]
    fn legacy_envelope_omits_status_fields_for_actions() {
        let body = serde_json::to_value(LegacyResponse::from(Err(TimerError::AlreadyRunning))).unwrap();
        assert_eq!(body, json!({"Error": true, "Message": "Timer Already Running..."}));

        let body = serde_json::to_value(LegacyResponse::status(TimerStatus::idle())).unwrap();
        assert_eq!(
            body,
            json!({"Error": false, "Message": "", "Status": false, "Left": 0.0})
        );
    }
}
