//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    error::TimerError,
    state::AppState,
    timer::{DurationRequest, TimeField},
};
use super::{
    extract::FormOrJson,
    responses::{ApiResponse, HealthResponse, LegacyResponse, StatusResponse},
};

/// Body of a `/ajax/` call from the original web page
#[derive(Debug, Deserialize)]
pub struct AjaxRequest {
    pub request: Option<String>,
    #[serde(default)]
    pub hours: Option<TimeField>,
    #[serde(default)]
    pub minutes: Option<TimeField>,
    #[serde(default)]
    pub seconds: Option<TimeField>,
}

impl AjaxRequest {
    fn duration(&self) -> DurationRequest {
        DurationRequest {
            hours: self.hours.clone(),
            minutes: self.minutes.clone(),
            seconds: self.seconds.clone(),
        }
    }
}

/// Start the countdown, splitting caller mistakes from internal faults.
/// Caller mistakes come back as `Ok(Err(_))` so they can be reported in the
/// response body.
async fn start_timer(
    state: &AppState,
    request: &DurationRequest,
) -> Result<Result<(), TimerError>, StatusCode> {
    match state.controller.start_request(request).await {
        Ok(()) => {
            state.record_action("start");
            info!("Start endpoint called - timer running");
            Ok(Ok(()))
        }
        Err(e) if e.is_caller_error() => {
            warn!("Rejected start request: {:?}", e);
            Ok(Err(e))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn stop_timer(state: &AppState) {
    state.controller.stop().await;
    state.record_action("stop");
    info!("Stop endpoint called - timer stopped");
}

/// Handle POST /timer/start - Start the countdown and the square wave
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    FormOrJson(request): FormOrJson<DurationRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match start_timer(&state, &request).await? {
        Ok(()) => Ok(Json(ApiResponse::ok())),
        Err(e) => Ok(Json(ApiResponse::failed(&e))),
    }
}

/// Handle POST /timer/stop - Stop the countdown and the square wave
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    stop_timer(&state).await;
    Json(ApiResponse::ok())
}

/// Handle GET /timer/status - Report whether the countdown runs and what is left
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(state.controller.status().await.into())
}

/// Handle POST /ajax/ - Dispatch on the `request` field like the original page expects
pub async fn ajax_handler(
    State(state): State<Arc<AppState>>,
    FormOrJson(request): FormOrJson<AjaxRequest>,
) -> Result<Json<LegacyResponse>, StatusCode> {
    let response = match request.request.as_deref() {
        Some("ajax_get_status") => LegacyResponse::status(state.controller.status().await),
        Some("ajax_stop_event") => {
            stop_timer(&state).await;
            LegacyResponse::ok("Ok")
        }
        Some("ajax_start_event") => start_timer(&state, &request.duration()).await?.into(),
        other => {
            warn!("Unknown ajax request: {:?}", other);
            LegacyResponse::error("")
        }
    };
    Ok(Json(response))
}

/// Handle GET /ajax/ - The original page only posts, so every GET is an error
pub async fn ajax_get_handler() -> Json<LegacyResponse> {
    Json(LegacyResponse::error(""))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.get_uptime(),
        line: state.controller.line(),
        last_action,
        last_action_time,
    })
}
