//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod extract;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_handler))
        .route("/timer/stop", post(stop_handler))
        .route("/timer/status", get(status_handler))
        // Routes spoken by the original web page
        .route("/ajax/", get(ajax_get_handler).post(ajax_handler))
        .route("/ajax/:user_request", get(ajax_get_handler).post(ajax_handler))
        .route("/ajax/:user_request/:value", get(ajax_get_handler).post(ajax_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
