use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use pulse_timer::{
    create_router,
    output::{Level, RecordingOutput},
    AppState, TimerController,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const LINE: u32 = 18;

fn app() -> (Router, Arc<RecordingOutput>) {
    let output = Arc::new(RecordingOutput::new());
    let controller =
        TimerController::new(output.clone(), LINE, Duration::from_secs(1)).unwrap();
    let state = AppState::new(Arc::new(controller), 5000, "127.0.0.1".to_string());
    (create_router(Arc::new(state)), output)
}

async fn call(app: &Router, request: Request<Body>) -> Value {
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn start_status_stop_round() {
    let (app, output) = app();

    let body = call(&app, post_json("/timer/start", json!({"minutes": 1, "seconds": "30"}))).await;
    assert_eq!(body, json!({"ok": true, "message": "Ok"}));

    let body = call(&app, get("/timer/status")).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["isRunning"], json!(true));
    let remaining = body["secondsRemaining"].as_f64().unwrap();
    assert!(remaining > 0.0 && remaining <= 90.0);

    let body = call(&app, post_json("/timer/stop", json!({}))).await;
    assert_eq!(body, json!({"ok": true, "message": "Ok"}));
    assert_eq!(output.last_level(LINE), Some(Level::Low));

    let body = call(&app, get("/timer/status")).await;
    assert_eq!(body, json!({"ok": true, "isRunning": false, "secondsRemaining": 0.0}));
}

#[tokio::test]
async fn start_failures_are_reported_in_the_body() {
    let (app, _output) = app();

    let body = call(&app, post_form("/timer/start", "hours=&minutes=2&seconds=abc")).await;
    assert_eq!(
        body,
        json!({"ok": false, "message": "Non numeric value of time provided..."})
    );

    let body = call(&app, post_form("/timer/start", "hours=0&minutes=0&seconds=0")).await;
    assert_eq!(
        body,
        json!({"ok": false, "message": "Time provided below threshold..."})
    );

    let body = call(&app, post_json("/timer/start", json!({"seconds": -5}))).await;
    assert_eq!(
        body,
        json!({"ok": false, "message": "Time provided below threshold..."})
    );

    call(&app, post_json("/timer/start", json!({"seconds": 60}))).await;
    let body = call(&app, post_json("/timer/start", json!({"seconds": 60}))).await;
    assert_eq!(
        body,
        json!({"ok": false, "message": "Timer Already Running..."})
    );

    call(&app, post_json("/timer/stop", json!({}))).await;
}

#[tokio::test]
async fn stop_when_idle_succeeds() {
    let (app, output) = app();

    let body = call(&app, post_json("/timer/stop", json!({}))).await;
    assert_eq!(body, json!({"ok": true, "message": "Ok"}));
    assert_eq!(output.write_count(), 0);
}

#[tokio::test]
async fn legacy_ajax_dispatch() {
    let (app, output) = app();

    let body = call(
        &app,
        post_form("/ajax/", "request=ajax_start_event&hours=&minutes=1&seconds="),
    )
    .await;
    assert_eq!(body, json!({"Error": false, "Message": "Ok"}));

    let body = call(&app, post_json("/ajax/", json!({"request": "ajax_get_status"}))).await;
    assert_eq!(body["Error"], json!(false));
    assert_eq!(body["Status"], json!(true));
    assert!(body["Left"].as_f64().unwrap() > 0.0);

    let body = call(
        &app,
        post_form("/ajax/ajax_start_event", "request=ajax_start_event&seconds=5"),
    )
    .await;
    assert_eq!(body, json!({"Error": true, "Message": "Timer Already Running..."}));

    let body = call(&app, post_form("/ajax/", "request=ajax_stop_event")).await;
    assert_eq!(body, json!({"Error": false, "Message": "Ok"}));
    assert_eq!(output.last_level(LINE), Some(Level::Low));

    let body = call(&app, post_form("/ajax/", "request=ajax_get_status")).await;
    assert_eq!(
        body,
        json!({"Error": false, "Message": "", "Status": false, "Left": 0.0})
    );
}

#[tokio::test]
async fn legacy_ajax_rejects_unknown_requests_and_gets() {
    let (app, _output) = app();

    let body = call(&app, post_form("/ajax/", "request=ajax_reboot")).await;
    assert_eq!(body, json!({"Error": true, "Message": ""}));

    let body = call(&app, post_form("/ajax/", "hours=1")).await;
    assert_eq!(body, json!({"Error": true, "Message": ""}));

    let body = call(&app, get("/ajax/ajax_get_status")).await;
    assert_eq!(body, json!({"Error": true, "Message": ""}));
}

#[tokio::test]
async fn health_reports_line_and_last_action() {
    let (app, _output) = app();

    call(&app, post_json("/timer/stop", json!({}))).await;
    let body = call(&app, get("/health")).await;

    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["line"], json!(LINE));
    assert_eq!(body["last_action"], json!("stop"));
    assert!(body["last_action_time"].is_string());
}
