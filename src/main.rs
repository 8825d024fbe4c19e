//! Pulse Timer - A web controlled countdown timer with a square wave output
//!
//! This is the main entry point for the pulse-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pulse_timer::{
    api::create_router,
    config::Config,
    output::{Direction, PulseOutput},
    state::AppState,
    timer::TimerController,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pulse_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pulse-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, line={}, half_period={}ms, output={:?}",
        config.host, config.port, config.line, config.half_period_ms, config.output
    );

    // The output line must be usable before anything can be served
    let output = config.build_output()?;
    output.configure(config.line, Direction::Output)?;

    let controller = Arc::new(TimerController::new(
        output,
        config.line,
        config.half_period(),
    )?);
    let state = Arc::new(AppState::new(
        Arc::clone(&controller),
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start  - Start the countdown (hours, minutes, seconds)");
    info!("  POST /timer/stop   - Stop the countdown");
    info!("  GET  /timer/status - Check whether the countdown runs and time left");
    info!("  POST /ajax/        - Legacy dispatch for the original web page");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let shutdown = shutdown_signal()?;
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        () = shutdown => {
            info!("Shutdown signal received");
        }
    }

    // Join the generator so the line is left LOW
    controller.stop().await;

    info!("Server shutdown complete");
    Ok(())
}
