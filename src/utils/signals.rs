//! Signal handling for graceful shutdown

use std::future::Future;
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::info;

/// Register for shutdown signals (SIGTERM, SIGINT).
///
/// Handlers are installed before this returns; the returned future resolves
/// on the first signal received.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;
    let handle = signals.handle();

    Ok(async move {
        if let Some(signal) = signals.next().await {
            info!("Received signal: {}", signal);
        }
        handle.close();
    })
}
