//! Translates process signals into a cancelled lifetime.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancels `lifetime` on the first SIGINT or SIGTERM.
pub fn cancel_on_signal(lifetime: CancellationToken) {
    tokio::spawn(async move {
        let signal = tokio::select! {
            _ = lifetime.cancelled() => return,
            name = wait_for_signal() => name,
        };
        info!("received {signal}, shutting down");
        lifetime.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("cannot listen for SIGTERM: {e}");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        name = ctrl_c() => name,
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for interrupts: {e}");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
