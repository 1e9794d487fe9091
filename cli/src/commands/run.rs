use std::time::Duration;

use pinger_common::config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::shutdown;

pub async fn run(cfg: Config, shutdown_grace: Duration) -> anyhow::Result<()> {
    let coordinator = super::build_coordinator(cfg).await?;

    let lifetime = CancellationToken::new();
    shutdown::cancel_on_signal(lifetime.clone());

    coordinator.run(lifetime).await;

    let in_flight = coordinator.in_flight();
    if in_flight > 0 {
        info!(in_flight, "waiting for in-flight cycles to unwind");
        if tokio::time::timeout(shutdown_grace, coordinator.drain()).await.is_err() {
            warn!(
                in_flight = coordinator.in_flight(),
                "cycles still running after {}",
                humantime::format_duration(shutdown_grace)
            );
        }
    }
    Ok(())
}
