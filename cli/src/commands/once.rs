use pinger_common::config::Config;
use pinger_core::coordinator::CycleError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::shutdown;

pub async fn once(cfg: Config) -> anyhow::Result<()> {
    let coordinator = super::build_coordinator(cfg).await?;

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());

    match coordinator.run_cycle(cancel).await {
        Ok(report) => {
            if report.dropped > 0 || report.unreachable + report.unresolved > 0 {
                warn!("cycle complete: {report}");
            } else {
                info!("cycle complete: {report}");
            }
            Ok(())
        }
        Err(CycleError::Cancelled) => {
            warn!("cycle interrupted");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("cycle failed")),
    }
}
