//! Turns one [`Target`] into one [`ProbeResult`].
//!
//! The prober resolves the address at most once, sends at most one echo request
//! and never retries. Every outcome, including a failed resolution or a
//! cancelled cycle, is folded into the returned result rather than an error.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pinger_common::error::EchoError;
use pinger_common::probe::{ProbeResult, ProbeStatus};
use pinger_common::target::Target;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::echo::EchoProbe;
use crate::inventory::TargetLister;

pub struct Prober {
    lister: Arc<dyn TargetLister>,
    echo: Arc<dyn EchoProbe>,
}

impl Prober {
    pub fn new(lister: Arc<dyn TargetLister>, echo: Arc<dyn EchoProbe>) -> Self {
        Self { lister, echo }
    }

    /// Probes `target` once, giving the echo request at most `timeout`.
    ///
    /// When `cancel` fires, the pending resolution or echo is dropped and the
    /// result is [`ProbeStatus::Cancelled`].
    pub async fn probe(
        &self,
        target: &Target,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeResult {
        let address = match self.resolve(target, cancel).await {
            Ok(address) => address,
            Err(result) => return *result,
        };

        let start = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            res = tokio::time::timeout(timeout, self.echo.echo(address, timeout)) => Some(res),
        };
        let elapsed = start.elapsed();

        let status = match outcome {
            None => ProbeStatus::Cancelled,
            Some(Ok(Ok(_rtt))) => ProbeStatus::Reachable { at: Utc::now() },
            Some(Ok(Err(e))) => unreachable(e),
            Some(Err(_elapsed)) => unreachable(EchoError::Timeout(timeout)),
        };

        debug!(target_id = %target.id, %address, ?elapsed, ?status, "probe finished");
        ProbeResult::new(target, Some(address), elapsed, status)
    }

    /// Uses the listed address, or asks the inventory exactly once.
    async fn resolve(
        &self,
        target: &Target,
        cancel: &CancellationToken,
    ) -> Result<IpAddr, Box<ProbeResult>> {
        if let Some(address) = target.address {
            return Ok(address);
        }

        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let cancelled =
                    ProbeResult::new(target, None, Duration::ZERO, ProbeStatus::Cancelled);
                return Err(Box::new(cancelled));
            }
            res = self.lister.inspect_address(&target.id) => res,
        };

        resolved.map_err(|e| {
            debug!(target_id = %target.id, "address resolution failed: {e}");
            Box::new(ProbeResult::unresolved(target, e.to_string()))
        })
    }
}

fn unreachable(err: EchoError) -> ProbeStatus {
    ProbeStatus::Unreachable {
        reason: format!("ping failed: {err}"),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
