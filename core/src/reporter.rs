//! Delivers one [`ProbeResult`] to the collector with bounded retries.
//!
//! The result is encoded once; each attempt resends the same bytes. Attempts
//! are spaced linearly: the wait before attempt `k + 1` is `base_delay * k`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use pinger_common::error::DeliveryError;
use pinger_common::probe::ProbeResult;
use pinger_protocols::sink;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::sink::ResultSink;

pub struct Reporter {
    sink: Arc<dyn ResultSink>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn ResultSink>) -> Self {
        Self { sink }
    }

    /// Sends `result` until the sink accepts it or `max_attempts` are spent.
    ///
    /// Cancellation wins over everything: a cancelled lifetime during a request
    /// or a backoff wait returns [`DeliveryError::Cancelled`], never the
    /// transport error.
    pub async fn deliver(
        &self,
        result: ProbeResult,
        max_attempts: u32,
        base_delay: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), DeliveryError> {
        let body = sink::encode(&result).map_err(|e| DeliveryError::Encode(e.to_string()))?;
        let body = Bytes::from(body);
        let max_attempts = max_attempts.max(1);

        let mut attempt: u32 = 1;
        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeliveryError::Cancelled),
                res = self.sink.submit(body.clone()) => res,
            };

            let err = match outcome {
                Ok(()) => {
                    debug!(target_id = %result.target_id, attempt, "result delivered");
                    return Ok(());
                }
                Err(err) => err,
            };

            warn!(target_id = %result.target_id, attempt, "delivery attempt failed: {err}");
            if attempt >= max_attempts {
                return Err(DeliveryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeliveryError::Cancelled),
                _ = tokio::time::sleep(backoff_delay(base_delay, attempt)) => {}
            }
            attempt += 1;
        }
    }
}

/// Wait after the `attempt`-th failure.
pub fn backoff_delay(base_delay: Duration, attempt: u32) -> Duration {
    base_delay.saturating_mul(attempt)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
