//! Single-shot reachability checks.
//!
//! [`EchoProbe`] sends exactly one echo request and waits for its reply. It does
//! not retry: the next cycle is the retry. [`icmp`] implements it with ICMP.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use pinger_common::error::EchoError;

pub mod icmp;

pub use icmp::IcmpEcho;

#[async_trait]
pub trait EchoProbe: Send + Sync {
    /// Sends one echo request to `addr` and returns the measured round trip.
    ///
    /// Implementations should give up after `timeout`; the caller enforces it
    /// regardless and drops the future on cancellation.
    async fn echo(&self, addr: IpAddr, timeout: Duration) -> Result<Duration, EchoError>;
}
