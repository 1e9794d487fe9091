//! ICMP echo over the kernel's ping sockets.
//!
//! Uses unprivileged `SOCK_DGRAM` ICMP sockets where the host allows them
//! (`net.ipv4.ping_group_range`), so the prober does not need root.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use pinger_common::error::EchoError;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use tracing::warn;

use super::EchoProbe;

const PAYLOAD: [u8; 56] = [0; 56];

/// One socket per address family, shared by all probes.
pub struct IcmpEcho {
    v4: Client,
    v6: Option<Client>,
}

impl IcmpEcho {
    /// Opens the echo sockets. Must be called inside a tokio runtime.
    ///
    /// IPv4 is mandatory; a host without IPv6 only loses IPv6 targets.
    pub fn new() -> Result<Self, EchoError> {
        let v4 = Client::new(&Config::default()).map_err(|e| EchoError::Socket(e.to_string()))?;

        let v6 = match Client::new(&Config::builder().kind(ICMP::V6).build()) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("IPv6 echo socket unavailable: {e}");
                None
            }
        };

        Ok(Self { v4, v6 })
    }

    fn client_for(&self, addr: IpAddr) -> Result<&Client, EchoError> {
        match addr {
            IpAddr::V4(_) => Ok(&self.v4),
            IpAddr::V6(_) => self.v6.as_ref().ok_or(EchoError::Unsupported("IPv6")),
        }
    }
}

#[async_trait]
impl EchoProbe for IcmpEcho {
    async fn echo(&self, addr: IpAddr, timeout: Duration) -> Result<Duration, EchoError> {
        let client = self.client_for(addr)?;

        let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_packet, rtt)) => Ok(rtt),
            Err(SurgeError::Timeout { .. }) => Err(EchoError::Timeout(timeout)),
            Err(e) => Err(EchoError::Network(e.to_string())),
        }
    }
}
