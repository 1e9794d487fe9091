use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_SINK_ADDRESS: &str = "http://backend:8080/api/ping-results";
pub const DEFAULT_DOCKER_ENDPOINT: &str = "unix:///var/run/docker.sock";

/// Options handed to the coordinator at construction.
///
/// The coordinator keeps its own copy and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Time between two cycle starts.
    pub cycle_period: Duration,
    /// Delivery attempts per result, the first one included.
    pub retry_attempts: u32,
    /// Linear backoff unit: the wait before attempt `k + 1` is `backoff_base * k`.
    pub backoff_base: Duration,
    /// Upper bound for a single echo request.
    pub probe_timeout: Duration,
    /// Collector endpoint receiving one `POST` per result.
    pub sink_address: String,
    /// Docker Engine API endpoint (`unix://`, `tcp://` or `http://`).
    pub docker_endpoint: String,
    /// Upper bound for one HTTP request to the collector or the inventory.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_period: Duration::from_secs(5),
            retry_attempts: 3,
            backoff_base: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(5),
            sink_address: DEFAULT_SINK_ADDRESS.to_string(),
            docker_endpoint: DEFAULT_DOCKER_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Rejects option sets the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_period.is_zero() {
            return Err(ConfigError::ZeroDuration("cycle period"));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("probe timeout"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        validate_http_url(&self.sink_address)
    }
}

fn validate_http_url(address: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSinkAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let Some((scheme, rest)) = address.split_once("://") else {
        return Err(invalid("missing scheme"));
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(invalid("scheme must be http or https"));
    }
    if rest.starts_with('/') {
        return Err(invalid("missing host"));
    }

    let url = Url::parse(address).map_err(|e| invalid(&e.to_string()))?;
    match url.host_str() {
        Some(host) if !host.trim().is_empty() => Ok(()),
        _ => Err(invalid("missing host")),
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
