//! Error types for pinger
//!
//! Each external collaborator gets its own enum so callers can tell a dead
//! inventory from a dead collector. None of these are fatal once the
//! coordinator runs: they end up in a probe result or in a log line.

use std::time::Duration;

use thiserror::Error;

/// Rejected configuration, surfaced once at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("at least one delivery attempt is required")]
    NoAttempts,

    #[error("invalid sink address '{address}': {reason}")]
    InvalidSinkAddress { address: String, reason: String },
}

/// Failures of the container inventory (listing and address resolution).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("unsupported inventory endpoint '{0}'")]
    UnsupportedEndpoint(String),

    #[error("failed to build inventory client: {0}")]
    Client(String),

    #[error("inventory request to '{url}' failed: {reason}")]
    Request { url: String, reason: String },

    #[error("inventory answered {status} for '{url}'")]
    Status { url: String, status: u16 },

    #[error("failed to decode inventory response from '{url}': {reason}")]
    Decode { url: String, reason: String },

    #[error("no IP address found for container {0}")]
    NoAddress(String),

    #[error("invalid IP address '{address}' for container {target_id}")]
    InvalidAddress { target_id: String, address: String },
}

/// Failures of a single echo request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EchoError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("failed to open echo socket: {0}")]
    Socket(String),

    #[error("{0} echo is not available on this host")]
    Unsupported(&'static str),

    #[error("{0}")]
    Network(String),
}

/// Failures of one request to the collector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("failed to build collector client: {0}")]
    Client(String),

    #[error("request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("request to '{url}' timed out")]
    Timeout { url: String },

    #[error("collector at '{url}' answered {status}")]
    Status { url: String, status: u16 },
}

/// Final outcome of a failed delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("failed to encode result: {0}")]
    Encode(String),

    #[error("failed after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: SinkError },

    #[error("delivery cancelled")]
    Cancelled,
}

impl DeliveryError {
    /// Attempts made before giving up, zero when nothing was sent.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            _ => 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
