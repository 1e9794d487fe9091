//! # Probe Target Model
//!
//! A target is one container as described by the inventory at the start of a
//! cycle. Targets are fetched again on every cycle and never cached.

use std::net::IpAddr;

use chrono::{DateTime, Utc};

/// Placeholder used when the inventory reports no name.
pub const UNKNOWN_NAME: &str = "<unknown>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Opaque inventory identifier, used to resolve the address.
    pub id: String,
    pub name: String,
    /// Address already known from listing; resolved on demand otherwise.
    pub address: Option<IpAddr>,
    /// Lifecycle text as reported by the inventory (e.g. `Up 3 hours`).
    pub status: String,
    pub created: DateTime<Utc>,
}

impl Target {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            status: String::new(),
            created: DateTime::UNIX_EPOCH,
        }
    }

    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }
}
