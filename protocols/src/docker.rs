//! Docker Engine API documents.
//!
//! Only the fields needed to build a [`Target`] are decoded; everything else in
//! the response is ignored. Field names follow the Engine API casing.

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use pinger_common::target::{Target, UNKNOWN_NAME};
use serde::{Deserialize, Serialize};

/// An entry of `GET /containers/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub network_settings: Option<NetworkSettings>,
}

/// The body of `GET /containers/{id}/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInspect {
    pub id: String,
    #[serde(default)]
    pub network_settings: Option<NetworkSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSettings {
    #[serde(default)]
    pub networks: Option<BTreeMap<String, EndpointSettings>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,
}

impl NetworkSettings {
    /// First non-empty address, visiting networks in name order.
    pub fn first_address(&self) -> Option<&str> {
        self.networks
            .iter()
            .flat_map(|networks| networks.values())
            .map(|endpoint| endpoint.ip_address.as_str())
            .find(|ip| !ip.is_empty())
    }
}

impl ContainerSummary {
    /// Raw address from the listing, if any network reported one.
    pub fn first_address(&self) -> Option<&str> {
        self.network_settings.as_ref()?.first_address()
    }

    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|name| name.trim_start_matches('/'))
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_NAME)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl ContainerInspect {
    pub fn first_address(&self) -> Option<&str> {
        self.network_settings.as_ref()?.first_address()
    }
}

impl From<ContainerSummary> for Target {
    /// An address that does not parse is left for inspection to resolve.
    fn from(summary: ContainerSummary) -> Self {
        let address = summary
            .first_address()
            .and_then(|ip| ip.parse::<IpAddr>().ok());

        let mut target = Target::new(summary.id.clone(), summary.display_name())
            .with_status(summary.status.clone())
            .with_created(summary.created_at());
        target.address = address;
        target
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
