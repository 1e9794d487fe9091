use chrono::{DateTime, SecondsFormat, Utc};
use pinger_common::probe::ProbeResult;
use serde::{Deserialize, Serialize};

/// One result as the collector stores it.
///
/// The collector upserts on `ip` (or `container_id`), so reporting the same
/// target every cycle overwrites the previous row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub ip: String,
    pub ping_time: f64,
    pub last_success: String,
    pub name: String,
    pub status: String,
    pub created: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub timestamp: String,
    pub container_id: String,
}

impl From<&ProbeResult> for ResultPayload {
    fn from(result: &ProbeResult) -> Self {
        Self {
            ip: result.address.map(|ip| ip.to_string()).unwrap_or_default(),
            ping_time: result.round_trip_ms(),
            last_success: result.last_success().map(rfc3339).unwrap_or_default(),
            name: result.name.clone(),
            status: result.target_status.clone(),
            created: rfc3339(result.created),
            error: result.error().unwrap_or_default().to_string(),
            timestamp: rfc3339(result.captured_at),
            container_id: result.target_id.clone(),
        }
    }
}

/// Encodes `result` as the JSON body of a collector request.
pub fn encode(result: &ProbeResult) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&ResultPayload::from(result))
}

fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
