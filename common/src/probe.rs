//! # Probe Result Model
//!
//! The outcome of probing one [`Target`] during one cycle.
//!
//! A result either carries a success timestamp or an error description, never
//! both. [`ProbeStatus`] encodes that choice so an inconsistent result cannot be
//! built; [`ProbeResult::last_success`] and [`ProbeResult::error`] expose the
//! flat view the collector expects.

use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::target::Target;

pub const CANCELLED_REASON: &str = "probe cancelled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The echo request was answered.
    Reachable { at: DateTime<Utc> },
    /// The echo request failed or timed out.
    Unreachable { reason: String },
    /// The address could not be resolved, so no echo was sent.
    Unresolved { reason: String },
    /// The cycle was cancelled before the probe finished.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub target_id: String,
    pub name: String,
    pub target_status: String,
    pub created: DateTime<Utc>,
    pub address: Option<IpAddr>,
    /// Wall-clock time spent on the echo request, zero when none was sent.
    pub round_trip: Duration,
    pub status: ProbeStatus,
    pub captured_at: DateTime<Utc>,
}

impl ProbeResult {
    /// Builds a result for `target`, stamped with the current time.
    pub fn new(
        target: &Target,
        address: Option<IpAddr>,
        round_trip: Duration,
        status: ProbeStatus,
    ) -> Self {
        Self {
            target_id: target.id.clone(),
            name: target.name.clone(),
            target_status: target.status.clone(),
            created: target.created,
            address,
            round_trip,
            status,
            captured_at: Utc::now(),
        }
    }

    pub fn unresolved(target: &Target, reason: impl Into<String>) -> Self {
        let status = ProbeStatus::Unresolved {
            reason: reason.into(),
        };
        Self::new(target, None, Duration::ZERO, status)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ProbeStatus::Reachable { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, ProbeStatus::Cancelled)
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        match self.status {
            ProbeStatus::Reachable { at } => Some(at),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ProbeStatus::Reachable { .. } => None,
            ProbeStatus::Unreachable { reason } | ProbeStatus::Unresolved { reason } => {
                Some(reason.as_str())
            }
            ProbeStatus::Cancelled => Some(CANCELLED_REASON),
        }
    }

    /// Round trip in milliseconds, as reported to the collector.
    pub fn round_trip_ms(&self) -> f64 {
        self.round_trip.as_nanos() as f64 / 1_000_000.0
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
