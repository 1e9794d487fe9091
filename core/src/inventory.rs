//! The **abstraction** over the container inventory.
//!
//! The coordinator only needs two things from it: the set of targets at the
//! start of a cycle, and the address of a target the listing did not resolve.
//! [`docker`] implements it against the Docker Engine API.

use std::net::IpAddr;

use async_trait::async_trait;
use pinger_common::error::ListError;
use pinger_common::target::Target;

pub mod docker;

pub use docker::DockerLister;

/// Enumerates targets and resolves their addresses.
///
/// Implementations are shared by every task of every cycle and must be safe to
/// call concurrently.
#[async_trait]
pub trait TargetLister: Send + Sync {
    /// Lists every candidate target. Called once per cycle.
    async fn list(&self) -> Result<Vec<Target>, ListError>;

    /// Resolves the address of the target identified by `target_id`.
    async fn inspect_address(&self, target_id: &str) -> Result<IpAddr, ListError>;
}
