//! # Pinger Common
//!
//! Types shared by every crate of the workspace.
//!
//! * **[`config`]**: the immutable options handed to the coordinator.
//! * **[`target`]**: a container to be health-checked, as described by the inventory.
//! * **[`probe`]**: the outcome of probing one target.
//! * **[`error`]**: typed failures of the inventory, the echo probe and the collector.

pub mod config;
pub mod error;
pub mod probe;
pub mod target;
