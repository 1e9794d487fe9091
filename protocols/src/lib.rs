//! Wire representations spoken at the edges of the coordinator.
//!
//! * [`sink`]: the JSON document posted to the collector for every result.
//! * [`docker`]: the subset of Docker Engine API documents the inventory reads.

pub mod docker;
pub mod sink;
