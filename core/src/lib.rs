//! # Pinger Core
//!
//! The probe-and-report coordinator and the adapters it talks to.
//!
//! * **Ports**: [`inventory::TargetLister`], [`echo::EchoProbe`] and [`sink::ResultSink`]
//!   isolate the coordinator from Docker, ICMP sockets and HTTP.
//! * **Workers**: [`prober::Prober`] turns a target into a result,
//!   [`reporter::Reporter`] delivers a result with bounded retries.
//! * **Orchestration**: [`coordinator::Coordinator`] runs one probe+report task per
//!   target on every tick of a periodic timer, under a cancellable lifetime.

pub mod coordinator;
pub mod echo;
pub mod inventory;
pub mod prober;
pub mod reporter;
pub mod sink;

#[cfg(test)]
pub(crate) mod stubs;
