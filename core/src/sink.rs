//! Delivery of encoded results to the remote collector.
//!
//! [`ResultSink`] performs exactly one request per call; retries belong to the
//! [`Reporter`](crate::reporter::Reporter). [`http`] implements it with a JSON `POST`.

use async_trait::async_trait;
use bytes::Bytes;
use pinger_common::error::SinkError;

pub mod http;

pub use http::HttpSink;

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Sends one already-encoded payload. Any error counts as a failed attempt.
    async fn submit(&self, body: Bytes) -> Result<(), SinkError>;
}
