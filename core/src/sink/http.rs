use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pinger_common::error::SinkError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use super::ResultSink;

/// Posts each payload as `application/json` to a fixed collector URL.
///
/// Non-2xx answers are failures. The response body is never read.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    url: String,
}

impl HttpSink {
    /// Fails on a URL that names no http(s) host, so a bad address aborts
    /// startup instead of failing every delivery.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, SinkError> {
        let url = url.into();
        check_url(&url)?;

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SinkError::Client(e.to_string()))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, err: reqwest::Error) -> SinkError {
        if err.is_timeout() {
            SinkError::Timeout {
                url: self.url.clone(),
            }
        } else {
            SinkError::Transport {
                url: self.url.clone(),
                reason: err.to_string(),
            }
        }
    }
}

fn check_url(url: &str) -> Result<(), SinkError> {
    let invalid =
        |reason: String| SinkError::Client(format!("invalid collector URL '{url}': {reason}"));

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    match parsed.host_str() {
        Some(host) if !host.trim().is_empty() => Ok(()),
        _ => Err(invalid("missing host".to_string())),
    }
}

#[async_trait]
impl ResultSink for HttpSink {
    async fn submit(&self, body: Bytes) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
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
