//! A [`TargetLister`] backed by the **Docker Engine API**.
//!
//! Reaches the daemon either through its local socket (`unix:///var/run/docker.sock`,
//! the default) or over TCP (`tcp://host:2375` or `http://host:2375`). Every
//! container is listed, running or not.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pinger_common::error::ListError;
use pinger_common::target::Target;
use pinger_protocols::docker::{ContainerInspect, ContainerSummary};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::TargetLister;

const LIST_PATH: &str = "/containers/json?all=true";
const PING_PATH: &str = "/_ping";

/// Where the daemon listens, after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// Base URL without trailing slash.
    Http(String),
    /// Path of the daemon's unix socket.
    Unix(PathBuf),
}

#[derive(Debug, Clone)]
enum Transport {
    Http { client: Client, base_url: String },
    Unix { socket: PathBuf, timeout: Duration },
}

#[derive(Debug, Clone)]
pub struct DockerLister {
    transport: Transport,
    endpoint: String,
}

impl DockerLister {
    pub fn new(endpoint: &str, request_timeout: Duration) -> Result<Self, ListError> {
        let transport = match normalize_endpoint(endpoint)? {
            Endpoint::Http(base_url) => {
                let client = Client::builder()
                    .timeout(request_timeout)
                    .build()
                    .map_err(|e| ListError::Client(e.to_string()))?;
                Transport::Http { client, base_url }
            }
            Endpoint::Unix(socket) => Transport::Unix {
                socket,
                timeout: request_timeout,
            },
        };

        let endpoint = match &transport {
            Transport::Http { base_url, .. } => base_url.clone(),
            Transport::Unix { socket, .. } => format!("unix://{}", socket.display()),
        };
        Ok(Self { transport, endpoint })
    }

    /// The daemon address as used for requests and error messages.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Checks that the daemon answers at all. Used once at startup.
    pub async fn ping(&self) -> Result<(), ListError> {
        self.get(PING_PATH).await.map(|_| ())
    }

    /// Issues one `GET` and returns the body of a 2xx answer.
    async fn get(&self, path: &str) -> Result<(String, Bytes), ListError> {
        let url = format!("{}{path}", self.endpoint);
        let request_failed = |reason: String| ListError::Request {
            url: url.clone(),
            reason,
        };

        let (status, body) = match &self.transport {
            Transport::Http { client, base_url } => {
                let response = client
                    .get(format!("{base_url}{path}"))
                    .send()
                    .await
                    .map_err(|e| request_failed(e.to_string()))?;
                let status = response.status().as_u16();
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| request_failed(e.to_string()))?;
                (status, body)
            }
            Transport::Unix { socket, timeout } => {
                tokio::time::timeout(*timeout, unix_get(socket, path))
                    .await
                    .map_err(|_| request_failed(format!("no answer within {timeout:?}")))?
                    .map_err(request_failed)?
            }
        };

        if !(200..300).contains(&status) {
            return Err(ListError::Status { url, status });
        }
        Ok((url, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ListError> {
        let (url, body) = self.get(path).await?;
        serde_json::from_slice(&body).map_err(|e| ListError::Decode {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl TargetLister for DockerLister {
    async fn list(&self) -> Result<Vec<Target>, ListError> {
        let summaries: Vec<ContainerSummary> = self.get_json(LIST_PATH).await?;
        debug!(count = summaries.len(), "listed containers");
        Ok(summaries.into_iter().map(Target::from).collect())
    }

    async fn inspect_address(&self, target_id: &str) -> Result<IpAddr, ListError> {
        let path = format!("/containers/{target_id}/json");
        let inspect: ContainerInspect = self.get_json(&path).await?;

        let raw = inspect
            .first_address()
            .ok_or_else(|| ListError::NoAddress(target_id.to_string()))?;

        raw.parse::<IpAddr>()
            .map_err(|_| ListError::InvalidAddress {
                target_id: target_id.to_string(),
                address: raw.to_string(),
            })
    }
}

/// One HTTP/1.1 exchange over a fresh connection to the daemon socket.
#[cfg(unix)]
async fn unix_get(socket: &Path, path: &str) -> Result<(u16, Bytes), String> {
    use http_body_util::{BodyExt, Empty};
    use hyper::Request;
    use hyper::client::conn::http1;
    use hyper::header::HOST;
    use hyper_util::rt::TokioIo;
    use tokio::net::UnixStream;

    let stream = UnixStream::connect(socket)
        .await
        .map_err(|e| format!("cannot connect to {}: {e}", socket.display()))?;
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| e.to_string())?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!("docker socket connection ended: {e}");
        }
    });

    // The daemon rejects HTTP/1.1 requests without a Host header.
    let request = Request::get(path)
        .header(HOST, "docker")
        .body(Empty::<Bytes>::new())
        .map_err(|e| e.to_string())?;
    let response = sender.send_request(request).await.map_err(|e| e.to_string())?;

    let status = response.status().as_u16();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| e.to_string())?
        .to_bytes();
    Ok((status, body))
}

#[cfg(not(unix))]
async fn unix_get(socket: &Path, _path: &str) -> Result<(u16, Bytes), String> {
    Err(format!(
        "unix sockets are not available on this platform ({})",
        socket.display()
    ))
}

/// Turns a Docker host string into an HTTP base URL or a socket path.
fn normalize_endpoint(endpoint: &str) -> Result<Endpoint, ListError> {
    let endpoint = endpoint.trim();
    let unsupported = || ListError::UnsupportedEndpoint(endpoint.to_string());

    if let Some(socket) = endpoint.strip_prefix("unix://") {
        if socket.is_empty() {
            return Err(unsupported());
        }
        return Ok(Endpoint::Unix(PathBuf::from(socket)));
    }

    let endpoint = endpoint.trim_end_matches('/');
    let base = if let Some(rest) = endpoint.strip_prefix("tcp://") {
        format!("http://{rest}")
    } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        return Err(unsupported());
    };

    if base.ends_with("://") {
        return Err(unsupported());
    }
    Ok(Endpoint::Http(base))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
