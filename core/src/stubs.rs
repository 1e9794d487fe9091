//! In-memory stand-ins for the three ports, shared by the unit tests.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pinger_common::error::{EchoError, ListError, SinkError};
use pinger_common::target::Target;
use tokio::time::Instant;

use crate::echo::EchoProbe;
use crate::inventory::TargetLister;
use crate::sink::ResultSink;

pub fn ip(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
}

#[derive(Default)]
pub struct StubLister {
    targets: Vec<Target>,
    addresses: HashMap<String, IpAddr>,
    failing_lists: AtomicUsize,
    hang: bool,
    lists: AtomicUsize,
    inspections: AtomicUsize,
}

impl StubLister {
    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    pub fn resolving(mut self, id: &str, addr: IpAddr) -> Self {
        self.addresses.insert(id.to_string(), addr);
        self
    }

    /// The first `n` calls to `list` fail.
    pub fn failing_lists(self, n: usize) -> Self {
        self.failing_lists.store(n, Ordering::SeqCst);
        self
    }

    /// Every call blocks forever.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn inspections(&self) -> usize {
        self.inspections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetLister for StubLister {
    async fn list(&self) -> Result<Vec<Target>, ListError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }

        let failing = self
            .failing_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ListError::Request {
                url: "stub://containers".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.targets.clone())
    }

    async fn inspect_address(&self, target_id: &str) -> Result<IpAddr, ListError> {
        self.inspections.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }

        self.addresses
            .get(target_id)
            .copied()
            .ok_or_else(|| ListError::NoAddress(target_id.to_string()))
    }
}

/// Answers known addresses; any other address never replies.
#[derive(Default)]
pub struct StubEcho {
    answers: HashMap<IpAddr, Result<Duration, String>>,
    calls: AtomicUsize,
}

impl StubEcho {
    pub fn answering(mut self, addr: IpAddr, rtt: Duration) -> Self {
        self.answers.insert(addr, Ok(rtt));
        self
    }

    pub fn failing(mut self, addr: IpAddr, reason: &str) -> Self {
        self.answers.insert(addr, Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EchoProbe for StubEcho {
    async fn echo(&self, addr: IpAddr, _timeout: Duration) -> Result<Duration, EchoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(&addr) {
            Some(Ok(rtt)) => {
                tokio::time::sleep(*rtt).await;
                Ok(*rtt)
            }
            Some(Err(reason)) => Err(EchoError::Network(reason.clone())),
            None => std::future::pending().await,
        }
    }
}

/// Fails the first `failures` submissions, then accepts everything.
#[derive(Default)]
pub struct StubSink {
    failures: AtomicUsize,
    attempts: Mutex<Vec<Instant>>,
    accepted: Mutex<Vec<Bytes>>,
}

impl StubSink {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn accepted(&self) -> Vec<serde_json::Value> {
        self.accepted
            .lock()
            .unwrap()
            .iter()
            .map(|body| serde_json::from_slice(body).unwrap())
            .collect()
    }
}

#[async_trait]
impl ResultSink for StubSink {
    async fn submit(&self, body: Bytes) -> Result<(), SinkError> {
        self.attempts.lock().unwrap().push(Instant::now());

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SinkError::Transport {
                url: "stub://collector".to_string(),
                reason: "connection refused".to_string(),
            });
        }

        self.accepted.lock().unwrap().push(body);
        Ok(())
    }
}
