//! The periodic **probe-and-report** loop.
//!
//! Every tick starts a cycle: list targets, spawn one probe+report task per
//! target, wait for all of them, log a summary. Cycles run in their own tasks so
//! a slow cycle never delays the next tick; overlapping cycles are allowed.
//!
//! Shutdown is best-effort. [`Coordinator::run`] returns as soon as the lifetime
//! is cancelled; the cycles still in flight see the same cancellation and unwind
//! on their own. Call [`Coordinator::drain`] to wait for them.

use std::fmt;
use std::sync::Arc;

use pinger_common::config::Config;
use pinger_common::error::{ConfigError, DeliveryError, ListError};
use pinger_common::probe::ProbeStatus;
use pinger_common::target::Target;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::echo::EchoProbe;
use crate::inventory::TargetLister;
use crate::prober::Prober;
use crate::reporter::Reporter;
use crate::sink::ResultSink;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("failed to list targets: {0}")]
    Listing(#[from] ListError),

    #[error("cycle cancelled")]
    Cancelled,
}

/// Counters of one drained cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub targets: usize,
    pub reachable: usize,
    pub unreachable: usize,
    pub unresolved: usize,
    pub delivered: usize,
    pub dropped: usize,
    pub cancelled: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &TaskOutcome) {
        match outcome.probe {
            ProbeKind::Reachable => self.reachable += 1,
            ProbeKind::Unreachable => self.unreachable += 1,
            ProbeKind::Unresolved => self.unresolved += 1,
            ProbeKind::Cancelled => {}
        }
        match outcome.delivery {
            Ok(()) => self.delivered += 1,
            Err(DeliveryError::Cancelled) => self.cancelled += 1,
            Err(_) => self.dropped += 1,
        }
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} targets: {} reachable, {} unreachable, {} unresolved; {} delivered, {} dropped, {} cancelled",
            self.targets,
            self.reachable,
            self.unreachable,
            self.unresolved,
            self.delivered,
            self.dropped,
            self.cancelled
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum ProbeKind {
    Reachable,
    Unreachable,
    Unresolved,
    Cancelled,
}

impl From<&ProbeStatus> for ProbeKind {
    fn from(status: &ProbeStatus) -> Self {
        match status {
            ProbeStatus::Reachable { .. } => Self::Reachable,
            ProbeStatus::Unreachable { .. } => Self::Unreachable,
            ProbeStatus::Unresolved { .. } => Self::Unresolved,
            ProbeStatus::Cancelled => Self::Cancelled,
        }
    }
}

struct TaskOutcome {
    probe: ProbeKind,
    delivery: Result<(), DeliveryError>,
}

/// Everything a cycle needs, cheap to clone into a spawned task.
#[derive(Clone)]
struct CycleRunner {
    config: Arc<Config>,
    lister: Arc<dyn TargetLister>,
    prober: Arc<Prober>,
    reporter: Arc<Reporter>,
}

impl CycleRunner {
    async fn run_cycle(&self, cancel: CancellationToken) -> Result<CycleReport, CycleError> {
        let targets = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CycleError::Cancelled),
            res = self.lister.list() => res?,
        };

        let mut report = CycleReport {
            targets: targets.len(),
            ..CycleReport::default()
        };

        let mut tasks = JoinSet::new();
        for target in targets {
            let runner = self.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move { runner.probe_and_report(target, cancel).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(&outcome),
                Err(e) => error!("probe task failed: {e}"),
            }
        }
        Ok(report)
    }

    async fn probe_and_report(&self, target: Target, cancel: CancellationToken) -> TaskOutcome {
        let result = self
            .prober
            .probe(&target, self.config.probe_timeout, &cancel)
            .await;
        let probe = ProbeKind::from(&result.status);

        if let ProbeStatus::Unreachable { reason } | ProbeStatus::Unresolved { reason } =
            &result.status
        {
            warn!(target_id = %target.id, name = %target.name, "probe failed: {reason}");
        }

        let delivery = self
            .reporter
            .deliver(
                result,
                self.config.retry_attempts,
                self.config.backoff_base,
                &cancel,
            )
            .await;

        match &delivery {
            Ok(()) => {}
            Err(DeliveryError::Cancelled) => {
                debug!(target_id = %target.id, "delivery cancelled");
            }
            Err(e) => {
                error!(target_id = %target.id, name = %target.name, "failed to send result: {e}");
            }
        }

        TaskOutcome { probe, delivery }
    }
}

pub struct Coordinator {
    runner: CycleRunner,
    cycles: TaskTracker,
}

impl Coordinator {
    /// Validates `config` and wires the workers to the three ports.
    pub fn new(
        config: Config,
        lister: Arc<dyn TargetLister>,
        echo: Arc<dyn EchoProbe>,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let runner = CycleRunner {
            config: Arc::new(config),
            prober: Arc::new(Prober::new(lister.clone(), echo)),
            reporter: Arc::new(Reporter::new(sink)),
            lister,
        };

        Ok(Self {
            runner,
            cycles: TaskTracker::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.runner.config
    }

    /// Runs one full cycle inline and returns once every task has finished.
    pub async fn run_cycle(&self, cancel: CancellationToken) -> Result<CycleReport, CycleError> {
        self.runner.run_cycle(cancel).await
    }

    /// Starts a cycle on every tick of the period until `lifetime` is cancelled.
    ///
    /// The first cycle starts one period after the call. Ticks missed while the
    /// runtime was busy fire in a burst; none are skipped.
    pub async fn run(&self, lifetime: CancellationToken) {
        let period = self.runner.config.cycle_period;
        info!(?period, "starting pinger service");

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        let mut cycle: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = lifetime.cancelled() => break,
                _ = ticker.tick() => {
                    cycle += 1;
                    self.spawn_cycle(cycle, lifetime.child_token());
                }
            }
        }

        info!(cycles = cycle, "pinger service stopped");
    }

    /// Waits for every cycle spawned by [`run`](Self::run) to finish.
    pub async fn drain(&self) {
        self.cycles.close();
        self.cycles.wait().await;
    }

    /// Number of cycles still in flight.
    pub fn in_flight(&self) -> usize {
        self.cycles.len()
    }

    fn spawn_cycle(&self, cycle: u64, cancel: CancellationToken) {
        let runner = self.runner.clone();
        self.cycles.spawn(async move {
            let started = Instant::now();
            match runner.run_cycle(cancel).await {
                Ok(report) => info!(
                    cycle,
                    elapsed = ?started.elapsed(),
                    targets = report.targets,
                    reachable = report.reachable,
                    delivered = report.delivered,
                    dropped = report.dropped,
                    "cycle complete"
                ),
                Err(CycleError::Cancelled) => debug!(cycle, "cycle cancelled"),
                Err(e) => error!(cycle, "ping cycle error: {e}"),
            }
        });
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
