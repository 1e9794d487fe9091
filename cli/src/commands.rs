pub mod once;
pub mod run;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pinger_common::config::{Config, DEFAULT_DOCKER_ENDPOINT, DEFAULT_SINK_ADDRESS};
use pinger_core::coordinator::Coordinator;
use pinger_core::echo::IcmpEcho;
use pinger_core::inventory::DockerLister;
use pinger_core::sink::HttpSink;
use tracing::info;

use crate::terminal::logging::LogFormat;

#[derive(Parser)]
#[command(name = "pinger")]
#[command(about = "Pings every container on a Docker host and reports to a collector.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub options: Options,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "PINGER_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe and report on every tick until interrupted
    #[command(alias = "r")]
    Run {
        /// How long to wait for in-flight cycles after an interrupt
        #[arg(long, value_parser = humantime::parse_duration, default_value = "5s")]
        shutdown_grace: Duration,
    },
    /// Run a single cycle and print its summary
    #[command(alias = "o")]
    Once,
}

#[derive(Args)]
pub struct Options {
    /// Time between two cycles
    #[arg(long, value_parser = humantime::parse_duration, default_value = "5s", env = "PINGER_INTERVAL", global = true)]
    pub interval: Duration,

    /// Delivery attempts per result
    #[arg(long, default_value_t = 3, env = "PINGER_RETRY_ATTEMPTS", global = true)]
    pub retry_attempts: u32,

    /// Backoff unit between delivery attempts (grows linearly)
    #[arg(long, value_parser = humantime::parse_duration, default_value = "1s", env = "PINGER_RETRY_DELAY", global = true)]
    pub retry_delay: Duration,

    /// Upper bound for one echo request
    #[arg(long, value_parser = humantime::parse_duration, default_value = "5s", env = "PINGER_PING_TIMEOUT", global = true)]
    pub ping_timeout: Duration,

    /// Collector endpoint receiving the results
    #[arg(long, default_value = DEFAULT_SINK_ADDRESS, env = "PINGER_BACKEND_URL", global = true)]
    pub backend_url: String,

    /// Docker Engine API endpoint (unix://, tcp:// or http://)
    #[arg(long, default_value = DEFAULT_DOCKER_ENDPOINT, env = "DOCKER_HOST", global = true)]
    pub docker_host: String,

    /// Upper bound for one HTTP request
    #[arg(long, value_parser = humantime::parse_duration, default_value = "10s", env = "PINGER_REQUEST_TIMEOUT", global = true)]
    pub request_timeout: Duration,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Options {
    pub fn to_config(&self) -> Config {
        Config {
            cycle_period: self.interval,
            retry_attempts: self.retry_attempts,
            backoff_base: self.retry_delay,
            probe_timeout: self.ping_timeout,
            sink_address: self.backend_url.clone(),
            docker_endpoint: self.docker_host.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

/// Connects the adapters and checks the inventory once.
///
/// Everything that can fail here is misconfiguration and aborts startup.
pub async fn build_coordinator(cfg: Config) -> anyhow::Result<Coordinator> {
    cfg.validate().context("invalid configuration")?;

    let lister = DockerLister::new(&cfg.docker_endpoint, cfg.request_timeout)
        .context("failed to create Docker client")?;
    lister
        .ping()
        .await
        .with_context(|| format!("Docker daemon at {} is unreachable", lister.endpoint()))?;
    info!(endpoint = lister.endpoint(), "connected to Docker");

    let echo = IcmpEcho::new().context("failed to open ICMP sockets")?;
    let sink = HttpSink::new(cfg.sink_address.clone(), cfg.request_timeout)
        .context("failed to create collector client")?;

    let coordinator = Coordinator::new(cfg, Arc::new(lister), Arc::new(echo), Arc::new(sink))?;
    Ok(coordinator)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
