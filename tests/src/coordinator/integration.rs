use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pinger_common::config::Config;
use pinger_core::coordinator::{Coordinator, CycleReport};
use pinger_core::inventory::DockerLister;
use pinger_core::sink::HttpSink;
use tokio_util::sync::CancellationToken;

use crate::utils::{
    closed_port, container, inspection, ip, AddressEcho, FakeCollector, FakeDocker,
};

const PROBE_TIMEOUT: Duration = Duration::from_millis(300);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

fn config(sink_address: String) -> Config {
    Config {
        cycle_period: Duration::from_millis(200),
        retry_attempts: 3,
        backoff_base: Duration::from_millis(20),
        probe_timeout: PROBE_TIMEOUT,
        sink_address,
        request_timeout: REQUEST_TIMEOUT,
        ..Config::default()
    }
}

fn coordinator(docker: &FakeDocker, cfg: Config, echo: AddressEcho) -> Coordinator {
    let lister = DockerLister::new(&docker.url(), REQUEST_TIMEOUT).unwrap();
    let sink = HttpSink::new(cfg.sink_address.clone(), REQUEST_TIMEOUT).unwrap();
    Coordinator::new(cfg, Arc::new(lister), Arc::new(echo), Arc::new(sink)).unwrap()
}

/// A is listed with an address and answers, B is resolved by inspection and
/// stays silent, C cannot be resolved at all.
#[tokio::test]
async fn one_cycle_delivers_reachable_unreachable_and_unresolved() {
    let docker = FakeDocker::start(
        vec![
            container("a", "alpha", Some("10.0.0.1")),
            container("b", "bravo", None),
            container("c", "charlie", None),
        ],
        HashMap::from([("b".to_string(), inspection("b", "10.0.0.2"))]),
    )
    .await;
    let collector = FakeCollector::start(0).await;
    let coordinator = coordinator(
        &docker,
        config(collector.url()),
        AddressEcho::new([ip(1)]),
    );

    let report = coordinator.run_cycle(CancellationToken::new()).await.unwrap();

    assert_eq!(
        report,
        CycleReport {
            targets: 3,
            reachable: 1,
            unreachable: 1,
            unresolved: 1,
            delivered: 3,
            ..CycleReport::default()
        }
    );
    assert_eq!(collector.received().len(), 3);

    let a = collector.payload_for("a");
    assert_eq!(a.ip, "10.0.0.1");
    assert_eq!(a.name, "alpha");
    assert_ne!(a.last_success, "");
    assert_eq!(a.error, "");

    let b = collector.payload_for("b");
    assert_eq!(b.ip, "10.0.0.2");
    assert_eq!(b.last_success, "");
    assert!(b.error.starts_with("ping failed"), "{}", b.error);
    assert!(
        (300.0..2_000.0).contains(&b.ping_time),
        "round trip {}ms should be close to the probe timeout",
        b.ping_time
    );

    let c = collector.payload_for("c");
    assert_eq!(c.ip, "");
    assert_eq!(c.ping_time, 0.0);
    assert_eq!(c.last_success, "");
    assert!(!c.error.is_empty());
}

#[tokio::test]
async fn collector_outage_is_retried() {
    let docker = FakeDocker::start(
        vec![container("a", "alpha", Some("10.0.0.1"))],
        HashMap::new(),
    )
    .await;
    let collector = FakeCollector::start(2).await;
    let coordinator = coordinator(
        &docker,
        config(collector.url()),
        AddressEcho::new([ip(1)]),
    );

    let report = coordinator.run_cycle(CancellationToken::new()).await.unwrap();

    assert_eq!(report.delivered, 1);
    assert_eq!(collector.requests(), 3);
    assert_eq!(collector.received().len(), 1);
}

#[tokio::test]
async fn unreachable_collector_drops_results_without_failing_the_cycle() {
    let docker = FakeDocker::start(
        vec![
            container("a", "alpha", Some("10.0.0.1")),
            container("c", "charlie", None),
        ],
        HashMap::new(),
    )
    .await;
    let dead = closed_port().await;
    let cfg = Config {
        retry_attempts: 2,
        ..config(format!("http://{dead}/api/ping-results"))
    };
    let coordinator = coordinator(&docker, cfg, AddressEcho::new([ip(1)]));

    let report = coordinator.run_cycle(CancellationToken::new()).await.unwrap();

    assert_eq!(report.targets, 2);
    assert_eq!(report.dropped, 2);
    assert_eq!(report.delivered, 0);
}

#[tokio::test]
async fn run_reports_on_every_tick_until_cancelled() {
    let docker = FakeDocker::start(
        vec![container("a", "alpha", Some("10.0.0.1"))],
        HashMap::new(),
    )
    .await;
    let collector = FakeCollector::start(0).await;
    let coordinator = Arc::new(coordinator(
        &docker,
        config(collector.url()),
        AddressEcho::new([ip(1)]),
    ));
    let lifetime = CancellationToken::new();

    let running = tokio::spawn({
        let coordinator = coordinator.clone();
        let lifetime = lifetime.clone();
        async move { coordinator.run(lifetime).await }
    });

    tokio::time::sleep(Duration::from_millis(750)).await;
    lifetime.cancel();
    tokio::time::timeout(Duration::from_secs(1), running)
        .await
        .expect("run should return promptly after cancellation")
        .unwrap();
    coordinator.drain().await;

    assert!(
        collector.received().len() >= 2,
        "expected a result per tick, got {}",
        collector.received().len()
    );
}
