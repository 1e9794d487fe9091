use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use pinger_common::error::{ListError, SinkError};
use pinger_core::inventory::{DockerLister, TargetLister};
use pinger_core::sink::{HttpSink, ResultSink};

use crate::utils::{closed_port, container, inspection, ip, FakeCollector, FakeDocker};

const TIMEOUT: Duration = Duration::from_secs(2);

fn body() -> Bytes {
    Bytes::from_static(
        br#"{"ip":"10.0.0.1","ping_time":0.25,"last_success":"2024-03-01T12:00:00Z","name":"web","status":"Up","created":"2024-03-01T11:00:00Z","timestamp":"2024-03-01T12:00:00Z","container_id":"a"}"#,
    )
}

#[tokio::test]
async fn docker_lister_lists_every_container() {
    let docker = FakeDocker::start(
        vec![
            container("a", "web", Some("10.0.0.1")),
            container("b", "worker", None),
        ],
        HashMap::new(),
    )
    .await;
    let lister = DockerLister::new(&docker.url(), TIMEOUT).unwrap();

    lister.ping().await.unwrap();
    let targets = lister.list().await.unwrap();

    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].id, "a");
    assert_eq!(targets[0].name, "web");
    assert_eq!(targets[0].status, "Up 10 minutes");
    assert_eq!(targets[0].address, Some(ip(1)));
    assert_eq!(targets[1].address, None);
}

#[tokio::test]
async fn docker_lister_resolves_through_inspect() {
    let inspections = HashMap::from([
        ("b".to_string(), inspection("b", "10.0.0.2")),
        ("broken".to_string(), inspection("broken", "not-an-ip")),
    ]);
    let docker = FakeDocker::start(vec![], inspections).await;
    let lister = DockerLister::new(&docker.url(), TIMEOUT).unwrap();

    assert_eq!(lister.inspect_address("b").await, Ok(ip(2)));

    let missing = lister.inspect_address("gone").await.unwrap_err();
    assert!(matches!(missing, ListError::Status { status: 404, .. }));

    let broken = lister.inspect_address("broken").await.unwrap_err();
    assert!(matches!(broken, ListError::InvalidAddress { .. }));
}

#[tokio::test]
async fn docker_lister_reports_dead_daemon() {
    let addr = closed_port().await;
    let lister = DockerLister::new(&format!("tcp://{addr}"), TIMEOUT).unwrap();

    assert!(matches!(lister.ping().await, Err(ListError::Request { .. })));
    assert!(matches!(lister.list().await, Err(ListError::Request { .. })));
}

#[tokio::test]
async fn http_sink_treats_error_status_as_failure() {
    let collector = FakeCollector::start(1).await;
    let sink = HttpSink::new(collector.url(), TIMEOUT).unwrap();

    let first = sink.submit(body()).await.unwrap_err();
    assert!(matches!(first, SinkError::Status { status: 503, .. }));

    sink.submit(body()).await.unwrap();
    assert_eq!(collector.requests(), 2);
    assert_eq!(collector.payload_for("a").name, "web");
}

#[tokio::test]
async fn http_sink_reports_refused_connection() {
    let addr = closed_port().await;
    let sink = HttpSink::new(format!("http://{addr}/api/ping-results"), TIMEOUT).unwrap();

    let err = sink.submit(body()).await.unwrap_err();
    assert!(matches!(err, SinkError::Transport { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn docker_lister_talks_to_the_daemon_socket() {
    use crate::utils::FakeDockerSocket;

    let inspections = HashMap::from([("b".to_string(), inspection("b", "10.0.0.2"))]);
    let docker = FakeDockerSocket::start(
        vec![
            container("a", "web", Some("10.0.0.1")),
            container("b", "worker", None),
        ],
        inspections,
    )
    .await;
    let lister = DockerLister::new(&docker.url(), TIMEOUT).unwrap();
    assert_eq!(lister.endpoint(), docker.url());

    lister.ping().await.unwrap();

    let targets = lister.list().await.unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].name, "web");
    assert_eq!(targets[0].address, Some(ip(1)));

    assert_eq!(lister.inspect_address("b").await, Ok(ip(2)));
    let missing = lister.inspect_address("gone").await.unwrap_err();
    assert!(matches!(missing, ListError::Status { status: 404, .. }));
}
