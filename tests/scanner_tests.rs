use std::sync::Arc;
use std::time::{Duration, Instant};

use eagle::logging::Logger;
use eagle::scanner::{probe_port, scan_host, scan_hosts};
use eagle::types::{PortState, ScanConfig};
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(1);

/// Bind a loopback listener and keep it alive for the test.
async fn open_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    (listener, port)
}

/// Grab a loopback port and release it again, so connecting gets refused.
async fn closed_port() -> u16 {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}

#[tokio::test]
async fn probe_reports_open_for_listening_socket() {
    let (_listener, port) = open_port().await;
    let result = probe_port("127.0.0.1", port, TIMEOUT).await;
    assert_eq!(result.port, port);
    assert_eq!(result.state, PortState::Open);
}

#[tokio::test]
async fn probe_reports_closed_for_refused_connection() {
    let port = closed_port().await;
    let started = Instant::now();
    let result = probe_port("127.0.0.1", port, TIMEOUT).await;
    assert_eq!(result.state, PortState::Closed);
    assert!(started.elapsed() < TIMEOUT + Duration::from_secs(2));
}

#[tokio::test]
async fn probe_reports_closed_for_unresolvable_host() {
    let result = probe_port("no-such-host.invalid", 80, TIMEOUT).await;
    assert_eq!(result.state, PortState::Closed);
}

#[tokio::test]
async fn host_report_mirrors_configured_port_order() {
    let first = closed_port().await;
    let second = closed_port().await;
    let ports = vec![second, first, second];

    let report = scan_host("127.0.0.1", &ports, TIMEOUT).await;
    assert_eq!(report.hostname, "127.0.0.1");
    let probed: Vec<u16> = report.ports.iter().map(|r| r.port).collect();
    assert_eq!(probed, ports);
    assert!(report.ports.iter().all(|r| r.state == PortState::Closed));
}

#[tokio::test]
async fn dispatcher_counts_open_ports_and_logs_every_result() {
    let (_listener, open) = open_port().await;
    let closed = closed_port().await;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("results.txt");
    let config = Arc::new(ScanConfig {
        ports: vec![open, closed],
        timeout: TIMEOUT,
        threads: 4,
        only_open: false,
        output: Some(path.clone()),
    });
    let logger = Arc::new(Logger::new(config.output.clone()));

    logger.start().await;
    let hosts = vec!["127.0.0.1".to_string()];
    let open_count = scan_hosts(hosts, config, logger.clone())
        .await
        .expect("scan ok");
    logger.stop().await;

    assert_eq!(open_count, 1);

    let contents = std::fs::read_to_string(&path).expect("read results");
    assert!(contents.contains(&format!("127.0.0.1:{open} Open\n")));
    assert!(contents.contains(&format!("127.0.0.1:{closed} Closed\n")));
    // Two banners plus one line per configured port.
    assert_eq!(contents.lines().count(), 4);
}

#[tokio::test]
async fn only_open_suppresses_closed_lines_but_not_the_count() {
    let (_listener, open) = open_port().await;
    let closed = closed_port().await;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("results.txt");
    let config = Arc::new(ScanConfig {
        ports: vec![open, closed],
        timeout: TIMEOUT,
        threads: 2,
        only_open: true,
        output: Some(path.clone()),
    });
    let logger = Arc::new(Logger::new(config.output.clone()));

    logger.start().await;
    let open_count = scan_hosts(vec!["127.0.0.1".to_string()], config, logger.clone())
        .await
        .expect("scan ok");
    logger.stop().await;

    assert_eq!(open_count, 1);

    let contents = std::fs::read_to_string(&path).expect("read results");
    assert!(contents.contains(&format!("127.0.0.1:{open} Open\n")));
    assert!(!contents.contains("Closed"));
}

#[tokio::test]
async fn many_hosts_with_small_worker_bound_all_complete() {
    let (_listener, open) = open_port().await;

    let config = Arc::new(ScanConfig {
        ports: vec![open],
        timeout: TIMEOUT,
        threads: 2,
        only_open: false,
        output: None,
    });
    let logger = Arc::new(Logger::new(None));

    let hosts: Vec<String> = (0..8).map(|_| "127.0.0.1".to_string()).collect();
    let open_count = scan_hosts(hosts, config, logger).await.expect("scan ok");
    assert_eq!(open_count, 8);
}
