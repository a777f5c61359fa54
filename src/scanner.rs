use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;

use crate::logging::Logger;
use crate::types::{HostReport, PortState, ScanConfig, ScanResult};

/// Attempt one TCP connect to `host:port`, bounded by `timeout`.
///
/// A completed handshake is `Open` and the socket is dropped right away.
/// Everything else, connection refused, unreachable, unresolvable or timed
/// out, is `Closed`; the distinction is not kept. Name resolution is left to
/// the connect call.
pub async fn probe_port(host: &str, port: u16, timeout: Duration) -> ScanResult {
    let state = match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            PortState::Open
        }
        _ => PortState::Closed,
    };
    ScanResult { port, state }
}

/// Probe each port against one host, sequentially and in the given order.
///
/// Ports within a host are deliberately not parallelized: with one socket
/// per worker at a time, total in-flight connections stay bounded by the
/// worker count alone.
pub async fn scan_host(hostname: &str, ports: &[u16], timeout: Duration) -> HostReport {
    let mut report = HostReport {
        hostname: hostname.to_string(),
        ports: Vec::with_capacity(ports.len()),
    };
    for &port in ports {
        report.ports.push(probe_port(hostname, port, timeout).await);
    }
    report
}

/// Scan all hosts with at most `config.threads` host scans in flight,
/// draining each finished report into the logger.
///
/// Hosts are admitted in input order behind a semaphore; completion order is
/// whatever the network gives. Returns the total number of open ports seen.
pub async fn scan_hosts(
    hosts: Vec<String>,
    config: Arc<ScanConfig>,
    logger: Arc<Logger>,
) -> Result<u64> {
    let sem = Arc::new(Semaphore::new(config.threads.max(1)));
    let open_count = Arc::new(AtomicU64::new(0));
    let mut set = JoinSet::new();

    for host in hosts {
        let permit = sem.clone().acquire_owned().await?;
        let config = config.clone();
        let logger = logger.clone();
        let open_count = open_count.clone();

        set.spawn(async move {
            let _permit = permit; // held until the host is fully scanned

            let report = scan_host(&host, &config.ports, config.timeout).await;
            for result in &report.ports {
                if result.state == PortState::Open {
                    open_count.fetch_add(1, Ordering::Relaxed);
                }
                if config.only_open && result.state != PortState::Open {
                    continue;
                }
                logger
                    .write(&format!(
                        "{}:{} {}\n",
                        report.hostname, result.port, result.state
                    ))
                    .await;
            }
        });
    }

    while let Some(res) = set.join_next().await {
        res?;
    }

    Ok(open_count.load(Ordering::Relaxed))
}
