use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one TCP connect attempt. Timeouts and unreachable hosts
/// collapse into `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => write!(f, "Open"),
            PortState::Closed => write!(f, "Closed"),
        }
    }
}

/// One probed (port, state) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanResult {
    pub port: u16,
    pub state: PortState,
}

/// All results for a single host, in configured port order.
#[derive(Debug, Clone)]
pub struct HostReport {
    pub hostname: String,
    pub ports: Vec<ScanResult>,
}

/// Per-run settings, built once at startup and shared read-only by every
/// worker.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Ports to probe against each host, in scan order.
    pub ports: Vec<u16>,
    /// Upper bound on each individual connect attempt.
    pub timeout: Duration,
    /// Max hosts scanned concurrently.
    pub threads: usize,
    /// Suppress `Closed` result lines.
    pub only_open: bool,
    /// Optional file receiving a copy of the result stream.
    pub output: Option<PathBuf>,
}
