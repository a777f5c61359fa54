use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use eagle::logging::Logger;
use eagle::ports;
use eagle::scanner;
use eagle::targets;
use eagle::types::ScanConfig;

/// eagle — concurrent TCP connect scanner.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "eagle",
    version,
    about = "Concurrent TCP connect scanner for single hosts, CIDR ranges and host lists.",
    long_about = None
)]
struct Cli {
    /// Single host or CIDR address to scan.
    #[arg(long)]
    ip: Option<String>,

    /// Input file containing a list of hosts to scan, one host or CIDR per
    /// line. Takes precedence over --ip when both are given.
    #[arg(long = "iL")]
    input_list: Option<PathBuf>,

    /// File to save the results.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Only output open ports.
    #[arg(long)]
    open: bool,

    /// Ports to scan (comma separated).
    #[arg(short = 'p')]
    ports: Option<String>,

    /// Number of hosts to scan concurrently.
    #[arg(long, default_value_t = 25)]
    threads: usize,

    /// Timeout in seconds for each scanned port.
    #[arg(long, default_value_t = 3)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.ip.is_none() && cli.input_list.is_none() {
        usage_error("You must provide either a host to scan or list of hosts");
    }
    let Some(ports_arg) = cli.ports.as_deref() else {
        usage_error("You must provide port(s) to scan");
    };

    let tokens: Vec<&str> = ports_arg.split(',').collect();
    let ports = match ports::parse_ports(&tokens) {
        Ok(ports) => ports,
        Err(_) => {
            println!("Error parsing list of ports");
            std::process::exit(1);
        }
    };

    let hosts = if let Some(path) = &cli.input_list {
        match targets::load_targets(path) {
            Ok(hosts) => hosts,
            Err(err) => {
                println!("Error reading input file: {err:#}");
                std::process::exit(1);
            }
        }
    } else {
        targets::expand_target(cli.ip.as_deref().unwrap_or_default())
    };

    let config = Arc::new(ScanConfig {
        ports,
        timeout: Duration::from_secs(cli.timeout),
        threads: cli.threads,
        only_open: cli.open,
        output: cli.output,
    });
    let logger = Arc::new(Logger::new(config.output.clone()));

    logger.start().await;
    let open_ports = scanner::scan_hosts(hosts, config, logger.clone()).await?;
    logger.stop().await;

    println!("Number of open ports: {open_ports}");

    Ok(())
}

/// Print usage plus a message to stdout and exit with status 1, the contract
/// for misused invocations.
fn usage_error(message: &str) -> ! {
    let mut cmd = Cli::command();
    let _ = cmd.print_help();
    println!("\n{message}");
    std::process::exit(1);
}
