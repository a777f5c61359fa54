use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::{Context, Result};
use ipnet::Ipv4Net;

/// Widest prefix we will expand; `end - start` for a /16.
const MAX_CIDR_SPAN: u32 = 65536;

/// Expand one raw target line into scannable hosts.
///
/// The line is lowercased and a leading `https://` or `http://` is stripped,
/// since pasted targets often carry a scheme. A line with a `/` is treated
/// as an IPv4 CIDR and expands to its usable addresses or, when malformed,
/// to nothing. Anything else that could name a host passes through verbatim
/// for the connect call to resolve.
pub fn expand_target(line: &str) -> Vec<String> {
    let mut line = line.to_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = line.strip_prefix(scheme) {
            line = rest.to_string();
            break;
        }
    }

    if line.is_empty() {
        return Vec::new();
    }
    if line.contains('/') {
        return expand_cidr(&line);
    }
    // A bare word without a dot cannot name a remote host.
    if !line.contains('.') {
        return Vec::new();
    }

    vec![line]
}

/// Read targets from a file, one host or CIDR per line, concatenated in
/// file order.
pub fn load_targets(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("failed to open input file: {}", path.as_ref().display()))?;

    let mut hosts = Vec::new();
    for line in BufReader::new(file).lines() {
        hosts.extend(expand_target(&line?));
    }
    Ok(hosts)
}

/// Cheap shape check that gates the strict CIDR parser against arbitrary
/// input: at most 18 chars, not starting with '0', digits/dots/slash only,
/// exactly three dots and one slash.
fn looks_like_cidr(s: &str) -> bool {
    if s.len() > 18 || s.starts_with('0') {
        return false;
    }
    if !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '/') {
        return false;
    }
    s.chars().filter(|&c| c == '.').count() == 3 && s.chars().filter(|&c| c == '/').count() == 1
}

/// Expand an IPv4 CIDR into its host addresses, excluding the network and
/// broadcast addresses. Prefixes wider than a /16 are refused, and a line
/// that does not hold up as a CIDR expands to nothing.
fn expand_cidr(cidr: &str) -> Vec<String> {
    if !looks_like_cidr(cidr) {
        tracing::debug!(%cidr, "not a scannable CIDR, skipping");
        return Vec::new();
    }
    let net: Ipv4Net = match cidr.parse() {
        Ok(net) => net,
        Err(_) => {
            tracing::debug!(%cidr, "invalid CIDR address, skipping");
            return Vec::new();
        }
    };

    let start = u32::from(net.network());
    let end = u32::from(net.broadcast());
    if end - start > MAX_CIDR_SPAN {
        tracing::debug!(%cidr, "refusing to expand prefix wider than /16");
        return Vec::new();
    }
    if end - start < 2 {
        // /31 and /32 have no usable host addresses here.
        return Vec::new();
    }

    (start + 1..end)
        .map(|addr| Ipv4Addr::from(addr).to_string())
        .collect()
}
