use anyhow::{bail, Result};

/// Normalize the comma-split port tokens into a scan-order list of TCP
/// ports (1..=65535).
///
/// Tokens that do not parse as a base-10 number in range are skipped rather
/// than treated as fatal; scanners run over noisy input. Duplicates are kept
/// and probed again in place. Only an empty token list is an error.
pub fn parse_ports(tokens: &[&str]) -> Result<Vec<u16>> {
    if tokens.is_empty() {
        bail!("empty list of ports");
    }

    let mut out: Vec<u16> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        match tok.parse::<u32>() {
            Ok(p) if (1..=65535).contains(&p) => out.push(p as u16),
            _ => tracing::debug!(token = *tok, "skipping invalid port token"),
        }
    }

    Ok(out)
}
