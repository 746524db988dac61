use std::net::{IpAddr, Ipv4Addr};

/// Round-trip summary phrasings emitted by iputils, BSD/macOS and BusyBox ping.
const SUMMARY_PREFIXES: &[&str] = &[
    "rtt min/avg/max/mdev",
    "round-trip min/avg/max/stddev",
    "round-trip min/avg/max",
    "rtt min/avg/max",
];

pub fn parse_ping_average(text: &str) -> Option<f64> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if let Some(value) = lines
        .iter()
        .filter(|line| is_summary_line(line))
        .find_map(|line| average_field(line))
    {
        return Some(value);
    }

    lines
        .iter()
        .rev()
        .filter(|line| line.contains('=') && line.contains('/'))
        .find_map(|line| average_field(line))
}

fn is_summary_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    SUMMARY_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn average_field(line: &str) -> Option<f64> {
    let (_, stats) = line.split_once('=')?;
    let token = stats.split_whitespace().next()?;
    let avg = token.split('/').nth(1)?;
    let value: f64 = avg.trim_end_matches("ms").parse().ok()?;

    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

pub fn parse_ip_route(text: &str) -> Option<String> {
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.first() != Some(&"default") {
            continue;
        }

        let candidate = tokens
            .iter()
            .position(|token| *token == "via")
            .and_then(|idx| tokens.get(idx + 1));

        if let Some(candidate) = candidate {
            if candidate.parse::<IpAddr>().is_ok() {
                return Some(candidate.to_string());
            }
        }
    }

    None
}

/// Decodes the default route's gateway from `/proc/net/route`.
pub fn parse_proc_net_route(text: &str) -> Option<String> {
    for line in text.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 || cols[0] == "Iface" {
            continue;
        }

        if cols[1] != "00000000" {
            continue;
        }

        let gateway = match u32::from_str_radix(cols[2], 16) {
            Ok(value) if value != 0 => value,
            _ => continue,
        };

        return Some(Ipv4Addr::from(gateway.to_le_bytes()).to_string());
    }

    None
}
