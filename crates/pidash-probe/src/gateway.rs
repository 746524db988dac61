use crate::parser::{parse_ip_route, parse_proc_net_route};
use crate::runner::output_with_deadline;
use anyhow::{anyhow, Context, Result};
use pidash_model::{Target, PUBLIC_RESOLVER};
use std::fs;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

const ROUTE_TABLE_PATH: &str = "/proc/net/route";
const ROUTE_COMMAND_DEADLINE: Duration = Duration::from_secs(5);

pub trait RouteSource {
    fn route_command(&self) -> Result<String>;
    fn route_table(&self) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRouteSource;

impl RouteSource for SystemRouteSource {
    fn route_command(&self) -> Result<String> {
        let mut command = Command::new("ip");
        command.args(["route", "show", "default"]);
        let output = output_with_deadline(command, ROUTE_COMMAND_DEADLINE)?;
        if !output.status.success() {
            return Err(anyhow!("ip route exited with {}", output.status));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn route_table(&self) -> Result<String> {
        fs::read_to_string(ROUTE_TABLE_PATH)
            .with_context(|| format!("failed to read {ROUTE_TABLE_PATH}"))
    }
}

pub fn resolve_default_gateway<S: RouteSource + ?Sized>(source: &S) -> Option<String> {
    match source.route_command() {
        Ok(text) => {
            if let Some(address) = parse_ip_route(&text) {
                return Some(address);
            }
            debug!("ip route output had no default route");
        }
        Err(err) => debug!("route command unavailable: {err:#}"),
    }

    match source.route_table() {
        Ok(text) => {
            let found = parse_proc_net_route(&text);
            if found.is_none() {
                debug!("kernel route table had no default route");
            }
            found
        }
        Err(err) => {
            debug!("route table unavailable: {err:#}");
            None
        }
    }
}

pub fn resolve_targets<S: RouteSource + ?Sized>(source: &S) -> Vec<Target> {
    let mut targets = Vec::with_capacity(2);

    match resolve_default_gateway(source) {
        Some(address) => {
            info!(%address, "default gateway resolved");
            targets.push(Target::new("gw", address));
        }
        None => info!("no default gateway found; skipping gateway probe"),
    }

    targets.push(Target::new("dns", PUBLIC_RESOLVER));
    targets
}
