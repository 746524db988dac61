use crate::parser::parse_ping_average;
use crate::runner::{PingRunner, ProbeSettings};
use crate::table::LatencyTable;
use anyhow::{Context, Result};
use pidash_model::{ShutdownSignal, Target};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

pub fn probe_once<R: PingRunner + ?Sized>(
    runner: &R,
    target: &Target,
    settings: &ProbeSettings,
) -> Option<f64> {
    match runner.ping(&target.address, settings) {
        Ok(report) => {
            let latency = parse_ping_average(&report);
            if latency.is_none() {
                debug!(host = %target.name, "ping report had no round-trip summary");
            }
            latency
        }
        Err(err) => {
            debug!(host = %target.name, "probe failed: {err:#}");
            None
        }
    }
}

pub fn probe_loop<R: PingRunner + ?Sized>(
    runner: &R,
    target: &Target,
    table: &LatencyTable,
    settings: &ProbeSettings,
    shutdown: &ShutdownSignal,
) {
    while !shutdown.is_triggered() {
        let latency = probe_once(runner, target, settings);
        table.set(&target.name, latency);

        if shutdown.wait(settings.interval) {
            break;
        }
    }
    debug!(host = %target.name, "prober stopped");
}

pub fn spawn_prober<R: PingRunner + 'static>(
    target: Target,
    runner: Arc<R>,
    table: Arc<LatencyTable>,
    settings: ProbeSettings,
    shutdown: Arc<ShutdownSignal>,
) -> Result<JoinHandle<()>> {
    let name = format!("probe-{}", target.name);
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || probe_loop(runner.as_ref(), &target, &table, &settings, &shutdown))
        .with_context(|| format!("failed to spawn {name}"))
}

/// Starts one prober thread per target. Targets whose thread cannot be
/// started keep their unknown entry.
pub fn spawn_probers<R: PingRunner + 'static>(
    targets: &[Target],
    runner: Arc<R>,
    table: Arc<LatencyTable>,
    settings: &ProbeSettings,
    shutdown: Arc<ShutdownSignal>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(targets.len());
    for target in targets {
        match spawn_prober(
            target.clone(),
            Arc::clone(&runner),
            Arc::clone(&table),
            settings.clone(),
            Arc::clone(&shutdown),
        ) {
            Ok(handle) => handles.push(handle),
            Err(err) => warn!("{err:#}"),
        }
    }
    handles
}
