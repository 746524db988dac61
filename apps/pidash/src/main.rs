mod config;
mod display;
mod logging;
mod scheduler;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, Config};
use pidash_model::ShutdownSignal;
use pidash_probe::{resolve_targets, spawn_probers, LatencyTable, SystemPingRunner, SystemRouteSource};
use pidash_weather::{spawn_refresher, ReqwestHttp, SummaryCache, WeatherSource, DEFAULT_TIMEOUT};
use scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use telemetry::SysinfoSampler;
use tracing::{error, info, warn};

const WEATHER_POLL: Duration = Duration::from_secs(1);

fn main() {
    if let Err(err) = run() {
        error!("fatal: {err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::load(Cli::parse())?;
    logging::init(&config.debug_log);
    info!(display = ?config.display, "pidash starting");

    let shutdown = Arc::new(ShutdownSignal::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.trigger())
            .context("failed to install termination handler")?;
    }

    let display = display::open(&config).context("failed to open display")?;
    let telemetry = SysinfoSampler::new(config.probe.interval)
        .context("failed to initialise system metrics")?;

    let targets = resolve_targets(&SystemRouteSource);
    let latencies = Arc::new(LatencyTable::new(&targets));
    // Probers hold no resources worth releasing and are not joined on exit.
    let _probers = spawn_probers(
        &targets,
        Arc::new(SystemPingRunner),
        Arc::clone(&latencies),
        &config.probe,
        Arc::clone(&shutdown),
    );

    let summary = Arc::new(SummaryCache::new(config.weather_ttl));
    let source = WeatherSource::new(ReqwestHttp::new(DEFAULT_TIMEOUT)?, &config.weather_location);
    if let Err(err) = spawn_refresher(
        Arc::clone(&summary),
        Arc::new(source),
        WEATHER_POLL,
        Arc::clone(&shutdown),
    ) {
        warn!("weather disabled: {err:#}");
    }

    let mut scheduler = Scheduler::new(
        display,
        Box::new(telemetry),
        latencies,
        summary,
        config.marquee,
    );
    scheduler.run(config.frame_interval, config.frames, &shutdown);

    shutdown.trigger();
    info!("pidash stopped");
    Ok(())
}
