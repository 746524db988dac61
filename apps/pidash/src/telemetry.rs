use anyhow::{bail, Result};
use pidash_model::{SystemSnapshot, PUBLIC_RESOLVER};
use std::fs;
use std::net::UdpSocket;
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::{Components, CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";
const CPU_SENSOR_LABELS: &[&str] = &["cpu", "package", "core", "tctl", "tdie", "soc"];
const BYTES_PER_GIB: f32 = 1024.0 * 1024.0 * 1024.0;

/// Local machine health, queried synchronously once per frame.
pub trait Telemetry {
    fn sample(&mut self) -> SystemSnapshot;
    fn local_address(&mut self) -> Option<String>;
    fn hostname(&self) -> Option<String>;
}

/// Last value produced by a reading that is too costly or too noisy to take
/// every frame.
struct Throttled<T> {
    every: Duration,
    value: Option<T>,
    refreshed_at: Option<Instant>,
}

impl<T: Clone> Throttled<T> {
    fn new(every: Duration) -> Self {
        Self {
            every,
            value: None,
            refreshed_at: None,
        }
    }

    fn get(&mut self, now: Instant, refresh: impl FnOnce() -> Option<T>) -> Option<T> {
        let due = self
            .refreshed_at
            .map_or(true, |at| now.saturating_duration_since(at) >= self.every);
        if due {
            self.value = refresh();
            self.refreshed_at = Some(now);
        }
        self.value.clone()
    }
}

pub struct SysinfoSampler {
    system: System,
    components: Components,
    cpu: Throttled<f32>,
    address: Throttled<String>,
}

impl SysinfoSampler {
    /// Primes CPU and memory counters. Fails when the metrics source reports
    /// nothing, which is fatal at startup. The primary address is looked up
    /// again at most once per `address_refresh`.
    pub fn new(address_refresh: Duration) -> Result<Self> {
        let mut system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );

        if system.cpus().is_empty() {
            bail!("metrics source reported no cpus");
        }
        if system.total_memory() == 0 {
            bail!("metrics source reported no memory");
        }

        // Usage is computed between two refreshes.
        thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_cpu_usage();

        Ok(Self {
            system,
            components: Components::new_with_refreshed_list(),
            cpu: Throttled::new(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            address: Throttled::new(address_refresh),
        })
    }

    fn cpu_temperature(&mut self) -> Option<f32> {
        self.components.refresh();
        let from_sensors = self
            .components
            .iter()
            .find(|component| {
                let label = component.label().to_lowercase();
                CPU_SENSOR_LABELS.iter().any(|needle| label.contains(needle))
            })
            .map(|component| component.temperature())
            .filter(|temp| plausible_temperature(*temp));

        from_sensors.or_else(thermal_zone_temperature)
    }
}

impl Telemetry for SysinfoSampler {
    fn sample(&mut self) -> SystemSnapshot {
        // Usage sampled over less than the minimum interval is mostly noise.
        let system = &mut self.system;
        let cpu_percent = self.cpu.get(Instant::now(), || {
            system.refresh_cpu_usage();
            if system.cpus().is_empty() {
                None
            } else {
                Some(system.global_cpu_usage()).filter(|value| value.is_finite())
            }
        });

        self.system.refresh_memory();

        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let (ram_percent, ram_used_gb, ram_total_gb) = if total == 0 {
            (None, None, None)
        } else {
            (
                Some(used as f32 / total as f32 * 100.0),
                Some(used as f32 / BYTES_PER_GIB),
                Some(total as f32 / BYTES_PER_GIB),
            )
        };

        SystemSnapshot {
            cpu_percent,
            ram_percent,
            ram_used_gb,
            ram_total_gb,
            cpu_temp_c: self.cpu_temperature(),
        }
    }

    fn local_address(&mut self) -> Option<String> {
        self.address.get(Instant::now(), primary_address)
    }

    fn hostname(&self) -> Option<String> {
        System::host_name().filter(|name| !name.is_empty())
    }
}

fn plausible_temperature(celsius: f32) -> bool {
    celsius.is_finite() && celsius > -40.0 && celsius < 150.0
}

fn thermal_zone_temperature() -> Option<f32> {
    let raw = fs::read_to_string(THERMAL_ZONE).ok()?;
    parse_millidegrees(&raw)
}

fn parse_millidegrees(raw: &str) -> Option<f32> {
    let milli: f32 = raw.trim().parse().ok()?;
    Some(milli / 1000.0).filter(|temp| plausible_temperature(*temp))
}

/// Source address the kernel would pick for outbound traffic. Connecting a
/// UDP socket sends nothing.
fn primary_address() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect((PUBLIC_RESOLVER, 53)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_unspecified() {
        None
    } else {
        Some(ip.to_string())
    }
}
