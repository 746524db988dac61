use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use pidash_probe::ProbeSettings;
use pidash_render::MarqueeSettings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    Oled,
    Terminal,
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "pidash",
    version,
    about = "Four-line system status readout for small monochrome displays"
)]
pub struct Cli {
    /// JSON file with defaults for any option not given on the command line or environment.
    #[arg(long, env = "PIDASH_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "PIDASH_DISPLAY", value_enum)]
    pub display: Option<DisplayKind>,

    #[arg(long, env = "PIDASH_I2C_BUS")]
    pub i2c_bus: Option<u8>,

    #[arg(long, env = "PIDASH_I2C_ADDRESS", value_parser = parse_address)]
    pub i2c_address: Option<u8>,

    #[arg(long, env = "PIDASH_PING_INTERVAL")]
    pub ping_interval_secs: Option<u64>,

    #[arg(long, env = "PIDASH_PING_COUNT")]
    pub ping_count: Option<u32>,

    #[arg(long, env = "PIDASH_PING_TIMEOUT")]
    pub ping_timeout_secs: Option<u64>,

    #[arg(long, env = "PIDASH_DEBUG_LOG")]
    pub debug_log: Option<PathBuf>,

    /// wttr.in location key; empty means the service's IP geolocation.
    #[arg(long, env = "PIDASH_WEATHER_LOCATION")]
    pub weather_location: Option<String>,

    #[arg(long, env = "PIDASH_WEATHER_TTL")]
    pub weather_ttl_secs: Option<u64>,

    /// Marquee speed in pixels per second.
    #[arg(long, env = "PIDASH_SCROLL_SPEED")]
    pub scroll_speed: Option<f32>,

    /// Pixels between the two marquee copies.
    #[arg(long, env = "PIDASH_SCROLL_GAP")]
    pub scroll_gap: Option<f32>,

    #[arg(long, env = "PIDASH_FRAME_MS")]
    pub frame_ms: Option<u64>,

    /// Render this many frames and exit.
    #[arg(long)]
    pub frames: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub display: Option<DisplayKind>,
    pub i2c_bus: Option<u8>,
    pub i2c_address: Option<u8>,
    pub ping_interval_secs: Option<u64>,
    pub ping_count: Option<u32>,
    pub ping_timeout_secs: Option<u64>,
    pub debug_log: Option<PathBuf>,
    pub weather_location: Option<String>,
    pub weather_ttl_secs: Option<u64>,
    pub scroll_speed: Option<f32>,
    pub scroll_gap: Option<f32>,
    pub frame_ms: Option<u64>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| anyhow!("failed to read config {:?}: {}", path, err))?;
        serde_json::from_str(&contents)
            .map_err(|err| anyhow!("failed to parse config {:?}: {}", path, err))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub display: DisplayKind,
    pub i2c_bus: u8,
    pub i2c_address: u8,
    pub probe: ProbeSettings,
    pub debug_log: PathBuf,
    pub weather_location: String,
    pub weather_ttl: Duration,
    pub marquee: MarqueeSettings,
    pub frame_interval: Duration,
    pub frames: Option<u64>,
}

impl Config {
    pub fn load(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let probe_defaults = ProbeSettings::default();
        let marquee_defaults = MarqueeSettings::default();

        let config = Self {
            display: cli.display.or(file.display).unwrap_or(DisplayKind::Oled),
            i2c_bus: cli.i2c_bus.or(file.i2c_bus).unwrap_or(1),
            i2c_address: cli.i2c_address.or(file.i2c_address).unwrap_or(0x3c),
            probe: ProbeSettings {
                count: cli
                    .ping_count
                    .or(file.ping_count)
                    .unwrap_or(probe_defaults.count),
                timeout_secs: cli
                    .ping_timeout_secs
                    .or(file.ping_timeout_secs)
                    .unwrap_or(probe_defaults.timeout_secs),
                interval: cli
                    .ping_interval_secs
                    .or(file.ping_interval_secs)
                    .map(Duration::from_secs)
                    .unwrap_or(probe_defaults.interval),
            },
            debug_log: cli
                .debug_log
                .or(file.debug_log)
                .unwrap_or_else(|| PathBuf::from("/tmp/pidash-debug.log")),
            weather_location: cli
                .weather_location
                .or(file.weather_location)
                .unwrap_or_default(),
            weather_ttl: Duration::from_secs(
                cli.weather_ttl_secs.or(file.weather_ttl_secs).unwrap_or(900),
            ),
            marquee: MarqueeSettings {
                speed_px_per_s: cli
                    .scroll_speed
                    .or(file.scroll_speed)
                    .unwrap_or(marquee_defaults.speed_px_per_s),
                gap_px: cli
                    .scroll_gap
                    .or(file.scroll_gap)
                    .unwrap_or(marquee_defaults.gap_px),
            },
            frame_interval: Duration::from_millis(cli.frame_ms.or(file.frame_ms).unwrap_or(50)),
            frames: cli.frames,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.probe.count == 0 {
            bail!("ping count must be at least 1");
        }
        if self.probe.timeout_secs == 0 {
            bail!("ping timeout must be at least 1 second");
        }
        if self.probe.interval.is_zero() {
            bail!("ping interval must be at least 1 second");
        }
        if self.weather_ttl.is_zero() {
            bail!("weather ttl must be at least 1 second");
        }
        if self.frame_interval.is_zero() {
            bail!("frame interval must be at least 1 ms");
        }
        if self.frame_interval >= self.probe.interval {
            bail!(
                "frame interval ({:?}) must be shorter than the ping interval ({:?})",
                self.frame_interval,
                self.probe.interval
            );
        }
        for (name, value) in [
            ("scroll speed", self.marquee.speed_px_per_s),
            ("scroll gap", self.marquee.gap_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a non-negative number, got {value}");
            }
        }
        Ok(())
    }

    pub fn i2c_path(&self) -> String {
        format!("/dev/i2c-{}", self.i2c_bus)
    }
}

fn parse_address(value: &str) -> Result<u8> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse::<u8>(),
    };
    parsed.with_context(|| format!("invalid i2c address {value:?}"))
}
