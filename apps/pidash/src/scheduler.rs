use crate::telemetry::Telemetry;
use anyhow::Result;
use chrono::{DateTime, Local};
use pidash_model::{ShutdownSignal, SystemSnapshot};
use pidash_probe::LatencyTable;
use pidash_render::{render_frame, row_y, Display, Frame, Marquee, MarqueeSettings, Measurer};
use pidash_weather::SummaryCache;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const ROWS: usize = 4;
const UNKNOWN: &str = "N/A";

pub fn top_line(wall: &DateTime<Local>, summary: &str) -> String {
    format!("{} | {}", wall.format("%a %d %b %H:%M"), summary)
}

fn percent(value: Option<f32>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| format!("{v:.0}%"))
}

pub fn cpu_line(snapshot: &SystemSnapshot) -> String {
    let temp = snapshot
        .cpu_temp_c
        .map_or_else(|| UNKNOWN.to_string(), |t| format!("{t:.1}C"));
    format!("CPU {} {}", percent(snapshot.cpu_percent), temp)
}

pub fn ram_line(snapshot: &SystemSnapshot) -> String {
    let amounts = match (snapshot.ram_used_gb, snapshot.ram_total_gb) {
        (Some(used), Some(total)) => format!("{used:.1}/{total:.1}G"),
        _ => UNKNOWN.to_string(),
    };
    format!("RAM {} {}", percent(snapshot.ram_percent), amounts)
}

pub fn network_line(
    latencies: &[(String, Option<f64>)],
    address: Option<&str>,
    hostname: Option<&str>,
) -> String {
    let mut parts: Vec<String> = latencies
        .iter()
        .map(|(name, latency)| match latency {
            Some(ms) => format!("{} {ms:.0}ms", name.to_uppercase()),
            None => format!("{} -- ms", name.to_uppercase()),
        })
        .collect();
    parts.push(format!("IP {}", address.unwrap_or(UNKNOWN)));
    parts.push(hostname.unwrap_or(UNKNOWN).to_string());
    parts.join(" | ")
}

/// Composes and commits one frame per tick from the shared monitor state.
pub struct Scheduler {
    display: Box<dyn Display>,
    telemetry: Box<dyn Telemetry>,
    latencies: Arc<LatencyTable>,
    summary: Arc<SummaryCache>,
    measurer: Measurer,
    marquee: MarqueeSettings,
    top: Marquee,
    bottom: Marquee,
    last_tick: Option<Instant>,
}

impl Scheduler {
    pub fn new(
        display: Box<dyn Display>,
        telemetry: Box<dyn Telemetry>,
        latencies: Arc<LatencyTable>,
        summary: Arc<SummaryCache>,
        marquee: MarqueeSettings,
    ) -> Self {
        let measurer = Measurer::probe(display.metrics(), display.width());
        info!(strategy = ?measurer.strategy(), max_chars = measurer.max_chars(), "text measurement selected");

        Self {
            display,
            telemetry,
            latencies,
            summary,
            measurer,
            marquee,
            top: Marquee::new(),
            bottom: Marquee::new(),
            last_tick: None,
        }
    }

    pub fn compose(&mut self, now: Instant, wall: &DateTime<Local>) -> Frame {
        let elapsed_s = self
            .last_tick
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last_tick = Some(now);

        let snapshot = self.telemetry.sample();
        let top = top_line(wall, &self.summary.current());
        let bottom = network_line(
            &self.latencies.snapshot(),
            self.telemetry.local_address().as_deref(),
            self.telemetry.hostname().as_deref(),
        );

        let height = self.display.height();
        let metrics = self.display.metrics();
        let mut frame = Frame::new();

        let spans = self
            .top
            .step(&self.measurer, metrics, &top, elapsed_s, &self.marquee);
        frame.push_spans(row_y(0, ROWS, height), spans);

        let cpu = cpu_line(&snapshot);
        frame.push(0, row_y(1, ROWS, height), self.measurer.fit(metrics, &cpu));
        let ram = ram_line(&snapshot);
        frame.push(0, row_y(2, ROWS, height), self.measurer.fit(metrics, &ram));

        let spans = self
            .bottom
            .step(&self.measurer, metrics, &bottom, elapsed_s, &self.marquee);
        frame.push_spans(row_y(3, ROWS, height), spans);

        frame
    }

    pub fn tick(&mut self, now: Instant, wall: &DateTime<Local>) -> Result<()> {
        let frame = self.compose(now, wall);
        render_frame(self.display.as_mut(), &frame)
    }

    /// Renders until `shutdown` fires or `frames` frames have been drawn.
    pub fn run(&mut self, frame_interval: Duration, frames: Option<u64>, shutdown: &ShutdownSignal) {
        let mut rendered: u64 = 0;
        while !shutdown.is_triggered() {
            if let Err(err) = self.tick(Instant::now(), &Local::now()) {
                warn!("frame dropped: {err:#}");
            }
            rendered += 1;

            if frames.is_some_and(|limit| rendered >= limit) {
                break;
            }
            if shutdown.wait(frame_interval) {
                break;
            }
        }
        info!(rendered, "render loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use chrono::TimeZone;
    use pidash_model::Target;
    use pidash_probe::{spawn_probers, PingRunner, ProbeSettings};
    use pidash_render::{DrawText, FontMetrics};
    use pidash_weather::{SummarySource, PLACEHOLDER};
    use std::sync::Mutex;
    use std::thread;

    struct Mono6;

    impl FontMetrics for Mono6 {
        fn glyph_advance(&self) -> Option<u32> {
            Some(6)
        }
    }

    #[derive(Clone, Default)]
    struct FakeDisplay {
        committed: Arc<Mutex<Vec<Vec<DrawText>>>>,
        pending: Vec<DrawText>,
    }

    impl Display for FakeDisplay {
        fn width(&self) -> u32 {
            128
        }
        fn height(&self) -> u32 {
            64
        }
        fn metrics(&self) -> &dyn FontMetrics {
            &Mono6
        }
        fn clear(&mut self) {
            self.pending.clear();
        }
        fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
            self.pending.push(DrawText {
                x,
                y,
                text: text.to_string(),
            });
            Ok(())
        }
        fn commit(&mut self) -> Result<()> {
            self.committed
                .lock()
                .unwrap()
                .push(std::mem::take(&mut self.pending));
            Ok(())
        }
    }

    struct FakeTelemetry(SystemSnapshot);

    impl Telemetry for FakeTelemetry {
        fn sample(&mut self) -> SystemSnapshot {
            self.0
        }
        fn local_address(&mut self) -> Option<String> {
            Some("192.168.1.42".to_string())
        }
        fn hostname(&self) -> Option<String> {
            Some("pi".to_string())
        }
    }

    fn snapshot() -> SystemSnapshot {
        SystemSnapshot {
            cpu_percent: Some(12.4),
            ram_percent: Some(34.0),
            ram_used_gb: Some(1.31),
            ram_total_gb: Some(3.84),
            cpu_temp_c: Some(48.3),
        }
    }

    fn wall() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap()
    }

    fn scheduler(
        latencies: Arc<LatencyTable>,
        summary: Arc<SummaryCache>,
    ) -> (Scheduler, Arc<Mutex<Vec<Vec<DrawText>>>>) {
        let display = FakeDisplay::default();
        let committed = Arc::clone(&display.committed);
        let scheduler = Scheduler::new(
            Box::new(display),
            Box::new(FakeTelemetry(snapshot())),
            latencies,
            summary,
            MarqueeSettings::default(),
        );
        (scheduler, committed)
    }

    fn row(frame: &[DrawText], y: i32) -> Vec<&DrawText> {
        frame.iter().filter(|draw| draw.y == y).collect()
    }

    #[test]
    fn status_lines_format_known_and_unknown_values() {
        assert_eq!(cpu_line(&snapshot()), "CPU 12% 48.3C");
        assert_eq!(ram_line(&snapshot()), "RAM 34% 1.3/3.8G");
        assert_eq!(cpu_line(&SystemSnapshot::default()), "CPU N/A N/A");
        assert_eq!(ram_line(&SystemSnapshot::default()), "RAM N/A N/A");
        assert_eq!(network_line(&[], None, None), "IP N/A | N/A");
    }

    #[test]
    fn four_rows_are_committed() {
        let latencies = Arc::new(LatencyTable::new(&[Target::new("dns", "208.67.222.222")]));
        let summary = Arc::new(SummaryCache::new(Duration::from_secs(900)));
        let (mut scheduler, committed) = scheduler(latencies, summary);

        scheduler.tick(Instant::now(), &wall()).unwrap();

        let frames = committed.lock().unwrap();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];

        let top = row(frame, 0);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].text, format!("Wed 14 Oct 09:30 | {PLACEHOLDER}"));

        let cpu = row(frame, 16);
        assert_eq!(cpu.len(), 1);
        assert_eq!(cpu[0].text, "CPU 12% 48.3C");
        assert_eq!(row(frame, 32)[0].text, "RAM 34% 1.3/3.8G");
        assert!(!row(frame, 48).is_empty());
    }

    #[test]
    fn marquee_rows_scroll_independently() {
        let latencies = Arc::new(LatencyTable::new(&[]));
        let summary = Arc::new(SummaryCache::new(Duration::from_secs(900)));
        let (mut scheduler, committed) = scheduler(latencies, summary);

        let t0 = Instant::now();
        scheduler.tick(t0, &wall()).unwrap();
        scheduler.tick(t0 + Duration::from_secs(1), &wall()).unwrap();
        scheduler.tick(t0 + Duration::from_secs(2), &wall()).unwrap();

        let frames = committed.lock().unwrap();
        // The top line is wide and scrolls at 30 px/s.
        assert_eq!(row(&frames[0], 0)[0].x, 0);
        assert_eq!(row(&frames[1], 0)[0].x, 0);
        assert_eq!(row(&frames[2], 0)[0].x, -30);
        // "IP 192.168.1.42 | pi" fits and stays put.
        let bottom = row(&frames[2], 48);
        assert_eq!(bottom.len(), 1);
        assert_eq!(bottom[0].x, 0);
        assert_eq!(bottom[0].text, "IP 192.168.1.42 | pi");
    }

    struct FakePing;

    impl PingRunner for FakePing {
        fn ping(&self, address: &str, _settings: &ProbeSettings) -> Result<String> {
            match address {
                "208.67.222.222" => Ok("rtt min/avg/max/mdev = 11.2/12.0/12.8/0.4 ms\n".to_string()),
                _ => Err(anyhow!("Destination Host Unreachable")),
            }
        }
    }

    #[test]
    fn unreachable_gateway_and_reachable_resolver() {
        let targets = vec![
            Target::new("gw", "192.168.1.1"),
            Target::new("dns", "208.67.222.222"),
        ];
        let latencies = Arc::new(LatencyTable::new(&targets));
        let shutdown = Arc::new(ShutdownSignal::new());
        let handles = spawn_probers(
            &targets,
            Arc::new(FakePing),
            Arc::clone(&latencies),
            &ProbeSettings {
                count: 1,
                timeout_secs: 1,
                interval: Duration::from_millis(10),
            },
            Arc::clone(&shutdown),
        );

        let started = Instant::now();
        while latencies.get("dns").is_none() {
            assert!(started.elapsed() < Duration::from_secs(5));
            thread::sleep(Duration::from_millis(5));
        }
        shutdown.trigger();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = Arc::new(SummaryCache::new(Duration::from_secs(900)));
        let (mut scheduler, committed) = scheduler(latencies, summary);
        scheduler.tick(Instant::now(), &wall()).unwrap();

        let frames = committed.lock().unwrap();
        let bottom = row(&frames[0], 48);
        assert_eq!(bottom[0].text, "GW -- ms | DNS 12ms | IP 192.168.1.42 | pi");
    }

    struct FlakySource(Mutex<u32>);

    impl SummarySource for FlakySource {
        fn fetch_summary(&self) -> Result<String> {
            let mut calls = self.0.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                Err(anyhow!("connection refused"))
            } else {
                Ok("9C Clear | Hum 60%".to_string())
            }
        }
    }

    #[test]
    fn top_line_picks_up_summary_after_recovery() {
        let ttl = Duration::from_secs(900);
        let latencies = Arc::new(LatencyTable::new(&[]));
        let summary = Arc::new(SummaryCache::new(ttl));
        let source = FlakySource(Mutex::new(0));
        let (mut scheduler, committed) = scheduler(latencies, Arc::clone(&summary));

        let t0 = Instant::now();
        assert_eq!(summary.get_summary_at(&source, t0), PLACEHOLDER);
        scheduler.tick(t0, &wall()).unwrap();

        summary.get_summary_at(&source, t0 + ttl);
        scheduler.tick(t0 + ttl, &wall()).unwrap();

        let frames = committed.lock().unwrap();
        assert!(row(&frames[0], 0)[0].text.ends_with(PLACEHOLDER));
        assert!(row(&frames[1], 0)[0].text.ends_with("9C Clear | Hum 60%"));
    }

    #[test]
    fn run_stops_after_frame_limit() {
        let latencies = Arc::new(LatencyTable::new(&[]));
        let summary = Arc::new(SummaryCache::new(Duration::from_secs(900)));
        let (mut scheduler, committed) = scheduler(latencies, summary);

        scheduler.run(Duration::from_millis(1), Some(3), &ShutdownSignal::new());
        assert_eq!(committed.lock().unwrap().len(), 3);
    }

    #[test]
    fn run_exits_when_shutdown_already_requested() {
        let latencies = Arc::new(LatencyTable::new(&[]));
        let summary = Arc::new(SummaryCache::new(Duration::from_secs(900)));
        let (mut scheduler, committed) = scheduler(latencies, summary);

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        scheduler.run(Duration::from_millis(1), None, &shutdown);
        assert!(committed.lock().unwrap().is_empty());
    }
}
