use anyhow::{anyhow, bail, Context, Result};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const CHILD_POLL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub count: u32,
    pub timeout_secs: u64,
    pub interval: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            count: 3,
            timeout_secs: 1,
            interval: Duration::from_secs(5),
        }
    }
}

impl ProbeSettings {
    /// Hard limit on one ping invocation: `count * (timeout + 1) + 5` seconds.
    pub fn deadline(&self) -> Duration {
        let per_sample = self.timeout_secs.saturating_add(1);
        Duration::from_secs(u64::from(self.count).saturating_mul(per_sample) + 5)
    }
}

pub trait PingRunner: Send + Sync {
    fn ping(&self, address: &str, settings: &ProbeSettings) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPingRunner;

impl PingRunner for SystemPingRunner {
    fn ping(&self, address: &str, settings: &ProbeSettings) -> Result<String> {
        run_ping(address, settings)
    }
}

pub fn run_ping(address: &str, settings: &ProbeSettings) -> Result<String> {
    // BSD ping takes the per-reply wait in milliseconds.
    let wait = if cfg!(target_os = "macos") {
        (settings.timeout_secs * 1000).to_string()
    } else {
        settings.timeout_secs.max(1).to_string()
    };

    let mut command = Command::new("ping");
    command
        .arg("-n")
        .arg("-c")
        .arg(settings.count.max(1).to_string())
        .arg("-W")
        .arg(wait)
        .arg(address);

    let output = output_with_deadline(command, settings.deadline())
        .with_context(|| format!("ping failed for {address}"))?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "ping failed for {address} (status: {}): {}{}",
            output.status,
            stderr.trim(),
            stdout.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Runs `command` to completion, killing it once `deadline` has passed.
pub fn output_with_deadline(mut command: Command, deadline: Duration) -> Result<Output> {
    let program = command.get_program().to_string_lossy().to_string();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(_)) => {
                return child
                    .wait_with_output()
                    .with_context(|| format!("failed to collect {program} output"));
            }
            Ok(None) if started.elapsed() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                bail!("{program} timed out after {:.1}s", deadline.as_secs_f64());
            }
            Ok(None) => thread::sleep(CHILD_POLL),
            Err(err) => {
                let _ = child.kill();
                return Err(anyhow!("failed to wait for {program}: {err}"));
            }
        }
    }
}
