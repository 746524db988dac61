use crate::fetch::SummarySource;
use anyhow::{Context, Result};
use pidash_model::ShutdownSignal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Shown until the first successful fetch.
pub const PLACEHOLDER: &str = "Weather N/A";

#[derive(Debug, Default)]
struct CacheState {
    text: Option<String>,
    fetched_at: Option<Instant>,
}

#[derive(Debug)]
pub struct SummaryCache {
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn current(&self) -> String {
        self.lock()
            .text
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn get_summary<S: SummarySource + ?Sized>(&self, source: &S) -> String {
        self.get_summary_at(source, Instant::now())
    }

    /// Returns the cached text, refreshing it first when it is at least one
    /// TTL old. The attempt time is recorded even if every tier fails.
    pub fn get_summary_at<S: SummarySource + ?Sized>(&self, source: &S, now: Instant) -> String {
        if self.claim(now) {
            match source.fetch_summary() {
                Ok(text) => {
                    info!(summary = %text, "weather summary refreshed");
                    self.lock().text = Some(text);
                }
                Err(err) => warn!("weather refresh failed, keeping last summary: {err:#}"),
            }
        }
        self.current()
    }

    // The staleness check and the timestamp bump share one critical section,
    // so concurrent callers past the TTL boundary start at most one fetch.
    fn claim(&self, now: Instant) -> bool {
        let mut state = self.lock();
        let stale = state
            .fetched_at
            .map_or(true, |at| now.saturating_duration_since(at) >= self.ttl);
        if stale {
            state.fetched_at = Some(now);
        }
        stale
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn spawn_refresher<S: SummarySource + 'static>(
    cache: Arc<SummaryCache>,
    source: Arc<S>,
    poll: Duration,
    shutdown: Arc<ShutdownSignal>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("weather".to_string())
        .spawn(move || {
            while !shutdown.is_triggered() {
                cache.get_summary(source.as_ref());
                if shutdown.wait(poll) {
                    break;
                }
            }
        })
        .context("failed to spawn weather refresher")
}
