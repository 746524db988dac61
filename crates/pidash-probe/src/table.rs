use pidash_model::Target;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Every resolved target has exactly one entry from construction on; entries
/// are overwritten by their prober and never removed.
#[derive(Debug)]
pub struct LatencyTable {
    entries: Mutex<Vec<(String, Option<f64>)>>,
}

impl LatencyTable {
    pub fn new(targets: &[Target]) -> Self {
        let mut entries: Vec<(String, Option<f64>)> = Vec::with_capacity(targets.len());
        for target in targets {
            if !entries.iter().any(|(name, _)| *name == target.name) {
                entries.push((target.name.clone(), None));
            }
        }

        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Records the latest reading. Returns `false` for names the table does not track.
    pub fn set(&self, name: &str, latency_ms: Option<f64>) -> bool {
        let mut entries = self.lock();
        match entries.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => {
                entry.1 = latency_ms;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.lock()
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| *value)
    }

    pub fn snapshot(&self) -> Vec<(String, Option<f64>)> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, Option<f64>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
