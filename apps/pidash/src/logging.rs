use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Append-only debug log that silently drops anything it cannot write.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    file: Option<Arc<Mutex<File>>>,
}

impl DebugLog {
    pub fn open(path: &Path) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
            .map(|file| Arc::new(Mutex::new(file)));
        Self { file }
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

pub struct DebugLogWriter {
    file: Option<Arc<Mutex<File>>>,
}

impl Write for DebugLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(buf);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DebugLog {
    type Writer = DebugLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DebugLogWriter {
            file: self.file.clone(),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init(path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(DebugLog::open(path))
        .try_init();
}
