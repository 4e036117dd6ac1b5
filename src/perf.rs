//! Lightweight performance instrumentation.
//!
//! `--perf` prints scope timings to stderr. `--debug-log` (or the
//! `ICON_FACTORY_DEBUG_LOG` environment variable) appends pipeline events
//! such as extraction fallbacks to a file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);
/// Environment variable naming a debug log file.
pub const DEBUG_LOG_ENV: &str = "ICON_FACTORY_DEBUG_LOG";

static DEBUG_LOGGER: LazyLock<Mutex<DebugLogger>> = LazyLock::new(|| Mutex::new(DebugLogger::new()));

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        eprintln!("[perf] {}: {:.2} ms", self.name, elapsed_ms);
    }
}

#[derive(Debug)]
struct DebugLogger {
    enabled: bool,
    start: Instant,
    writer: Option<BufWriter<File>>,
}

impl DebugLogger {
    fn new() -> Self {
        Self {
            enabled: false,
            start: Instant::now(),
            writer: None,
        }
    }

    fn open(&mut self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "icon-factory debug log start")?;
        writer.flush()?;
        self.enabled = true;
        self.start = Instant::now();
        self.writer = Some(writer);
        Ok(())
    }

    fn close(&mut self) {
        self.enabled = false;
        self.writer = None;
    }
}

// A panic elsewhere while logging leaves the logger state usable.
fn debug_logger() -> MutexGuard<'static, DebugLogger> {
    DEBUG_LOGGER.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut logger = debug_logger();
    match path {
        Some(path) => logger.open(path),
        None => {
            logger.close();
            Ok(())
        }
    }
}

/// Debug log path from [`DEBUG_LOG_ENV`], if set and non-empty.
pub fn debug_log_path_from_env() -> Option<PathBuf> {
    std::env::var_os(DEBUG_LOG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn is_debug_log_enabled() -> bool {
    debug_logger().enabled
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut logger = debug_logger();
    if !logger.enabled {
        return;
    }
    let elapsed_ms = logger.start.elapsed().as_secs_f64() * 1000.0;
    if let Some(writer) = logger.writer.as_mut() {
        let _ = writeln!(
            writer,
            "[{elapsed_ms:>10.3} ms] {name}: {}",
            detail.as_ref()
        );
        let _ = writer.flush();
    }
}
