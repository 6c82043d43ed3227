//! Diagnostics sinks for board controllers
//!
//! Each controller reports through an injected [`Diagnostics`] sink under its
//! instance name (`argon_0`, `tellurium_2`, ...). [`TracingDiagnostics`]
//! forwards to `tracing`; [`RecordingDiagnostics`] keeps records in memory so
//! callers can inspect warnings.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, trace, warn, Level};

/// Receives diagnostic records from controllers
pub trait Diagnostics: Send + Sync {
    /// Handle one record from `source`
    fn record(&self, level: Level, source: &str, message: &str);
}

/// Forwards records to `tracing` with a `board` field
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, level: Level, source: &str, message: &str) {
        match level {
            Level::ERROR => error!(board = source, "{}", message),
            Level::WARN => warn!(board = source, "{}", message),
            Level::INFO => info!(board = source, "{}", message),
            Level::DEBUG => debug!(board = source, "{}", message),
            Level::TRACE => trace!(board = source, "{}", message),
        }
    }
}

/// A diagnostic record captured by [`RecordingDiagnostics`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    /// Severity
    pub level: Level,
    /// Controller instance name
    pub source: String,
    /// Message text
    pub message: String,
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl RecordingDiagnostics {
    /// Create an empty recorder
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All records so far
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.lock().clone()
    }

    /// Records at warning level or above
    pub fn warnings(&self) -> Vec<DiagnosticRecord> {
        self.lock()
            .iter()
            .filter(|r| r.level <= Level::WARN)
            .cloned()
            .collect()
    }

    /// Drop all records
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DiagnosticRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, level: Level, source: &str, message: &str) {
        self.lock().push(DiagnosticRecord {
            level,
            source: source.to_string(),
            message: message.to_string(),
        });
    }
}

/// A controller's named handle on its sink
#[derive(Clone)]
pub struct Reporter {
    name: String,
    sink: Arc<dyn Diagnostics>,
}

impl Reporter {
    /// Report as `name` into `sink`
    pub fn new(name: impl Into<String>, sink: Arc<dyn Diagnostics>) -> Self {
        Self {
            name: name.into(),
            sink,
        }
    }

    /// Instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::INFO, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::WARN, message);
    }

    fn emit(&self, level: Level, message: impl fmt::Display) {
        self.sink.record(level, &self.name, &message.to_string());
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").field("name", &self.name).finish()
    }
}
