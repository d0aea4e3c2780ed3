use crate::facility::model::VehicleCategory;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Severity levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the canonical uppercase representation.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(LoggingError::UnknownLevel(raw.to_string())),
        }
    }
}

/// Bounded in-memory line buffer; the oldest lines are dropped first.
#[derive(Debug, Clone)]
pub struct MemoryLog {
    max_lines: usize,
    lines: VecDeque<String>,
}

impl MemoryLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines: max_lines.max(1),
            lines: VecDeque::new(),
        }
    }

    /// Lines currently retained, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, line: String) {
        while self.lines.len() >= self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new(4_096)
    }
}

/// Destination for serialized log lines.
#[derive(Debug)]
pub enum LogSink {
    Memory(Arc<Mutex<MemoryLog>>),
    Stderr,
    File(File),
    Discard,
}

impl LogSink {
    /// Opens `path` in append mode, creating it if needed.
    pub fn append_file(path: &Path) -> Result<Self, LoggingError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(LoggingError::Write)?;
        Ok(LogSink::File(file))
    }

    fn write_line(&mut self, line: String) -> Result<(), LoggingError> {
        match self {
            LogSink::Memory(buffer) => {
                buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(line);
                Ok(())
            }
            LogSink::Stderr => {
                let mut stderr = io::stderr().lock();
                writeln!(stderr, "{line}").map_err(LoggingError::Write)
            }
            LogSink::File(file) => writeln!(file, "{line}").map_err(LoggingError::Write),
            LogSink::Discard => Ok(()),
        }
    }
}

/// Structured fields attached to a single log entry.
#[derive(Debug, Clone, Default)]
pub struct LogEvent<'a> {
    pub module: &'a str,
    pub event: &'a str,
    pub message: String,
    pub plate: Option<&'a str>,
    pub category: Option<VehicleCategory>,
    pub slot: Option<u32>,
}

impl<'a> LogEvent<'a> {
    pub fn new(module: &'a str, event: &'a str, message: impl Into<String>) -> Self {
        Self {
            module,
            event,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn plate(mut self, plate: &'a str) -> Self {
        self.plate = Some(plate);
        self
    }

    pub fn category(mut self, category: VehicleCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn slot(mut self, slot: u32) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// JSON-line logger with level filtering and a pluggable sink.
#[derive(Debug)]
pub struct JsonLineLogger {
    current_level: LogLevel,
    sink: LogSink,
    log_index: u64,
}

impl JsonLineLogger {
    pub fn new(level: LogLevel, sink: LogSink) -> Self {
        Self {
            current_level: level,
            sink,
            log_index: 0,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.current_level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.current_level = level;
    }

    /// Emits one JSON line stamped with the current wall-clock time.
    pub fn log(&mut self, level: LogLevel, event: &LogEvent<'_>) -> Result<(), LoggingError> {
        let ts = Utc::now().timestamp_millis().max(0) as u64;
        self.log_at(ts, level, event)
    }

    /// Emits one JSON line with an explicit timestamp.
    pub fn log_at(
        &mut self,
        ts_ms: u64,
        level: LogLevel,
        event: &LogEvent<'_>,
    ) -> Result<(), LoggingError> {
        if level < self.current_level {
            return Ok(());
        }
        self.log_index = self.log_index.saturating_add(1);
        let record = LogRecord {
            ts: ts_ms,
            level: level.as_str(),
            module: event.module,
            event: event.event,
            log_index: self.log_index,
            message: &event.message,
            plate: event.plate,
            category: event.category.map(VehicleCategory::label),
            slot: event.slot,
        };
        let line = serde_json::to_string(&record).map_err(LoggingError::Serialize)?;
        self.sink.write_line(line)
    }
}

/// Cloneable, thread-safe handle onto a shared logger.
///
/// Sink failures are swallowed: logging never changes the outcome of the
/// operation being logged.
#[derive(Debug, Clone)]
pub struct LogHandle {
    inner: Arc<Mutex<JsonLineLogger>>,
}

impl LogHandle {
    pub fn new(logger: JsonLineLogger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(logger)),
        }
    }

    /// Logger writing to a fresh in-memory buffer; returns the buffer for inspection.
    pub fn memory(level: LogLevel) -> (Self, Arc<Mutex<MemoryLog>>) {
        let buffer = Arc::new(Mutex::new(MemoryLog::default()));
        let handle = Self::new(JsonLineLogger::new(
            level,
            LogSink::Memory(Arc::clone(&buffer)),
        ));
        (handle, buffer)
    }

    /// Logger that drops every record.
    pub fn disabled() -> Self {
        Self::new(JsonLineLogger::new(LogLevel::Error, LogSink::Discard))
    }

    pub fn level(&self) -> LogLevel {
        self.lock().level()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.lock().set_level(level);
    }

    pub fn log(&self, level: LogLevel, event: LogEvent<'_>) {
        let _ = self.lock().log(level, &event);
    }

    pub fn debug(&self, event: LogEvent<'_>) {
        self.log(LogLevel::Debug, event);
    }

    pub fn info(&self, event: LogEvent<'_>) {
        self.log(LogLevel::Info, event);
    }

    pub fn warn(&self, event: LogEvent<'_>) {
        self.log(LogLevel::Warn, event);
    }

    pub fn error(&self, event: LogEvent<'_>) {
        self.log(LogLevel::Error, event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JsonLineLogger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Errors surfaced while emitting JSON-line logs.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write log record: {0}")]
    Write(#[source] io::Error),
    #[error("unknown log level {0:?}")]
    UnknownLevel(String),
}

#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    ts: u64,
    level: &'a str,
    module: &'a str,
    event: &'a str,
    log_index: u64,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    plate: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slot: Option<u32>,
}
