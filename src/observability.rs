//! Structured logging shared by the engine and the persistence gateways.

pub mod logging;

use crate::config::LogConfig;
use logging::{JsonLineLogger, LogHandle, LogSink, LoggingError};

/// Builds the process logger described by `config`.
pub fn init_logging(config: &LogConfig) -> Result<LogHandle, LoggingError> {
    let sink = match &config.path {
        Some(path) => LogSink::append_file(path)?,
        None => LogSink::Stderr,
    };
    Ok(LogHandle::new(JsonLineLogger::new(config.level, sink)))
}
