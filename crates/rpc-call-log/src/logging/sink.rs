use crate::logging::constants::JSON_LOG_TARGET;
use crate::logging::types::{LogLevel, LogRecord};
use std::sync::Arc;

// =============================================================================
// LogSink Trait
// =============================================================================

/// Destination for finished log records.
///
/// Sinks are called synchronously from call hooks, possibly from several
/// threads at once, and must not block. Where the record ends up is the
/// sink's business; the interceptor never retries an emit.
pub trait LogSink: Send + Sync {
    /// Emits one record at the given level.
    fn emit(&self, record: &LogRecord, level: LogLevel);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, record: &LogRecord, level: LogLevel) {
        (**self).emit(record, level);
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn emit(&self, record: &LogRecord, level: LogLevel) {
        (**self).emit(record, level);
    }
}

/// Emits a `tracing` event at a runtime-selected level.
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)+),
            LogLevel::Debug => tracing::debug!($($arg)+),
            LogLevel::Info => tracing::info!($($arg)+),
            LogLevel::Warn => tracing::warn!($($arg)+),
            LogLevel::Error => tracing::error!($($arg)+),
            LogLevel::Off => {}
        }
    };
}

// =============================================================================
// TracingSink
// =============================================================================

/// Default sink that emits each record as a `tracing` event with
/// structured fields.
///
/// Payloads and metadata are rendered as compact JSON strings.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord, level: LogLevel) {
        let correlation_id = record.info.correlation_id.as_deref().unwrap_or("");
        let path = &record.info.path;
        let call_type = record.info.call_type;
        let event = record.event();
        let took_ms = record.took_ms();
        let direction = record.direction().map(|d| d.to_string());
        let error_code = record.error().map(|e| e.code.as_str());
        let error_message = match &record.kind {
            crate::logging::RecordKind::Failure { error, .. } => Some(error.as_str()),
            _ => record.error().map(|e| e.message.as_str()),
        };
        let payload = record.payload().map(|p| p.to_string());
        let metadata = record
            .metadata()
            .and_then(|m| serde_json::to_string(m).ok());

        event_at!(
            level,
            correlation_id = %correlation_id,
            path = %path,
            call_type = %call_type,
            event = %event,
            took_ms = ?took_ms,
            direction = ?direction,
            error_code = ?error_code,
            error_message = ?error_message,
            payload = ?payload,
            metadata = ?metadata,
            "{}",
            record.message
        );
    }
}

// =============================================================================
// JsonSink
// =============================================================================

/// A sink that emits the whole record as one JSON document.
///
/// Useful for log aggregation systems that expect one JSON object per line.
#[derive(Debug, Clone, Default)]
pub struct JsonSink;

impl LogSink for JsonSink {
    fn emit(&self, record: &LogRecord, level: LogLevel) {
        match serde_json::to_string(record) {
            Ok(json) => event_at!(level, target: JSON_LOG_TARGET, "{}", json),
            Err(e) => tracing::error!(
                target: JSON_LOG_TARGET,
                path = %record.info.path,
                error = %e,
                "Failed to serialize call log record"
            ),
        }
    }
}

// =============================================================================
// MockSink (for testing)
// =============================================================================

#[cfg(test)]
use std::sync::Mutex;

/// A mock sink that captures records for testing.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    records: Arc<Mutex<Vec<(LogRecord, LogLevel)>>>,
}

#[cfg(test)]
impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured records with their levels.
    pub fn entries(&self) -> Vec<(LogRecord, LogLevel)> {
        self.records.lock().unwrap().clone()
    }

    /// Returns all captured records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.entries().into_iter().map(|(record, _)| record).collect()
    }

    /// Returns captured records with the given event tag.
    pub fn events(&self, event: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.event() == event)
            .collect()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
impl LogSink for MockSink {
    fn emit(&self, record: &LogRecord, level: LogLevel) {
        self.records.lock().unwrap().push((record.clone(), level));
    }
}
