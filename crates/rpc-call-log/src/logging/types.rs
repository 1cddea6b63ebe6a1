//! Core types for the logging module.
//!
//! - LogLevel: severity passed to the sink
//! - Direction: which stream a message or stream end belongs to
//! - CallInfo: fields shared by every record of one call
//! - LogRecord: one structured log line
//!
//! Records serialize flat: the shared fields, an `event` tag and the
//! event-specific fields all live at the top level of one JSON object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::constants::{
    MSG_CALL_FAILED, MSG_CALL_FINISHED, MSG_CALL_STARTED, MSG_INBOUND_ENDED, MSG_INBOUND_FAILED,
    MSG_LOGGING_FAILED, MSG_OUTBOUND_ENDED, MSG_OUTBOUND_FAILED, MSG_STREAM_RECEIVED,
    MSG_STREAM_SENT,
};
use crate::call::Metadata;
use crate::error::CallError;
use crate::shape::CallShape;

/// Log level for call records.
///
/// Levels are ordered from most verbose (Trace) to least verbose (Off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    /// Level of every call record (default).
    #[default]
    Info,
    Warn,
    /// Level of failure notices.
    Error,
    /// Logging disabled.
    Off,
}

impl LogLevel {
    /// Checks if this log level should log messages at the target level.
    ///
    /// Returns true if the target level is equal to or more severe than this level.
    pub fn should_log(&self, target: LogLevel) -> bool {
        match self {
            LogLevel::Off => false,
            LogLevel::Error => matches!(target, LogLevel::Error),
            LogLevel::Warn => matches!(target, LogLevel::Error | LogLevel::Warn),
            LogLevel::Info => matches!(target, LogLevel::Error | LogLevel::Warn | LogLevel::Info),
            LogLevel::Debug => !matches!(target, LogLevel::Trace | LogLevel::Off),
            LogLevel::Trace => target != LogLevel::Off,
        }
    }
}

/// Stream direction, seen from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to server
    In,
    /// Server to client
    Out,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

/// Fields shared by every record of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallInfo {
    /// Correlation id propagated from an earlier stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Route path of the invoked method.
    pub path: String,
    /// Shape of the call.
    pub call_type: CallShape,
}

/// Event-specific part of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RecordKind {
    /// The interceptor saw the call arrive.
    Start {
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Metadata>,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    /// The single response (or its error) was sent.
    Finish {
        took_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<CallError>,
    },
    /// One message crossed a stream.
    StreamMessage {
        direction: Direction,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    /// One stream direction terminated.
    StreamEnd {
        direction: Direction,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<CallError>,
    },
    /// The interceptor could not build part of a record.
    Failure { stage: &'static str, error: String },
}

/// A structured log record.
///
/// Built immediately before it is handed to the sink and never modified
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Human-readable message text.
    pub message: &'static str,
    #[serde(flatten)]
    pub info: CallInfo,
    #[serde(flatten)]
    pub kind: RecordKind,
}

impl LogRecord {
    pub fn start(info: CallInfo, metadata: Option<Metadata>, payload: Option<Value>) -> Self {
        Self {
            message: MSG_CALL_STARTED,
            info,
            kind: RecordKind::Start { metadata, payload },
        }
    }

    /// Finish record of a successful call.
    pub fn finished(info: CallInfo, took_ms: u64, payload: Option<Value>) -> Self {
        Self {
            message: MSG_CALL_FINISHED,
            info,
            kind: RecordKind::Finish {
                took_ms,
                payload,
                error: None,
            },
        }
    }

    /// Finish record of a failed call. Never carries a payload.
    pub fn failed(info: CallInfo, took_ms: u64, error: CallError) -> Self {
        Self {
            message: MSG_CALL_FAILED,
            info,
            kind: RecordKind::Finish {
                took_ms,
                payload: None,
                error: Some(error),
            },
        }
    }

    pub fn stream_message(info: CallInfo, direction: Direction, payload: Option<Value>) -> Self {
        let message = match direction {
            Direction::In => MSG_STREAM_RECEIVED,
            Direction::Out => MSG_STREAM_SENT,
        };
        Self {
            message,
            info,
            kind: RecordKind::StreamMessage { direction, payload },
        }
    }

    pub fn stream_end(info: CallInfo, direction: Direction, error: Option<CallError>) -> Self {
        let message = match (direction, error.is_some()) {
            (Direction::In, false) => MSG_INBOUND_ENDED,
            (Direction::In, true) => MSG_INBOUND_FAILED,
            (Direction::Out, false) => MSG_OUTBOUND_ENDED,
            (Direction::Out, true) => MSG_OUTBOUND_FAILED,
        };
        Self {
            message,
            info,
            kind: RecordKind::StreamEnd { direction, error },
        }
    }

    pub fn failure(info: CallInfo, stage: &'static str, error: impl std::fmt::Display) -> Self {
        Self {
            message: MSG_LOGGING_FAILED,
            info,
            kind: RecordKind::Failure {
                stage,
                error: error.to_string(),
            },
        }
    }

    /// Name of the event tag (`start`, `finish`, ...).
    pub fn event(&self) -> &'static str {
        match self.kind {
            RecordKind::Start { .. } => "start",
            RecordKind::Finish { .. } => "finish",
            RecordKind::StreamMessage { .. } => "stream_message",
            RecordKind::StreamEnd { .. } => "stream_end",
            RecordKind::Failure { .. } => "failure",
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match &self.kind {
            RecordKind::Start { payload, .. }
            | RecordKind::Finish { payload, .. }
            | RecordKind::StreamMessage { payload, .. } => payload.as_ref(),
            RecordKind::StreamEnd { .. } | RecordKind::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&CallError> {
        match &self.kind {
            RecordKind::Finish { error, .. } | RecordKind::StreamEnd { error, .. } => {
                error.as_ref()
            }
            _ => None,
        }
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match &self.kind {
            RecordKind::Start { metadata, .. } => metadata.as_ref(),
            _ => None,
        }
    }

    pub fn took_ms(&self) -> Option<u64> {
        match self.kind {
            RecordKind::Finish { took_ms, .. } => Some(took_ms),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self.kind {
            RecordKind::StreamMessage { direction, .. } | RecordKind::StreamEnd { direction, .. } => {
                Some(direction)
            }
            _ => None,
        }
    }

    /// Flat field map of the record, as a structured sink consumes it.
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) | Err(_) => {
                let mut fields = Map::new();
                fields.insert("message".into(), Value::from(self.message));
                fields.insert("path".into(), Value::from(self.info.path.clone()));
                fields.insert("call_type".into(), Value::from(self.info.call_type.as_str()));
                fields.insert("event".into(), Value::from(self.event()));
                fields
            }
        }
    }
}
