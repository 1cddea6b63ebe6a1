//! Structured call records, route configuration, redaction and sinks
//!
//! # Architecture
//!
//! - **types**: LogLevel, Direction, CallInfo, LogRecord
//! - **config**: RouteLogConfig and LogOptions with builder pattern
//! - **constants**: defaults and record message texts
//! - **redaction**: key-based Redactor
//! - **sink**: LogSink trait with TracingSink and JsonSink
//! - **channel**: non-blocking ChannelSink and its LogDrain
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use rpc_call_log::logging::{LogOptions, PayloadCategory, RouteLogConfig};
//!
//! let options = LogOptions::new().route(
//!     "/auth.Auth/Login",
//!     RouteLogConfig::new()
//!         .redact_keys(PayloadCategory::UnaryRequest, ["password"])
//!         .omit_payload(PayloadCategory::UnaryResponse, true),
//! );
//! ```
//!
//! ## Custom Sink
//!
//! ```rust,ignore
//! let (sink, drain) = ChannelSink::new(4096);
//! tokio::spawn(drain.run(JsonSink));
//! let logger = CallLogger::with_sink(options, sink);
//! ```

mod channel;
mod config;
mod constants;
mod redaction;
mod sink;
mod types;

pub use constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_REDACTION_REPLACEMENT, JSON_LOG_TARGET, MSG_CALL_FAILED,
    MSG_CALL_FINISHED, MSG_CALL_STARTED, MSG_INBOUND_ENDED, MSG_INBOUND_FAILED,
    MSG_LOGGING_FAILED, MSG_OUTBOUND_ENDED, MSG_OUTBOUND_FAILED, MSG_STREAM_RECEIVED,
    MSG_STREAM_SENT,
};

pub use types::{CallInfo, Direction, LogLevel, LogRecord, RecordKind};

pub use config::{LogOptions, PayloadCategory, RouteLogConfig};

pub use redaction::{Redactor, redact_value};

pub use sink::{JsonSink, LogSink, TracingSink};

pub use channel::{ChannelSink, LogDrain};

#[cfg(test)]
pub use sink::MockSink;
