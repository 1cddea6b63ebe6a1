//! Constants and default values for the logging module.

/// Sentinel that replaces the value of every redacted key.
pub const DEFAULT_REDACTION_REPLACEMENT: &str = "<redacted>";

/// Default number of records a [`ChannelSink`](super::ChannelSink) buffers
/// before it starts dropping.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// `tracing` target used by the JSON sink.
pub const JSON_LOG_TARGET: &str = "rpc_call_log";

// Record message texts.
pub const MSG_CALL_STARTED: &str = "Start handling call";
pub const MSG_CALL_FINISHED: &str = "Call handling finished";
pub const MSG_CALL_FAILED: &str = "Call handling failed";
pub const MSG_STREAM_RECEIVED: &str = "Received message from peer via stream";
pub const MSG_STREAM_SENT: &str = "Sent message to peer via stream";
pub const MSG_INBOUND_ENDED: &str = "Inbound stream ended";
pub const MSG_INBOUND_FAILED: &str = "Inbound stream failed";
pub const MSG_OUTBOUND_ENDED: &str = "Outbound stream ended";
pub const MSG_OUTBOUND_FAILED: &str = "Outbound stream failed";
pub const MSG_LOGGING_FAILED: &str = "Call logging failed";
