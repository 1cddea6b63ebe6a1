//! Error types for call logging
//!
//! Two families of errors live here:
//!
//! - [`CallError`]: the RPC itself failed. The host hands it to the finish or
//!   stream-end hook and it is copied verbatim into the log record.
//! - [`CallLogError`]: the interceptor could not do its own work (payload
//!   conversion, host contract, configuration). These never reach the RPC
//!   caller; they are reported as failure notices.
//!
//! # Example
//! ```rust,ignore
//! use rpc_call_log::{CallError, StatusCode};
//!
//! let error = CallError::new(StatusCode::NotFound, "User not found");
//! let error = CallError::not_found("User not found"); // Convenience method
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::shape::CallShape;

/// Canonical RPC status codes.
///
/// When serialized, codes are converted to SCREAMING_SNAKE_CASE strings
/// (e.g., `NotFound` becomes `"NOT_FOUND"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum StatusCode {
    /// The operation was cancelled, typically by the caller
    Cancelled,
    /// Unknown error
    Unknown,
    /// The client specified an invalid argument
    InvalidArgument,
    /// The deadline expired before the operation could complete
    DeadlineExceeded,
    /// Some requested entity was not found
    NotFound,
    /// The entity the client attempted to create already exists
    AlreadyExists,
    /// The caller lacks permission
    PermissionDenied,
    /// Some resource has been exhausted
    ResourceExhausted,
    /// The system is not in a state required for the operation
    FailedPrecondition,
    /// The operation was aborted
    Aborted,
    /// The operation was attempted past the valid range
    OutOfRange,
    /// The operation is not implemented
    Unimplemented,
    /// Internal error
    Internal,
    /// The service is currently unavailable
    Unavailable,
    /// Unrecoverable data loss or corruption
    DataLoss,
    /// The request lacks valid authentication credentials
    Unauthenticated,
}

impl StatusCode {
    /// Returns the string representation of the status code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A call-level service error reported by the host.
///
/// The interceptor never inspects or rewrites it; it is attached as-is to
/// the finish or stream-end record of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct CallError {
    /// Status code
    pub code: StatusCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CallError {
    /// Create a new error with code and message.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Cancelled, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unavailable, message)
    }
}

/// Failures of the interceptor's own work.
///
/// None of these abort a call; they are turned into failure notices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CallLogError {
    /// A message could not be converted into a structured payload.
    #[error("payload conversion failed: {0}")]
    PayloadConversion(String),

    /// The call handle variant does not match the method's streaming flags.
    #[error("call handle is {handle} but method {path} is declared {declared}")]
    ShapeMismatch {
        path: String,
        declared: CallShape,
        handle: CallShape,
    },

    /// A route table could not be parsed.
    #[error("invalid log configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl CallLogError {
    /// Short machine-readable kind, used as the failure notice's stage.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PayloadConversion(_) => "payload_conversion",
            Self::ShapeMismatch { .. } => "shape_mismatch",
            Self::Config(_) => "config",
        }
    }
}

/// Result type for interceptor-internal operations.
pub type CallLogResult<T> = Result<T, CallLogError>;
