//! # RPC Call Log
//!
//! A call logging interceptor for RPC servers. It attaches to the lifecycle
//! of each call and emits structured records for call start, call
//! completion and, for streaming calls, every message and stream end.
//!
//! ## Overview
//!
//! - **Call classification**: unary, client-streaming, server-streaming or
//!   bidirectional, from the method's streaming flags
//! - **Shape-aware hooks**: only the hooks that exist for the call's shape
//!   are bound
//! - **Per-route policy**: omit metadata or payloads, or redact keys at any
//!   depth inside payloads
//! - **Error attribution**: failed calls and failed streams carry the error
//!   and elapsed time, never a payload
//!
//! ## Architecture
//!
//! ```text
//!   host call ──► CallLogger::intercept ──► next stage of the host chain
//!                   │  classify shape
//!                   │  convert + redact request
//!                   │  bind hooks for the shape
//!                   │  emit start record
//!                   ▼
//!   host events ──► hooks ──► pass-through first, then LogRecord ──► LogSink
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rpc_call_log::prelude::*;
//!
//! let options = LogOptions::default_options().route(
//!     "/auth.Auth/Login",
//!     RouteLogConfig::new().redact_keys(PayloadCategory::UnaryRequest, ["password"]),
//! );
//! let logger = CallLogger::new(options);
//!
//! // For every call the host receives:
//! logger.intercept(ServiceCall::Unary(&mut call), || run_handler());
//! ```
//!
//! Hosts implement the shape traits in [`call`] for their call objects,
//! usually by embedding a [`CallHooks`] registry.

pub mod call;
mod context;
mod error;
mod hooks;
mod interceptor;
pub mod logging;
mod shape;

#[cfg(test)]
mod tests;

// Public API
pub use call::{
    BidiStreamCall, Call, ClientStreamCall, InboundHooks, Message, MessageHook, Metadata,
    MethodDescriptor, OutboundHooks, Proceed, ResponseHook, ResponseHooks, ServerStreamCall,
    ServiceCall, SingleRequest, StreamEndHook, UnaryCall,
};
pub use context::{CallContext, Clock, ManualClock, MonotonicClock};
pub use error::{CallError, CallLogError, CallLogResult, StatusCode};
pub use hooks::CallHooks;
pub use interceptor::{
    CallLogger, Interceptor, InterceptorFn, Next, call_log_interceptor,
    call_log_interceptor_with_sink, dispatch_chain, from_fn,
};
pub use logging::{
    CallInfo, ChannelSink, Direction, JsonSink, LogDrain, LogLevel, LogOptions, LogRecord,
    LogSink, PayloadCategory, RecordKind, Redactor, RouteLogConfig, TracingSink, redact_value,
};
pub use shape::{CallShape, HookKind};

/// Prelude for convenient imports
///
/// ```rust,ignore
/// use rpc_call_log::prelude::*;
/// ```
pub mod prelude {
    // Host interface
    pub use crate::{
        BidiStreamCall, Call, CallHooks, ClientStreamCall, InboundHooks, Message, Metadata,
        MethodDescriptor, OutboundHooks, ResponseHooks, ServerStreamCall, ServiceCall,
        SingleRequest, UnaryCall,
    };

    // Interceptor
    pub use crate::{
        CallLogger, CallShape, Interceptor, InterceptorFn, call_log_interceptor, dispatch_chain,
    };

    // Logging
    pub use crate::{
        LogLevel, LogOptions, LogRecord, LogSink, PayloadCategory, RouteLogConfig, TracingSink,
    };

    // Errors
    pub use crate::{CallError, CallLogError, StatusCode};
}
