use crate::call::{Message, MessageHook, Proceed, ResponseHook, ServiceCall, StreamEndHook};
use crate::context::{CallContext, Clock, MonotonicClock};
use crate::error::{CallError, CallLogError};
use crate::logging::{
    Direction, LogLevel, LogOptions, LogRecord, LogSink, PayloadCategory, Redactor,
    RouteLogConfig, TracingSink,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// Interceptor Types
// =============================================================================

/// Continuation that runs the next stage of the host chain.
pub type Next = Box<dyn FnOnce() + Send>;

/// Interceptor function type
pub type InterceptorFn = Arc<dyn for<'a> Fn(ServiceCall<'a>, Next) + Send + Sync>;

/// Trait for implementing call interceptors.
///
/// An interceptor runs synchronously when a call arrives. It may register
/// hooks on the call and decides whether the chain continues by calling
/// `next` (at most once).
pub trait Interceptor: Send + Sync {
    fn intercept(&self, call: ServiceCall<'_>, next: Next);
}

impl<F> Interceptor for F
where
    F: for<'a> Fn(ServiceCall<'a>, Next) + Send + Sync,
{
    fn intercept(&self, call: ServiceCall<'_>, next: Next) {
        self(call, next)
    }
}

/// Wraps any interceptor into an [`InterceptorFn`].
pub fn from_fn<I>(interceptor: I) -> InterceptorFn
where
    I: Interceptor + 'static,
{
    Arc::new(move |call: ServiceCall<'_>, next: Next| interceptor.intercept(call, next))
}

/// Runs `interceptors` in registration order, then `handler`.
///
/// Each interceptor gates the rest of the chain: if it returns without
/// calling its continuation, no later interceptor and not the handler run.
/// Returns true when the handler ran.
pub fn dispatch_chain(
    interceptors: &[InterceptorFn],
    call: &mut ServiceCall<'_>,
    handler: impl FnOnce(),
) -> bool {
    for interceptor in interceptors {
        let proceeded = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&proceeded);
        interceptor(call.reborrow(), Box::new(move || flag.store(true, Ordering::SeqCst)));
        if !proceeded.load(Ordering::SeqCst) {
            return false;
        }
    }
    handler();
    true
}

// =============================================================================
// Route Policies
// =============================================================================

/// Omission and redaction for one payload category, resolved once.
#[derive(Debug, Clone, Default)]
struct PayloadPolicy {
    omit: bool,
    redactor: Option<Redactor>,
}

impl PayloadPolicy {
    fn resolve(config: &RouteLogConfig, category: PayloadCategory, replacement: &str) -> Self {
        let keys = config.redacted_keys(category);
        Self {
            omit: config.omits_payload(category),
            redactor: (!keys.is_empty()).then(|| Redactor::new(keys.iter().cloned(), replacement)),
        }
    }
}

/// Everything a call needs from its route configuration.
#[derive(Debug, Clone, Default)]
struct RoutePolicy {
    omit_metadata: bool,
    unary_request: PayloadPolicy,
    unary_response: PayloadPolicy,
    stream_in: PayloadPolicy,
    stream_out: PayloadPolicy,
}

impl RoutePolicy {
    fn resolve(config: &RouteLogConfig, replacement: &str) -> Self {
        Self {
            omit_metadata: config.omit_request_metadata,
            unary_request: PayloadPolicy::resolve(config, PayloadCategory::UnaryRequest, replacement),
            unary_response: PayloadPolicy::resolve(
                config,
                PayloadCategory::UnaryResponse,
                replacement,
            ),
            stream_in: PayloadPolicy::resolve(config, PayloadCategory::StreamIn, replacement),
            stream_out: PayloadPolicy::resolve(config, PayloadCategory::StreamOut, replacement),
        }
    }

    fn stream(&self, direction: Direction) -> &PayloadPolicy {
        match direction {
            Direction::In => &self.stream_in,
            Direction::Out => &self.stream_out,
        }
    }
}

// =============================================================================
// Per-call Scope
// =============================================================================

/// State captured by every hook bound for one call.
struct CallScope {
    context: CallContext,
    policy: Arc<RoutePolicy>,
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    level: LogLevel,
}

impl CallScope {
    fn emit(&self, record: LogRecord, level: LogLevel) {
        if self.level.should_log(level) {
            self.sink.emit(&record, level);
        }
    }

    fn emit_failure(&self, error: &CallLogError) {
        self.emit(
            LogRecord::failure(self.context.info(), error.kind(), error),
            LogLevel::Error,
        );
    }

    /// Structured payload of `message` under `policy`.
    ///
    /// A conversion failure is reported as a failure notice and yields no
    /// payload.
    fn payload(&self, message: &dyn Message, policy: &PayloadPolicy) -> Option<Value> {
        if policy.omit {
            return None;
        }
        match message.to_value() {
            Ok(mut value) => {
                if let Some(redactor) = &policy.redactor {
                    redactor.redact_in_place(&mut value);
                }
                Some(value)
            }
            Err(error) => {
                self.emit_failure(&error);
                None
            }
        }
    }

    fn response_hook(self: &Arc<Self>) -> ResponseHook {
        let scope = Arc::clone(self);
        Box::new(move |outcome: Result<&dyn Message, &CallError>, proceed: Option<Proceed>| {
            let now = scope.clock.now();
            if let Some(proceed) = proceed {
                proceed();
            }
            let took_ms = scope.context.elapsed_ms(now);
            let record = match outcome {
                Ok(response) => {
                    let payload = scope.payload(response, &scope.policy.unary_response);
                    LogRecord::finished(scope.context.info(), took_ms, payload)
                }
                Err(error) => LogRecord::failed(scope.context.info(), took_ms, error.clone()),
            };
            scope.emit(record, LogLevel::Info);
        })
    }

    fn message_hook(self: &Arc<Self>, direction: Direction) -> MessageHook {
        let scope = Arc::clone(self);
        Box::new(move |message: &dyn Message, forward: Option<Proceed>| {
            if let Some(forward) = forward {
                forward();
            }
            let payload = scope.payload(message, scope.policy.stream(direction));
            scope.emit(
                LogRecord::stream_message(scope.context.info(), direction, payload),
                LogLevel::Info,
            );
        })
    }

    fn end_hook(self: &Arc<Self>, direction: Direction) -> StreamEndHook {
        let scope = Arc::clone(self);
        Box::new(move |error: Option<&CallError>, proceed: Option<Proceed>| {
            if let Some(proceed) = proceed {
                proceed();
            }
            scope.emit(
                LogRecord::stream_end(scope.context.info(), direction, error.cloned()),
                LogLevel::Info,
            );
        })
    }
}

// =============================================================================
// CallLogger
// =============================================================================

/// Interceptor that logs the lifecycle of every call it sees.
///
/// # Example
///
/// ```rust,ignore
/// use rpc_call_log::{CallLogger, LogOptions, ServiceCall};
///
/// let logger = CallLogger::new(LogOptions::default_options());
///
/// // Inside the host, once per call:
/// logger.intercept(ServiceCall::Unary(&mut call), || dispatch_to_handler());
/// ```
pub struct CallLogger {
    options: LogOptions,
    routes: HashMap<String, Arc<RoutePolicy>>,
    fallback: Arc<RoutePolicy>,
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
}

impl CallLogger {
    /// Creates a logger that emits through [`TracingSink`].
    pub fn new(options: LogOptions) -> Self {
        Self::with_sink(options, TracingSink)
    }

    /// Creates a logger with a custom sink.
    pub fn with_sink<S>(options: LogOptions, sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        let routes = options
            .log_configurations
            .iter()
            .map(|(path, config)| {
                let policy = RoutePolicy::resolve(config, &options.redaction_replacement);
                (path.clone(), Arc::new(policy))
            })
            .collect();

        Self {
            options,
            routes,
            fallback: Arc::new(RoutePolicy::default()),
            sink: Arc::new(sink),
            clock: Arc::new(MonotonicClock),
        }
    }

    /// Replaces the clock used for call timing.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    /// Logs the start of `call`, binds the hooks for its shape and then
    /// invokes `next` exactly once.
    pub fn intercept(&self, call: ServiceCall<'_>, next: impl FnOnce()) {
        if self.options.level == LogLevel::Off {
            next();
            return;
        }

        let method = call.method();
        let declared = method.shape();
        let policy = self
            .routes
            .get(&method.path)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback));

        let scope = Arc::new(CallScope {
            context: CallContext::new(
                method.path.clone(),
                declared,
                call.correlation_id().map(str::to_owned),
                self.clock.now(),
            ),
            policy,
            sink: Arc::clone(&self.sink),
            clock: Arc::clone(&self.clock),
            level: self.options.level,
        });

        let handle = call.handle_shape();
        if handle != declared {
            scope.emit_failure(&CallLogError::ShapeMismatch {
                path: method.path.clone(),
                declared,
                handle,
            });
            next();
            return;
        }

        let metadata = (!scope.policy.omit_metadata).then(|| call.metadata().clone());
        let payload = call
            .request()
            .and_then(|request| scope.payload(request, &scope.policy.unary_request));

        match call {
            ServiceCall::Unary(call) => {
                call.on_response_sent(scope.response_hook());
            }
            ServiceCall::ClientStream(call) => {
                call.on_inbound_message(scope.message_hook(Direction::In));
                call.on_inbound_end(scope.end_hook(Direction::In));
                call.on_response_sent(scope.response_hook());
            }
            ServiceCall::ServerStream(call) => {
                call.on_outbound_message(scope.message_hook(Direction::Out));
                call.on_outbound_end(scope.end_hook(Direction::Out));
            }
            ServiceCall::BidiStream(call) => {
                call.on_inbound_message(scope.message_hook(Direction::In));
                call.on_inbound_end(scope.end_hook(Direction::In));
                call.on_outbound_message(scope.message_hook(Direction::Out));
                call.on_outbound_end(scope.end_hook(Direction::Out));
            }
        }

        scope.emit(
            LogRecord::start(scope.context.info(), metadata, payload),
            LogLevel::Info,
        );

        next();
    }
}

impl Interceptor for CallLogger {
    fn intercept(&self, call: ServiceCall<'_>, next: Next) {
        CallLogger::intercept(self, call, next)
    }
}

impl std::fmt::Debug for CallLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallLogger")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Creates a call logging interceptor that emits through [`TracingSink`].
///
/// # Example
///
/// ```rust,ignore
/// let chain = vec![call_log_interceptor(LogOptions::default_options())];
/// dispatch_chain(&chain, &mut ServiceCall::Unary(&mut call), || handler());
/// ```
pub fn call_log_interceptor(options: LogOptions) -> InterceptorFn {
    from_fn(CallLogger::new(options))
}

/// Creates a call logging interceptor with a custom sink.
pub fn call_log_interceptor_with_sink<S>(options: LogOptions, sink: S) -> InterceptorFn
where
    S: LogSink + 'static,
{
    from_fn(CallLogger::with_sink(options, sink))
}
