//! Host-facing call interface
//!
//! The host framework owns transport and dispatch. For every call it hands
//! the interceptor a [`ServiceCall`]: a tagged union whose variants expose
//! only the hooks that exist for that call shape. A unary call has no stream
//! hooks to register, a server-streaming call has no inbound hooks, and so
//! on, so the interceptor never has to guess which capabilities a call has.
//!
//! # Example
//! ```rust,ignore
//! struct MyUnary { method: MethodDescriptor, metadata: Metadata, request: GetUser, hooks: CallHooks }
//!
//! impl Call for MyUnary { /* method(), metadata() */ }
//! impl SingleRequest for MyUnary { fn request(&self) -> &dyn Message { &self.request } }
//! impl ResponseHooks for MyUnary {
//!     fn on_response_sent(&mut self, hook: ResponseHook) { self.hooks.on_response_sent(hook) }
//! }
//!
//! logger.intercept(ServiceCall::Unary(&mut call), next);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{CallError, CallLogError, CallLogResult};
use crate::shape::CallShape;

/// Static description of the invoked method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Route path (e.g. "/users.UserService/Get")
    pub path: String,
    /// Whether the client sends a stream of messages
    pub request_stream: bool,
    /// Whether the server sends a stream of messages
    pub response_stream: bool,
}

impl MethodDescriptor {
    pub fn new(path: impl Into<String>, request_stream: bool, response_stream: bool) -> Self {
        Self {
            path: path.into(),
            request_stream,
            response_stream,
        }
    }

    pub fn unary(path: impl Into<String>) -> Self {
        Self::new(path, false, false)
    }

    pub fn client_stream(path: impl Into<String>) -> Self {
        Self::new(path, true, false)
    }

    pub fn server_stream(path: impl Into<String>) -> Self {
        Self::new(path, false, true)
    }

    pub fn bidi_stream(path: impl Into<String>) -> Self {
        Self::new(path, true, true)
    }

    /// Shape derived from the declared streaming flags.
    pub fn shape(&self) -> CallShape {
        CallShape::classify(self.request_stream, self.response_stream)
    }
}

/// Snapshot of request metadata (headers), ordered by key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A message that can be converted into a structured payload for logging.
///
/// Every `Serialize` type is a `Message`.
pub trait Message {
    /// Converts the message into a structured value.
    fn to_value(&self) -> CallLogResult<Value>;
}

impl<T: Serialize + ?Sized> Message for T {
    fn to_value(&self) -> CallLogResult<Value> {
        serde_json::to_value(self).map_err(|e| CallLogError::PayloadConversion(e.to_string()))
    }
}

/// Continuation handed to a hook; runs the host's next processing step.
pub type Proceed = Box<dyn FnOnce() + Send>;

/// Observer for streamed messages, called once per message.
pub type MessageHook = Box<dyn Fn(&dyn Message, Option<Proceed>) + Send + Sync>;

/// Observer for the end of one stream direction, called at most once.
pub type StreamEndHook = Box<dyn FnOnce(Option<&CallError>, Option<Proceed>) + Send>;

/// Observer for the single response (or the error that replaced it).
pub type ResponseHook =
    Box<dyn FnOnce(Result<&dyn Message, &CallError>, Option<Proceed>) + Send>;

/// Capabilities shared by every call shape.
pub trait Call: Send {
    /// Descriptor of the invoked method.
    fn method(&self) -> &MethodDescriptor;

    /// Correlation id set by an earlier stage, if any.
    fn correlation_id(&self) -> Option<&str> {
        None
    }

    /// Request metadata snapshot.
    fn metadata(&self) -> &Metadata;
}

/// Calls whose request is a single message available at entry.
pub trait SingleRequest {
    fn request(&self) -> &dyn Message;
}

/// Calls that send a single response.
pub trait ResponseHooks {
    fn on_response_sent(&mut self, hook: ResponseHook);
}

/// Calls with a request stream.
pub trait InboundHooks {
    fn on_inbound_message(&mut self, hook: MessageHook);
    fn on_inbound_end(&mut self, hook: StreamEndHook);
}

/// Calls with a response stream.
pub trait OutboundHooks {
    fn on_outbound_message(&mut self, hook: MessageHook);
    fn on_outbound_end(&mut self, hook: StreamEndHook);
}

/// Single request, single response.
pub trait UnaryCall: Call + SingleRequest + ResponseHooks {}
impl<T: Call + SingleRequest + ResponseHooks + ?Sized> UnaryCall for T {}

/// Streamed requests, single response.
pub trait ClientStreamCall: Call + InboundHooks + ResponseHooks {}
impl<T: Call + InboundHooks + ResponseHooks + ?Sized> ClientStreamCall for T {}

/// Single request, streamed responses.
pub trait ServerStreamCall: Call + SingleRequest + OutboundHooks {}
impl<T: Call + SingleRequest + OutboundHooks + ?Sized> ServerStreamCall for T {}

/// Streamed requests and streamed responses.
pub trait BidiStreamCall: Call + InboundHooks + OutboundHooks {}
impl<T: Call + InboundHooks + OutboundHooks + ?Sized> BidiStreamCall for T {}

/// Handle to one in-flight call, tagged by the capabilities the host exposes.
pub enum ServiceCall<'a> {
    Unary(&'a mut dyn UnaryCall),
    ClientStream(&'a mut dyn ClientStreamCall),
    ServerStream(&'a mut dyn ServerStreamCall),
    BidiStream(&'a mut dyn BidiStreamCall),
}

impl ServiceCall<'_> {
    /// Shape implied by the handle variant.
    pub fn handle_shape(&self) -> CallShape {
        match self {
            Self::Unary(_) => CallShape::Unary,
            Self::ClientStream(_) => CallShape::ClientStream,
            Self::ServerStream(_) => CallShape::ServerStream,
            Self::BidiStream(_) => CallShape::BidiStream,
        }
    }

    /// Shorter-lived handle to the same call, for passing down a chain.
    pub fn reborrow(&mut self) -> ServiceCall<'_> {
        match self {
            Self::Unary(call) => ServiceCall::Unary(&mut **call),
            Self::ClientStream(call) => ServiceCall::ClientStream(&mut **call),
            Self::ServerStream(call) => ServiceCall::ServerStream(&mut **call),
            Self::BidiStream(call) => ServiceCall::BidiStream(&mut **call),
        }
    }

    pub fn method(&self) -> &MethodDescriptor {
        match self {
            Self::Unary(call) => call.method(),
            Self::ClientStream(call) => call.method(),
            Self::ServerStream(call) => call.method(),
            Self::BidiStream(call) => call.method(),
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Unary(call) => call.correlation_id(),
            Self::ClientStream(call) => call.correlation_id(),
            Self::ServerStream(call) => call.correlation_id(),
            Self::BidiStream(call) => call.correlation_id(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Unary(call) => call.metadata(),
            Self::ClientStream(call) => call.metadata(),
            Self::ServerStream(call) => call.metadata(),
            Self::BidiStream(call) => call.metadata(),
        }
    }

    /// The single request message, for shapes that have one.
    pub fn request(&self) -> Option<&dyn Message> {
        match self {
            Self::Unary(call) => Some(call.request()),
            Self::ServerStream(call) => Some(call.request()),
            Self::ClientStream(_) | Self::BidiStream(_) => None,
        }
    }
}
