//! Test doubles shared by the interceptor tests.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::{
    Call, CallError, CallHooks, CallShape, InboundHooks, LogLevel, LogRecord, LogSink, Message,
    MessageHook, Metadata, MethodDescriptor, OutboundHooks, ResponseHook, ResponseHooks,
    ServiceCall, SingleRequest, StreamEndHook,
};

/// In-memory host call that can play any shape.
pub struct MockCall {
    method: MethodDescriptor,
    metadata: Metadata,
    correlation_id: Option<String>,
    request: Box<dyn Message + Send + Sync>,
    pub hooks: CallHooks,
}

impl MockCall {
    pub fn new(method: MethodDescriptor) -> Self {
        Self {
            method,
            metadata: Metadata::new(),
            correlation_id: None,
            request: Box::new(Value::Null),
            hooks: CallHooks::new(),
        }
    }

    pub fn with_request<M: Message + Send + Sync + 'static>(mut self, request: M) -> Self {
        self.request = Box::new(request);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Handle matching the declared shape of the method.
    pub fn service_call(&mut self) -> ServiceCall<'_> {
        match self.method.shape() {
            CallShape::Unary => ServiceCall::Unary(self),
            CallShape::ClientStream => ServiceCall::ClientStream(self),
            CallShape::ServerStream => ServiceCall::ServerStream(self),
            CallShape::BidiStream => ServiceCall::BidiStream(self),
        }
    }

    pub fn respond(&self, response: &dyn Message) {
        self.hooks.fire_response_sent(Ok(response), Box::new(|| {}));
    }

    pub fn fail(&self, error: &CallError) {
        self.hooks.fire_response_sent(Err(error), Box::new(|| {}));
    }

    pub fn receive(&self, message: &dyn Message) {
        self.hooks.fire_inbound_message(message, Box::new(|| {}));
    }

    pub fn send(&self, message: &dyn Message) {
        self.hooks.fire_outbound_message(message, Box::new(|| {}));
    }

    pub fn end_inbound(&self, error: Option<&CallError>) {
        self.hooks.fire_inbound_end(error, Box::new(|| {}));
    }

    pub fn end_outbound(&self, error: Option<&CallError>) {
        self.hooks.fire_outbound_end(error, Box::new(|| {}));
    }
}

impl Call for MockCall {
    fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl SingleRequest for MockCall {
    fn request(&self) -> &dyn Message {
        &*self.request
    }
}

impl ResponseHooks for MockCall {
    fn on_response_sent(&mut self, hook: ResponseHook) {
        self.hooks.on_response_sent(hook);
    }
}

impl InboundHooks for MockCall {
    fn on_inbound_message(&mut self, hook: MessageHook) {
        self.hooks.on_inbound_message(hook);
    }

    fn on_inbound_end(&mut self, hook: StreamEndHook) {
        self.hooks.on_inbound_end(hook);
    }
}

impl OutboundHooks for MockCall {
    fn on_outbound_message(&mut self, hook: MessageHook) {
        self.hooks.on_outbound_message(hook);
    }

    fn on_outbound_end(&mut self, hook: StreamEndHook) {
        self.hooks.on_outbound_end(hook);
    }
}

/// A message whose conversion always fails.
pub struct Unconvertible;

impl Serialize for Unconvertible {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("message cannot be converted"))
    }
}

/// Sink that appends a marker to a shared journal for every record.
#[derive(Clone, Default)]
pub struct JournalSink {
    pub journal: Arc<Mutex<Vec<String>>>,
}

impl JournalSink {
    pub fn note(&self, entry: impl Into<String>) {
        self.journal.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}

impl LogSink for JournalSink {
    fn emit(&self, record: &LogRecord, _level: LogLevel) {
        self.note(format!("log:{}", record.event()));
    }
}
