//! Call shape classification

use serde::{Deserialize, Serialize};

/// Shape of an RPC call, determined by which sides carry a stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    /// Single request, single response
    Unary,
    /// Streamed requests, single response
    ClientStream,
    /// Single request, streamed responses
    ServerStream,
    /// Streamed requests and streamed responses
    BidiStream,
}

impl CallShape {
    /// Classify a call from the method's declared streaming flags.
    pub fn classify(request_stream: bool, response_stream: bool) -> Self {
        match (request_stream, response_stream) {
            (true, true) => Self::BidiStream,
            (true, false) => Self::ClientStream,
            (false, true) => Self::ServerStream,
            (false, false) => Self::Unary,
        }
    }

    /// Whether the request side is a stream of messages.
    pub fn request_stream(&self) -> bool {
        matches!(self, Self::ClientStream | Self::BidiStream)
    }

    /// Whether the response side is a stream of messages.
    pub fn response_stream(&self) -> bool {
        matches!(self, Self::ServerStream | Self::BidiStream)
    }

    /// The lifecycle hooks the interceptor binds for this shape.
    pub fn hooks(&self) -> &'static [HookKind] {
        match self {
            Self::Unary => &[HookKind::ResponseSent],
            Self::ClientStream => &[
                HookKind::InboundMessage,
                HookKind::InboundEnd,
                HookKind::ResponseSent,
            ],
            Self::ServerStream => &[HookKind::OutboundMessage, HookKind::OutboundEnd],
            Self::BidiStream => &[
                HookKind::InboundMessage,
                HookKind::InboundEnd,
                HookKind::OutboundMessage,
                HookKind::OutboundEnd,
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unary => "unary",
            Self::ClientStream => "client_stream",
            Self::ServerStream => "server_stream",
            Self::BidiStream => "bidi_stream",
        }
    }
}

impl std::fmt::Display for CallShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle hook a host can expose for a call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
pub enum HookKind {
    /// The single response (or error) was sent
    ResponseSent,
    /// A message arrived on the request stream
    InboundMessage,
    /// The request stream ended
    InboundEnd,
    /// A message was written to the response stream
    OutboundMessage,
    /// The response stream ended
    OutboundEnd,
}
