//! Configuration types for the logging module.
//!
//! - RouteLogConfig: what to omit or redact for one route
//! - LogOptions: the route table plus interceptor-wide settings
//!
//! Both use the builder pattern and are immutable once handed to a
//! [`CallLogger`](crate::CallLogger). Route tables can also be loaded from
//! JSON using the camelCase field names (`omitRequestMetadata`,
//! `omitUnaryRequestPayloadKeys`, ...).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::constants::DEFAULT_REDACTION_REPLACEMENT;
use super::types::LogLevel;
use crate::error::CallLogResult;

/// Payload categories that can be omitted or redacted independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadCategory {
    /// The single request of a unary or server-streaming call.
    UnaryRequest,
    /// The single response of a unary or client-streaming call.
    UnaryResponse,
    /// Messages received on the request stream.
    StreamIn,
    /// Messages sent on the response stream.
    StreamOut,
}

/// Per-route logging configuration.
///
/// Every flag defaults to `false` and every key list to empty, which means
/// "log everything, redact nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteLogConfig {
    /// Leave the metadata snapshot out of start records.
    pub omit_request_metadata: bool,
    pub omit_unary_request_payload: bool,
    pub omit_unary_response_payload: bool,
    pub omit_stream_out_msg_payload: bool,
    pub omit_stream_in_msg_payload: bool,
    /// Keys redacted anywhere inside the unary request payload.
    pub omit_unary_request_payload_keys: Vec<String>,
    pub omit_unary_response_payload_keys: Vec<String>,
    pub omit_stream_out_msg_payload_keys: Vec<String>,
    pub omit_stream_in_msg_payload_keys: Vec<String>,
}

impl RouteLogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn omit_request_metadata(mut self, omit: bool) -> Self {
        self.omit_request_metadata = omit;
        self
    }

    /// Sets whether the payload of a category is left out entirely.
    ///
    /// Omission wins over any redaction keys configured for the category.
    pub fn omit_payload(mut self, category: PayloadCategory, omit: bool) -> Self {
        match category {
            PayloadCategory::UnaryRequest => self.omit_unary_request_payload = omit,
            PayloadCategory::UnaryResponse => self.omit_unary_response_payload = omit,
            PayloadCategory::StreamIn => self.omit_stream_in_msg_payload = omit,
            PayloadCategory::StreamOut => self.omit_stream_out_msg_payload = omit,
        }
        self
    }

    /// Adds keys to redact inside payloads of a category.
    pub fn redact_keys(
        mut self,
        category: PayloadCategory,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let list = match category {
            PayloadCategory::UnaryRequest => &mut self.omit_unary_request_payload_keys,
            PayloadCategory::UnaryResponse => &mut self.omit_unary_response_payload_keys,
            PayloadCategory::StreamIn => &mut self.omit_stream_in_msg_payload_keys,
            PayloadCategory::StreamOut => &mut self.omit_stream_out_msg_payload_keys,
        };
        list.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn omits_payload(&self, category: PayloadCategory) -> bool {
        match category {
            PayloadCategory::UnaryRequest => self.omit_unary_request_payload,
            PayloadCategory::UnaryResponse => self.omit_unary_response_payload,
            PayloadCategory::StreamIn => self.omit_stream_in_msg_payload,
            PayloadCategory::StreamOut => self.omit_stream_out_msg_payload,
        }
    }

    pub fn redacted_keys(&self, category: PayloadCategory) -> &[String] {
        match category {
            PayloadCategory::UnaryRequest => &self.omit_unary_request_payload_keys,
            PayloadCategory::UnaryResponse => &self.omit_unary_response_payload_keys,
            PayloadCategory::StreamIn => &self.omit_stream_in_msg_payload_keys,
            PayloadCategory::StreamOut => &self.omit_stream_out_msg_payload_keys,
        }
    }
}

/// Options for a call logging interceptor.
///
/// Routes are matched by exact path; a path without an entry is logged in
/// full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogOptions {
    /// Per-route configuration keyed by route path.
    pub log_configurations: HashMap<String, RouteLogConfig>,
    /// Sentinel written in place of redacted values.
    pub redaction_replacement: String,
    /// Minimum level forwarded to the sink.
    pub level: LogLevel,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_configurations: HashMap::new(),
            redaction_replacement: DEFAULT_REDACTION_REPLACEMENT.to_string(),
            level: LogLevel::Info,
        }
    }
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh options that log every call in full.
    pub fn default_options() -> Self {
        Self::default()
    }

    /// Parses options from JSON.
    ///
    /// # Example
    /// ```rust,ignore
    /// let options = LogOptions::from_json(r#"{
    ///     "logConfigurations": {
    ///         "/auth.Auth/Login": { "omitUnaryRequestPayloadKeys": ["password"] }
    ///     }
    /// }"#)?;
    /// ```
    pub fn from_json(json: &str) -> CallLogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the configuration for one route, replacing any previous one.
    pub fn route(mut self, path: impl Into<String>, config: RouteLogConfig) -> Self {
        self.log_configurations.insert(path.into(), config);
        self
    }

    pub fn with_redaction_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.redaction_replacement = replacement.into();
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Configuration for an exact route path, if any.
    pub fn route_config(&self, path: &str) -> Option<&RouteLogConfig> {
        self.log_configurations.get(path)
    }
}
