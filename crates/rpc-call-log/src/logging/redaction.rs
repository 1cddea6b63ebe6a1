//! Key-based redaction of structured payloads.
//!
//! Every value whose key is in the configured set is replaced with a fixed
//! sentinel, at any depth, inside objects and arrays alike. Keys match
//! exactly. [`Redactor::redact_in_place`] walks iteratively over an explicit
//! stack and tracks visited nodes, so payload depth never grows the call
//! stack and no node is processed twice. [`Redactor::redact`] first clones
//! its input, and that clone recurses with the depth of the payload.

use serde_json::Value;
use std::collections::HashSet;

use super::constants::DEFAULT_REDACTION_REPLACEMENT;

/// Redacts a configured set of keys from JSON values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redactor {
    keys: HashSet<String>,
    replacement: String,
}

impl Redactor {
    /// Creates a redactor for the given keys and sentinel.
    pub fn new(
        keys: impl IntoIterator<Item = impl Into<String>>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            replacement: replacement.into(),
        }
    }

    /// Creates a redactor using [`DEFAULT_REDACTION_REPLACEMENT`].
    pub fn with_keys(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(keys, DEFAULT_REDACTION_REPLACEMENT)
    }

    /// True when there is nothing to redact.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Returns a redacted copy of `value`.
    ///
    /// The copy is a plain `clone`, which recurses; use
    /// [`redact_in_place`](Self::redact_in_place) for very deep payloads.
    pub fn redact(&self, value: &Value) -> Value {
        let mut redacted = value.clone();
        self.redact_in_place(&mut redacted);
        redacted
    }

    /// Redacts `value` in place and returns how many values were replaced.
    ///
    /// A scalar root has no keys and is left untouched.
    pub fn redact_in_place(&self, value: &mut Value) -> usize {
        if self.keys.is_empty() {
            return 0;
        }

        let mut replaced = 0;
        let mut visited: HashSet<*const Value> = HashSet::new();
        let mut pending: Vec<&mut Value> = vec![value];

        while let Some(node) = pending.pop() {
            if !visited.insert(&*node as *const Value) {
                continue;
            }
            match node {
                Value::Object(map) => {
                    for (key, child) in map.iter_mut() {
                        if self.keys.contains(key.as_str()) {
                            *child = Value::String(self.replacement.clone());
                            replaced += 1;
                        } else {
                            pending.push(child);
                        }
                    }
                }
                Value::Array(items) => pending.extend(items.iter_mut()),
                _ => {}
            }
        }

        replaced
    }
}

/// Redacts `keys` from `value` with the default sentinel.
pub fn redact_value<K: AsRef<str>>(value: &Value, keys: &[K]) -> Value {
    Redactor::with_keys(keys.iter().map(|k| k.as_ref().to_string())).redact(value)
}
