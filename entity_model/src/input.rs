//! Input sources
//!
//! Writes and validation read field values from an [`InputSource`] passed in by
//! the caller. [`RequestInput`] is the request-scoped form data; a plain
//! [`Record`] works just as well for data assembled in code.

use crate::Record;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Deref;

/// Key/value store consulted for field values
pub trait InputSource: Send + Sync {
    fn get(&self, field: &str) -> Option<&Value>;

    /// Whether nothing at all was submitted
    fn is_empty(&self) -> bool;

    /// Whether the field was submitted at all, empty or not
    fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

impl InputSource for Record {
    fn get(&self, field: &str) -> Option<&Value> {
        serde_json::Map::get(self, field)
    }

    fn is_empty(&self) -> bool {
        serde_json::Map::is_empty(self)
    }
}

impl InputSource for HashMap<String, Value> {
    fn get(&self, field: &str) -> Option<&Value> {
        HashMap::get(self, field)
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

/// Loose emptiness used when deciding whether a value is worth writing or
/// matching: null, false, zero, `""`, `"0"` and empty containers are empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Submitted request data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInput {
    values: Record,
}

impl RequestInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(values: Record) -> Self {
        Self { values }
    }

    /// Build from string pairs, the shape form posts arrive in
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), Value::String(value.into())))
            .collect();
        Self { values }
    }

    /// Build from a JSON object body; any other JSON value yields empty input
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.values.remove(field)
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the submitted values with `data` until the returned guard drops.
    ///
    /// The original values come back on every exit path, including unwinding.
    pub fn substitute(&mut self, data: Record) -> InputOverride<'_> {
        let original = std::mem::replace(&mut self.values, data);
        InputOverride {
            input: self,
            original: Some(original),
        }
    }
}

impl InputSource for RequestInput {
    fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Guard returned by [`RequestInput::substitute`]
#[derive(Debug)]
pub struct InputOverride<'a> {
    input: &'a mut RequestInput,
    original: Option<Record>,
}

impl Deref for InputOverride<'_> {
    type Target = RequestInput;

    fn deref(&self) -> &RequestInput {
        self.input
    }
}

impl Drop for InputOverride<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            self.input.values = original;
        }
    }
}
