//! Alert events and placeholder rendering.
//!
//! Templates use `%name%` tokens. `%stream%` and `%triggeredAt%` are always
//! available; every field of the first backlog record is available under its
//! own name. Unknown tokens are left untouched.
//!
//! Substitution is sequential: stream, then timestamp, then each field in
//! record order. A field value that itself contains a `%token%` of a later
//! field will be substituted again, so field values should not look like
//! placeholders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder for the stream title.
pub const STREAM_PLACEHOLDER: &str = "%stream%";

/// Placeholder for the trigger timestamp.
pub const TRIGGERED_AT_PLACEHOLDER: &str = "%triggeredAt%";

/// Format of the rendered trigger timestamp, e.g. `2015-11-18 12:07:00+0000`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// A log record matching the alert condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Field name to value, in the order the record carries them.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// An alert that fired on a log stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    /// Title of the stream the condition watches.
    pub stream_title: String,
    /// When the condition fired.
    pub triggered_at: DateTime<Utc>,
    /// Records matching the condition, most relevant first.
    #[serde(default)]
    pub matching_records: Vec<LogRecord>,
    /// How many matching records the condition keeps.
    #[serde(default = "default_backlog")]
    pub backlog: usize,
}

const fn default_backlog() -> usize {
    1
}

impl AlertEvent {
    /// Creates an event without matching records.
    #[must_use]
    pub fn new(stream_title: impl Into<String>, triggered_at: DateTime<Utc>) -> Self {
        Self {
            stream_title: stream_title.into(),
            triggered_at,
            matching_records: Vec::new(),
            backlog: default_backlog(),
        }
    }

    /// Appends a matching record.
    #[must_use]
    pub fn with_record(mut self, record: LogRecord) -> Self {
        self.matching_records.push(record);
        self
    }

    /// Sets the backlog size.
    #[must_use]
    pub const fn with_backlog(mut self, backlog: usize) -> Self {
        self.backlog = backlog;
        self
    }

    /// Returns the records kept by the backlog.
    #[must_use]
    pub fn backlog_records(&self) -> &[LogRecord] {
        let size = self.backlog.min(self.matching_records.len());
        &self.matching_records[..size]
    }

    /// Returns the render context for this event.
    #[must_use]
    pub fn context(&self) -> RenderContext<'_> {
        RenderContext {
            stream_title: &self.stream_title,
            triggered_at: self.triggered_at,
            record: self.backlog_records().first(),
        }
    }
}

/// Values available to a template.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Stream title.
    pub stream_title: &'a str,
    /// Trigger timestamp.
    pub triggered_at: DateTime<Utc>,
    /// First backlog record, if any.
    pub record: Option<&'a LogRecord>,
}

/// Renders `template` against `context`.
#[must_use]
pub fn render(template: &str, context: &RenderContext<'_>) -> String {
    let timestamp = context.triggered_at.format(TIMESTAMP_FORMAT).to_string();

    let mut rendered = template
        .replace(STREAM_PLACEHOLDER, context.stream_title)
        .replace(TRIGGERED_AT_PLACEHOLDER, &timestamp);

    if let Some(record) = context.record {
        for (name, value) in &record.fields {
            rendered = rendered.replace(&format!("%{name}%"), &field_text(value));
        }
    }

    rendered
}

/// Textual representation of a field value.
#[must_use]
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
