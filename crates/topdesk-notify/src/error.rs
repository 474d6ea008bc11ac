//! Error types for the topdesk-notify crate.

use std::fmt;

use thiserror::Error;

/// The kind of configuration problem that was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigErrorKind {
    /// A mandatory setting is unset or empty.
    #[error("is mandatory and must not be empty")]
    Missing,

    /// The login mode is not one of the supported modes.
    #[error("unknown login mode '{value}': expected person or operator")]
    UnknownLoginMode {
        /// The value that was supplied.
        value: String,
    },

    /// The optional-fields setting has too many entries.
    #[error("{actual} optional field values supplied, at most {max} allowed")]
    TooManyOptionalFields {
        /// Maximum number of entries allowed.
        max: usize,
        /// Number of entries supplied.
        actual: usize,
    },

    /// An optional-fields entry is not shaped `group:key:value`.
    #[error(
        "entry '{entry}' must have the format optionalFields1:key:value or optionalFields2:key:value"
    )]
    MalformedOptionalField {
        /// The offending entry.
        entry: String,
    },

    /// The configuration document could not be parsed.
    #[error("cannot be parsed: {reason}")]
    Parse {
        /// The parser's message.
        reason: String,
    },
}

/// A configuration error, reported before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid configuration '{field}': {kind}")]
pub struct ConfigError {
    /// The configuration key the error refers to.
    pub field: String,
    /// What is wrong with it.
    pub kind: ConfigErrorKind,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ConfigErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// A mandatory setting is missing.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ConfigErrorKind::Missing)
    }

    /// The configuration document could not be parsed.
    #[must_use]
    pub fn parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            field,
            ConfigErrorKind::Parse {
                reason: reason.into(),
            },
        )
    }
}

/// Errors that can occur while delivering an incident.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP request could not be completed.
    #[error("{call} request failed: {reason}")]
    Transport {
        /// The API call that failed (login, lookup, create, logout).
        call: String,
        /// The transport's message.
        reason: String,
    },

    /// The login call returned a non-success status.
    #[error("login rejected with status {status}: {body}")]
    LoginRejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A lookup call returned a non-success status.
    #[error("lookup {url} rejected with status {status}: {body}")]
    LookupRejected {
        /// The lookup URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A response body could not be interpreted.
    #[error("malformed {call} response: {reason}")]
    MalformedResponse {
        /// The API call whose response was malformed.
        call: String,
        /// Why it could not be interpreted.
        reason: String,
    },

    /// The incident was not created.
    #[error("incident creation failed with status {status}: {body}")]
    CreationRejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// Creates a transport error for the given call.
    #[must_use]
    pub fn transport(call: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Transport {
            call: call.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a malformed-response error for the given call.
    #[must_use]
    pub fn malformed(call: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::MalformedResponse {
            call: call.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for incident delivery.
pub type Result<T> = std::result::Result<T, NotifyError>;
