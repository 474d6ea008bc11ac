//! Incident configuration.
//!
//! [`IncidentConfig`] is loaded once when the adapter is initialized and is
//! immutable afterwards. Its keys mirror the settings a host exposes to the
//! operator:
//! - TOPdesk connection (`endpoint`, `username`, `password`, `login_mode`)
//! - Incident content (`caller_email`, `summary`, `description`, `object`)
//! - Category names resolved against the API (`priority`, `urgency`, ...)
//! - Extra attributes (`optional_fields`, `second_line`)
//!
//! Empty strings are treated exactly like missing values.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::category::Category;
use crate::error::{ConfigError, ConfigErrorKind, NotifyError};

/// Mask shown instead of the password in attribute listings.
pub const PASSWORD_MASK: &str = "****";

/// Which kind of TOPdesk account authenticates the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMode {
    /// Log in as a person.
    #[default]
    Person,
    /// Log in as an operator.
    Operator,
}

impl LoginMode {
    /// All login modes, in display order.
    pub const ALL: [Self; 2] = [Self::Person, Self::Operator];

    /// Returns the mode as used in the login path.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Operator => "operator",
        }
    }
}

impl fmt::Display for LoginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person" => Ok(Self::Person),
            "operator" => Ok(Self::Operator),
            other => Err(ConfigError::new(
                keys::LOGIN_MODE,
                ConfigErrorKind::UnknownLoginMode {
                    value: other.to_string(),
                },
            )),
        }
    }
}

/// A password. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wraps a password.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain-text password.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Configuration keys recognized by the adapter.
pub mod keys {
    /// Base URL of the TOPdesk installation.
    pub const ENDPOINT: &str = "endpoint";
    /// Login user name.
    pub const USERNAME: &str = "username";
    /// Login password.
    pub const PASSWORD: &str = "password";
    /// `person` or `operator`.
    pub const LOGIN_MODE: &str = "login_mode";
    /// Caller looked up by email.
    pub const CALLER_EMAIL: &str = "caller_email";
    /// Priority name.
    pub const PRIORITY: &str = "priority";
    /// Entry type name.
    pub const ENTRY_TYPE: &str = "entry_type";
    /// Call type name.
    pub const CALL_TYPE: &str = "call_type";
    /// Object name.
    pub const OBJECT: &str = "object";
    /// Impact name.
    pub const IMPACT: &str = "impact";
    /// Urgency name.
    pub const URGENCY: &str = "urgency";
    /// Brief description.
    pub const SUMMARY: &str = "summary";
    /// Operator group name.
    pub const OPERATOR_GROUP: &str = "operator_group";
    /// Category name.
    pub const CATEGORY: &str = "category";
    /// Subcategory name.
    pub const SUBCATEGORY: &str = "subcategory";
    /// Description template.
    pub const DESCRIPTION: &str = "description";
    /// Whether the incident goes straight to second line.
    pub const SECOND_LINE: &str = "second_line";
    /// Optional-fields definition string.
    pub const OPTIONAL_FIELDS: &str = "optional_fields";
    /// Accept any TLS certificate.
    pub const INSECURE_SKIP_VERIFY: &str = "insecure_skip_verify";
    /// Per-request timeout in seconds.
    pub const TIMEOUT_SECS: &str = "timeout_secs";
}

/// Adapter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentConfig {
    /// Base URL of TOPdesk, e.g. `https://topdesk.example.com`.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Login user name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Login password.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub password: Option<Password>,
    /// Login mode as configured; checked by the validator.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub login_mode: Option<String>,
    /// Email address of the caller the incident is filed for.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub caller_email: Option<String>,
    /// Priority name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Entry type name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    /// Call type name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    /// Object name, sent by name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// Impact name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    /// Urgency name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    /// Brief description of the incident.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operator group name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub operator_group: Option<String>,
    /// Category name, sent by name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Subcategory name, sent by name.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Description template with `%placeholder%` tokens.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Send the incident with status `secondLine`.
    pub second_line: bool,
    /// Comma separated `group:key:value` entries.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub optional_fields: Option<String>,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub insecure_skip_verify: bool,
    /// Per-request timeout in seconds. `None` means no deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl IncidentConfig {
    /// Parses a configuration from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the JSON is invalid.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::parse("config", e.to_string()))
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NotifyError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json(&content)?)
    }

    /// Builds a configuration from the key/value map a host hands over.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value has the wrong type.
    pub fn from_attributes(attributes: BTreeMap<String, Value>) -> Result<Self, ConfigError> {
        let object = attributes.into_iter().collect::<serde_json::Map<_, _>>();
        serde_json::from_value(Value::Object(object))
            .map_err(|e| ConfigError::parse("config", e.to_string()))
    }

    /// Returns every set key with the password masked.
    #[must_use]
    pub fn attributes(&self) -> BTreeMap<String, Value> {
        let Ok(Value::Object(object)) = serde_json::to_value(self) else {
            return BTreeMap::new();
        };
        object
            .into_iter()
            .map(|(key, value)| {
                if key == keys::PASSWORD {
                    (key, Value::String(PASSWORD_MASK.to_string()))
                } else {
                    (key, value)
                }
            })
            .collect()
    }

    /// Returns the configured name for a resolvable category.
    #[must_use]
    pub fn category_name(&self, category: Category) -> Option<&str> {
        let value = match category {
            Category::Priority => &self.priority,
            Category::EntryType => &self.entry_type,
            Category::CallType => &self.call_type,
            Category::Impact => &self.impact,
            Category::Urgency => &self.urgency,
            Category::OperatorGroup => &self.operator_group,
        };
        value.as_deref()
    }

    /// Joins an API path onto the endpoint.
    ///
    /// A trailing `/` on the endpoint is ignored so that the default
    /// `https://topdesk/` does not produce `//tas/...`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        let base = self.endpoint.as_deref().unwrap_or_default();
        format!("{}{}", base.trim_end_matches('/'), path)
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(T::from))
}
