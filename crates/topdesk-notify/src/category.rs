//! Lookup categories and the category resolver.
//!
//! Priority, entry type, call type, impact, urgency and operator group are
//! configured by name but must be sent to TOPdesk by identifier. The
//! resolver fetches the candidate list for a category and picks the first
//! object whose name matches exactly.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{NotifyError, Result};
use crate::transport::{Auth, HttpTransport};

/// A classification axis resolved to a backend identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Incident priority.
    Priority,
    /// How the incident was entered.
    EntryType,
    /// Kind of call.
    CallType,
    /// Impact.
    Impact,
    /// Urgency.
    Urgency,
    /// Operator group handling the incident.
    OperatorGroup,
}

impl Category {
    /// All categories, in the order they are resolved.
    pub const ALL: [Self; 6] = [
        Self::Priority,
        Self::EntryType,
        Self::CallType,
        Self::Impact,
        Self::Urgency,
        Self::OperatorGroup,
    ];

    /// Returns the configuration key holding the category name.
    #[must_use]
    pub const fn config_key(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::EntryType => "entry_type",
            Self::CallType => "call_type",
            Self::Impact => "impact",
            Self::Urgency => "urgency",
            Self::OperatorGroup => "operator_group",
        }
    }

    /// Returns the key under which the payload carries the identifier.
    #[must_use]
    pub const fn payload_key(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::EntryType => "entryType",
            Self::CallType => "callType",
            Self::Impact => "impact",
            Self::Urgency => "urgency",
            Self::OperatorGroup => "operatorGroup",
        }
    }

    /// Returns the key under which candidate objects expose their name.
    #[must_use]
    pub const fn name_key(&self) -> &'static str {
        match self {
            Self::OperatorGroup => "groupName",
            _ => "name",
        }
    }

    /// Returns the lookup path for this category.
    ///
    /// Operator groups are filtered server side by name.
    #[must_use]
    pub fn lookup_path(&self, name: &str) -> String {
        match self {
            Self::Priority => "/tas/api/incidents/priorities".to_string(),
            Self::EntryType => "/tas/api/incidents/entry_types".to_string(),
            Self::CallType => "/tas/api/incidents/call_types".to_string(),
            Self::Impact => "/tas/api/incidents/impacts".to_string(),
            Self::Urgency => "/tas/api/incidents/urgencies".to_string(),
            Self::OperatorGroup => {
                let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
                format!("/tas/api/operatorgroups?name={encoded}")
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Looks up backend identifiers by name.
#[derive(Debug, Clone, Copy)]
pub struct CategoryResolver<'a> {
    transport: &'a dyn HttpTransport,
    token: &'a str,
}

impl<'a> CategoryResolver<'a> {
    /// Creates a resolver that authenticates with the given session token.
    #[must_use]
    pub fn new(transport: &'a dyn HttpTransport, token: &'a str) -> Self {
        Self { transport, token }
    }

    /// Resolves a configured category name.
    ///
    /// # Errors
    ///
    /// See [`CategoryResolver::resolve_id`].
    pub fn resolve(&self, endpoint_url: &str, category: Category, name: &str) -> Result<Option<String>> {
        let url = format!("{endpoint_url}{}", category.lookup_path(name));
        self.resolve_id(&url, name, category.name_key())
    }

    /// Fetches `url` and returns the `id` of the first object whose
    /// `key_name` equals `name`.
    ///
    /// Returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if the request fails,
    /// `NotifyError::LookupRejected` for a non-success status and
    /// `NotifyError::MalformedResponse` if the body is not a JSON array.
    pub fn resolve_id(&self, url: &str, name: &str, key_name: &str) -> Result<Option<String>> {
        let response = self.transport.get(url, &Auth::Token(self.token.to_string()))?;
        debug!(url = %url, status = response.status, "lookup response");
        if !response.is_success() {
            return Err(NotifyError::LookupRejected {
                url: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }
        let candidates = parse_candidates(&response.body)?;
        Ok(find_id(&candidates, name, key_name))
    }
}

/// Parses a successful lookup body. An empty body is an empty list.
fn parse_candidates(body: &str) -> Result<Vec<Value>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<Value>>(body).map_err(|e| NotifyError::malformed("lookup", e))
}

/// Linear scan for the first exact, case-sensitive name match.
#[must_use]
pub fn find_id(candidates: &[Value], name: &str, key_name: &str) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| candidate.get(key_name).and_then(Value::as_str) == Some(name))
        .and_then(|candidate| match candidate.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
}
