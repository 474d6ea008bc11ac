//! The incident document posted to TOPdesk.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::Category;
use crate::config::IncidentConfig;
use crate::optional_fields::OptionalFieldGroups;

/// Status sent when the incident goes straight to second line.
pub const SECOND_LINE_STATUS: &str = "secondLine";

/// Reference to a backend object by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRef {
    /// Backend identifier.
    pub id: String,
}

/// Reference to a backend object by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRef {
    /// Display name.
    pub name: String,
}

/// Caller lookup by email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallerLookup {
    /// Email address of the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of the create-incident call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPayload {
    /// Caller the incident is filed for.
    pub caller_lookup: CallerLookup,
    /// Summary line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,
    /// Rendered description.
    pub request: String,
    /// First optional-field group.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_fields1: BTreeMap<String, String>,
    /// Second optional-field group.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_fields2: BTreeMap<String, String>,
    /// Resolved priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<IdRef>,
    /// Resolved entry type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<IdRef>,
    /// Resolved call type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_type: Option<IdRef>,
    /// Resolved impact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<IdRef>,
    /// Resolved urgency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<IdRef>,
    /// Resolved operator group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_group: Option<IdRef>,
    /// Category, by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<NameRef>,
    /// Subcategory, by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<NameRef>,
    /// Object, by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<NameRef>,
    /// Processing status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl IncidentPayload {
    /// Builds the parts of the payload that need no lookups.
    #[must_use]
    pub fn new(config: &IncidentConfig, description: String, groups: OptionalFieldGroups) -> Self {
        let by_name = |value: &Option<String>| value.clone().map(|name| NameRef { name });

        Self {
            caller_lookup: CallerLookup {
                email: config.caller_email.clone(),
            },
            brief_description: config.summary.clone(),
            request: description,
            optional_fields1: groups.group1,
            optional_fields2: groups.group2,
            category: by_name(&config.category),
            subcategory: by_name(&config.subcategory),
            object: by_name(&config.object),
            status: config.second_line.then(|| SECOND_LINE_STATUS.to_string()),
            ..Self::default()
        }
    }

    /// Records the resolved identifier of a category.
    pub fn set_resolved(&mut self, category: Category, id: String) {
        let slot = match category {
            Category::Priority => &mut self.priority,
            Category::EntryType => &mut self.entry_type,
            Category::CallType => &mut self.call_type,
            Category::Impact => &mut self.impact,
            Category::Urgency => &mut self.urgency,
            Category::OperatorGroup => &mut self.operator_group,
        };
        *slot = Some(IdRef { id });
    }
}
