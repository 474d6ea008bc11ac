//! Declarative description of the configuration form.
//!
//! Hosts render these fields to let an operator configure the adapter.
//! Required-ness here is display metadata; [`crate::validate`] decides what
//! is actually enforced.

use serde::Serialize;

use crate::config::{keys, LoginMode};

/// How a field is presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Free text that must be masked.
    Password,
    /// One of a fixed set of options, as `(value, label)` pairs.
    Dropdown {
        /// Available options.
        options: Vec<(String, String)>,
    },
    /// On/off switch.
    Boolean,
}

/// One configurable setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigField {
    /// Configuration key.
    pub name: &'static str,
    /// Label shown to the operator.
    pub human_name: &'static str,
    /// Default value, as text.
    pub default_value: String,
    /// Help text.
    pub description: &'static str,
    /// Whether the form marks the field as mandatory.
    pub required: bool,
    /// Presentation.
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl ConfigField {
    fn text(name: &'static str, human_name: &'static str, required: bool) -> Self {
        Self {
            name,
            human_name,
            default_value: String::new(),
            description: "",
            required,
            kind: FieldKind::Text,
        }
    }

    fn boolean(name: &'static str, human_name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            human_name,
            default_value: false.to_string(),
            description,
            required: false,
            kind: FieldKind::Boolean,
        }
    }

    fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Returns the configuration form, in display order.
#[must_use]
pub fn requested_configuration() -> Vec<ConfigField> {
    let login_modes = LoginMode::ALL
        .iter()
        .map(|mode| (mode.as_str().to_string(), mode.as_str().to_string()))
        .collect();

    vec![
        ConfigField::text(keys::ENDPOINT, "Endpoint", true)
            .with_default("https://topdesk/")
            .with_description("The base url of Topdesk."),
        ConfigField::text(keys::USERNAME, "Username", true),
        ConfigField::text(keys::PASSWORD, "Password", true).with_kind(FieldKind::Password),
        ConfigField::text(keys::LOGIN_MODE, "Login Mode", true)
            .with_default(LoginMode::default().as_str())
            .with_kind(FieldKind::Dropdown {
                options: login_modes,
            }),
        ConfigField::text(keys::CALLER_EMAIL, "Caller email", true),
        ConfigField::text(keys::PRIORITY, "Priority", false),
        ConfigField::text(keys::ENTRY_TYPE, "Entry type", false),
        ConfigField::text(keys::CALL_TYPE, "Call type", false),
        ConfigField::text(keys::OBJECT, "Object", false),
        ConfigField::text(keys::IMPACT, "Impact", false),
        ConfigField::text(keys::URGENCY, "Urgency", false),
        ConfigField::text(keys::SUMMARY, "Summary", true),
        ConfigField::text(keys::OPERATOR_GROUP, "Operator group", false),
        ConfigField::text(keys::CATEGORY, "Category", true),
        ConfigField::text(keys::SUBCATEGORY, "Subcategory", false),
        ConfigField::text(keys::DESCRIPTION, "Description", false).with_description(
            "Full description for the incident. Use %fieldname% placeholders to replace with \
             fields from the first message. Use %stream% for stream name and %triggeredAt% for \
             triggered timestamp.",
        ),
        ConfigField::boolean(keys::SECOND_LINE, "Second Line", ""),
        ConfigField::text(keys::OPTIONAL_FIELDS, "Optional fields", false).with_description(
            "Comma separated list of at most 5 optional fields (format is \
             optionalFields1:key:value or optionalFields2:key:value) to add to the incident. \
             Use %fieldname% placeholders to replace with fields from the first message.",
        ),
        ConfigField::boolean(
            keys::INSECURE_SKIP_VERIFY,
            "Skip TLS verification",
            "Accept self-signed or otherwise invalid certificates from Topdesk.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> ConfigField {
        requested_configuration()
            .into_iter()
            .find(|f| f.name == name)
            .unwrap()
    }

    #[test]
    fn field_order() {
        let names: Vec<_> = requested_configuration().iter().map(|f| f.name).collect();
        assert_eq!(names.first(), Some(&keys::ENDPOINT));
        assert_eq!(names.last(), Some(&keys::INSECURE_SKIP_VERIFY));
        assert_eq!(names.len(), 19);
    }

    #[test]
    fn endpoint_default() {
        let endpoint = field(keys::ENDPOINT);
        assert_eq!(endpoint.default_value, "https://topdesk/");
        assert!(endpoint.required);
    }

    #[test]
    fn password_is_masked_kind() {
        assert_eq!(field(keys::PASSWORD).kind, FieldKind::Password);
    }

    #[test]
    fn login_mode_dropdown() {
        let login_mode = field(keys::LOGIN_MODE);
        assert_eq!(login_mode.default_value, "person");
        match login_mode.kind {
            FieldKind::Dropdown { options } => {
                let values: Vec<_> = options.iter().map(|(v, _)| v.as_str()).collect();
                assert_eq!(values, ["person", "operator"]);
            }
            other => panic!("expected dropdown, got {other:?}"),
        }
    }

    #[test]
    fn insecure_skip_verify_defaults_off() {
        let field = field(keys::INSECURE_SKIP_VERIFY);
        assert_eq!(field.kind, FieldKind::Boolean);
        assert_eq!(field.default_value, "false");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(field(keys::SECOND_LINE)).unwrap();
        assert_eq!(json["type"], "boolean");
        assert_eq!(json["name"], "second_line");
    }
}
