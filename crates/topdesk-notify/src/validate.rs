//! Configuration validation.
//!
//! Runs before any network activity. Category names are not checked against
//! TOPdesk here; an unknown name surfaces when an incident is submitted.

use crate::config::{keys, IncidentConfig, LoginMode};
use crate::error::{ConfigError, ConfigErrorKind};
use crate::optional_fields::{split_segments, ENTRY_SEPARATOR, PART_SEPARATOR};

/// Maximum number of optional-field entries.
pub const MAX_OPTIONAL_FIELDS: usize = 5;

/// Number of parts in an optional-field entry (`group:key:value`).
pub const OPTIONAL_FIELD_PARTS: usize = 3;

/// Checks that `config` can be used to submit incidents.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found: a missing endpoint, password or
/// login mode, an unknown login mode, more than [`MAX_OPTIONAL_FIELDS`]
/// optional-field entries, or an entry that is not `group:key:value`.
pub fn validate(config: &IncidentConfig) -> Result<(), ConfigError> {
    if config.endpoint.is_none() {
        return Err(ConfigError::missing(keys::ENDPOINT));
    }
    if config.password.is_none() {
        return Err(ConfigError::missing(keys::PASSWORD));
    }
    login_mode(config)?;

    if let Some(optional_fields) = &config.optional_fields {
        validate_optional_fields(optional_fields)?;
    }

    Ok(())
}

/// Returns the configured login mode.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the mode is unset or unknown.
pub fn login_mode(config: &IncidentConfig) -> Result<LoginMode, ConfigError> {
    config
        .login_mode
        .as_deref()
        .ok_or_else(|| ConfigError::missing(keys::LOGIN_MODE))?
        .parse()
}

/// Checks entry count and shape of an optional-fields string.
///
/// # Errors
///
/// Returns a [`ConfigError`] for too many or malformed entries.
pub fn validate_optional_fields(optional_fields: &str) -> Result<(), ConfigError> {
    let entries = split_segments(optional_fields, ENTRY_SEPARATOR);
    if entries.len() > MAX_OPTIONAL_FIELDS {
        return Err(ConfigError::new(
            keys::OPTIONAL_FIELDS,
            ConfigErrorKind::TooManyOptionalFields {
                max: MAX_OPTIONAL_FIELDS,
                actual: entries.len(),
            },
        ));
    }

    if let Some(entry) = entries
        .iter()
        .find(|entry| split_segments(entry, PART_SEPARATOR).len() != OPTIONAL_FIELD_PARTS)
    {
        return Err(ConfigError::new(
            keys::OPTIONAL_FIELDS,
            ConfigErrorKind::MalformedOptionalField {
                entry: (*entry).to_string(),
            },
        ));
    }

    Ok(())
}
