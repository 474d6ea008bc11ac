//! Host-facing adapter.
//!
//! A monitoring host drives the adapter through the [`AlarmCallback`]
//! trait: it shows [`AlarmCallback::requested_configuration`] to the
//! operator, validates the result, and then calls
//! [`AlarmCallback::call`] once per firing alert.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::config::IncidentConfig;
use crate::error::{ConfigError, Result};
use crate::fields::{requested_configuration, ConfigField};
use crate::observer::SubmissionObserver;
use crate::submitter::{IncidentSubmitter, RenderedIncident, SubmissionOutcome};
use crate::template::AlertEvent;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::validate::validate;

/// Name shown by the host.
pub const ADAPTER_NAME: &str = "Topdesk Alarm Callback";

/// Interface between a monitoring host and an alert notifier.
pub trait AlarmCallback: Send + Sync + fmt::Debug {
    /// Returns the display name.
    fn name(&self) -> &str;

    /// Returns the configuration form.
    fn requested_configuration(&self) -> Vec<ConfigField>;

    /// Checks the current configuration without network access.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    fn check_configuration(&self) -> std::result::Result<(), ConfigError>;

    /// Returns the current configuration with secrets masked.
    fn attributes(&self) -> BTreeMap<String, Value>;

    /// Delivers one alert.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery failed.
    fn call(&self, event: &AlertEvent) -> Result<SubmissionOutcome>;
}

/// Creates TOPdesk incidents for alerts.
#[derive(Debug, Clone)]
pub struct IncidentAdapter {
    submitter: IncidentSubmitter,
}

impl IncidentAdapter {
    /// Validates `config` and builds an adapter that talks to TOPdesk over
    /// HTTPS.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Config` if the configuration is invalid, or a
    /// transport error if the HTTP client cannot be built.
    pub fn initialize(config: IncidentConfig) -> Result<Self> {
        validate(&config)?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::build(config, Arc::new(transport)))
    }

    /// Validates `config` and builds an adapter on the given transport.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn with_transport(
        config: IncidentConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> std::result::Result<Self, ConfigError> {
        validate(&config)?;
        Ok(Self::build(config, transport))
    }

    fn build(config: IncidentConfig, transport: Arc<dyn HttpTransport>) -> Self {
        info!(endpoint = ?config.endpoint, "adapter initialized");
        Self {
            submitter: IncidentSubmitter::new(config, transport),
        }
    }

    /// Replaces the observer used for submission events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.submitter = self.submitter.with_observer(observer);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &IncidentConfig {
        self.submitter.config()
    }

    /// Renders the templates for `event` without submitting anything.
    #[must_use]
    pub fn render(&self, event: &AlertEvent) -> RenderedIncident {
        self.submitter.render(event)
    }
}

impl AlarmCallback for IncidentAdapter {
    fn name(&self) -> &str {
        ADAPTER_NAME
    }

    fn requested_configuration(&self) -> Vec<ConfigField> {
        requested_configuration()
    }

    fn check_configuration(&self) -> std::result::Result<(), ConfigError> {
        validate(self.config())
    }

    fn attributes(&self) -> BTreeMap<String, Value> {
        self.config().attributes()
    }

    fn call(&self, event: &AlertEvent) -> Result<SubmissionOutcome> {
        self.submitter.submit(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Password, PASSWORD_MASK};
    use crate::error::ConfigErrorKind;
    use crate::transport::mock::MockTransport;

    fn config() -> IncidentConfig {
        IncidentConfig {
            endpoint: Some("https://localhost".to_string()),
            username: Some("user".to_string()),
            password: Some(Password::new("pass")),
            login_mode: Some("operator".to_string()),
            ..IncidentConfig::default()
        }
    }

    fn adapter() -> IncidentAdapter {
        IncidentAdapter::with_transport(config(), Arc::new(MockTransport::new())).unwrap()
    }

    #[test]
    fn name() {
        assert_eq!(adapter().name(), "Topdesk Alarm Callback");
    }

    #[test]
    fn valid_configuration_checks() {
        assert!(adapter().check_configuration().is_ok());
    }

    #[test]
    fn invalid_configuration_is_refused() {
        let transport = Arc::new(MockTransport::new());
        let config = IncidentConfig {
            optional_fields: Some("text1:test1,text2:te:st2,text3:test3".to_string()),
            ..config()
        };

        let err = IncidentAdapter::with_transport(config, transport.clone()).unwrap_err();

        assert!(matches!(err.kind, ConfigErrorKind::MalformedOptionalField { .. }));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn initialize_rejects_missing_endpoint() {
        let config = IncidentConfig {
            endpoint: None,
            ..config()
        };
        let err = IncidentAdapter::initialize(config).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn attributes_are_redacted() {
        let attributes = adapter().attributes();
        assert_eq!(attributes.get("password"), Some(&Value::from(PASSWORD_MASK)));
    }

    #[test]
    fn requested_configuration_is_exposed() {
        assert!(!adapter().requested_configuration().is_empty());
    }
}
