//! Incident submission pipeline.
//!
//! One submission renders the templates, logs in, resolves every configured
//! category, posts the incident and logs out:
//!
//! ```text
//! Idle -> LoggingIn -> ResolvingCategories -> Posting -> LoggingOut -> Done
//!                              |                 |
//!                              +-----------------+---> LoggingOut -> Aborted
//! ```
//!
//! Nothing is retried. A category without a backend match stops the
//! submission before posting and is reported as
//! [`SubmissionOutcome::Aborted`], not as an error.

use std::sync::Arc;

use serde::Serialize;
use tracing::info_span;
use uuid::Uuid;

use crate::category::{Category, CategoryResolver};
use crate::config::IncidentConfig;
use crate::error::{NotifyError, Result};
use crate::observer::{SubmissionEvent, SubmissionObserver, SubmissionState, TracingObserver};
use crate::optional_fields::OptionalFieldGroups;
use crate::payload::IncidentPayload;
use crate::session::Session;
use crate::template::{render, AlertEvent};
use crate::transport::HttpTransport;
use crate::validate;

/// Path of the create-incident call.
pub const INCIDENTS_PATH: &str = "/tas/api/incidents/";

/// Status TOPdesk answers with when the incident was created.
pub const CREATED_STATUS: u16 = 201;

/// Templates rendered against one alert event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedIncident {
    /// Rendered description.
    pub description: String,
    /// Rendered optional-fields definition, not yet parsed.
    pub optional_fields: String,
}

/// How a submission ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The incident was created.
    Created {
        /// Response body returned by TOPdesk.
        response: String,
    },
    /// A category name had no backend match; nothing was posted.
    Aborted {
        /// The category that failed to resolve.
        category: Category,
        /// The configured name.
        name: String,
    },
}

impl SubmissionOutcome {
    /// Returns true if the incident was created.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Submits incidents for alert events.
#[derive(Debug, Clone)]
pub struct IncidentSubmitter {
    config: IncidentConfig,
    transport: Arc<dyn HttpTransport>,
    observer: Arc<dyn SubmissionObserver>,
}

impl IncidentSubmitter {
    /// Creates a submitter reporting through [`TracingObserver`].
    #[must_use]
    pub fn new(config: IncidentConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &IncidentConfig {
        &self.config
    }

    /// Renders the description and optional-fields templates.
    #[must_use]
    pub fn render(&self, event: &AlertEvent) -> RenderedIncident {
        let context = event.context();
        RenderedIncident {
            description: render(self.config.description.as_deref().unwrap_or_default(), &context),
            optional_fields: render(
                self.config.optional_fields.as_deref().unwrap_or_default(),
                &context,
            ),
        }
    }

    /// Renders the templates for `event` and submits the incident.
    ///
    /// # Errors
    ///
    /// See [`IncidentSubmitter::submit_rendered`].
    pub fn submit(&self, event: &AlertEvent) -> Result<SubmissionOutcome> {
        let rendered = self.render(event);
        tracing::debug!(
            description = %rendered.description,
            optional_fields = %rendered.optional_fields,
            "rendered incident"
        );
        self.submit_rendered(&rendered)
    }

    /// Runs login, category resolution, creation and logout.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Config` for an invalid configuration, before any
    /// call is made. Otherwise returns transport and login errors, rejected
    /// or malformed lookup responses, and
    /// `NotifyError::CreationRejected` when TOPdesk does not answer
    /// [`CREATED_STATUS`].
    pub fn submit_rendered(&self, rendered: &RenderedIncident) -> Result<SubmissionOutcome> {
        let span = info_span!("submission", id = %Uuid::new_v4());
        let _guard = span.enter();

        validate::validate(&self.config)?;
        let mode = validate::login_mode(&self.config)?;
        self.emit(SubmissionEvent::StateChanged(SubmissionState::Idle));

        let result = Session::scope(
            self.transport.as_ref(),
            &self.config,
            mode,
            self.observer.as_ref(),
            |session| self.create_incident(session, rendered),
        );

        let terminal = match &result {
            Ok(SubmissionOutcome::Created { .. }) => SubmissionState::Done,
            _ => SubmissionState::Aborted,
        };
        self.emit(SubmissionEvent::StateChanged(terminal));

        result
    }

    fn create_incident(
        &self,
        session: &Session<'_>,
        rendered: &RenderedIncident,
    ) -> Result<SubmissionOutcome> {
        self.emit(SubmissionEvent::StateChanged(
            SubmissionState::ResolvingCategories,
        ));

        let groups = OptionalFieldGroups::parse(&rendered.optional_fields);
        let mut payload = IncidentPayload::new(&self.config, rendered.description.clone(), groups);

        let resolver = CategoryResolver::new(session.transport(), session.token());
        let base_url = self.config.api_url("");
        for category in Category::ALL {
            let Some(name) = self.config.category_name(category) else {
                continue;
            };

            let Some(id) = resolver.resolve(&base_url, category, name)? else {
                self.emit(SubmissionEvent::CategoryNotFound {
                    category,
                    name: name.to_string(),
                });
                return Ok(SubmissionOutcome::Aborted {
                    category,
                    name: name.to_string(),
                });
            };

            self.emit(SubmissionEvent::CategoryResolved {
                category,
                name: name.to_string(),
                id: id.clone(),
            });
            payload.set_resolved(category, id);
        }

        self.emit(SubmissionEvent::StateChanged(SubmissionState::Posting));
        let body = serde_json::to_value(&payload)?;
        let response = session.transport().post_json(
            &self.config.api_url(INCIDENTS_PATH),
            &session.auth(),
            &body,
        )?;

        if response.status != CREATED_STATUS {
            self.emit(SubmissionEvent::IncidentRejected {
                status: response.status,
                body: response.body.clone(),
            });
            return Err(NotifyError::CreationRejected {
                status: response.status,
                body: response.body,
            });
        }

        self.emit(SubmissionEvent::IncidentCreated {
            response: response.body.clone(),
        });
        Ok(SubmissionOutcome::Created {
            response: response.body,
        })
    }

    fn emit(&self, event: SubmissionEvent) {
        self.observer.observe(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Password;
    use crate::template::LogRecord;
    use crate::transport::mock::MockTransport;
    use crate::transport::HttpResponse;
    use chrono::{TimeZone, Utc};

    fn config() -> IncidentConfig {
        IncidentConfig {
            endpoint: Some("https://td".to_string()),
            username: Some("user".to_string()),
            password: Some(Password::new("pass")),
            login_mode: Some("operator".to_string()),
            caller_email: Some("foo@bar.com".to_string()),
            summary: Some("summary".to_string()),
            description: Some("%stream%: %src_ip%".to_string()),
            optional_fields: Some("optionalFields1:ip:%src_ip%".to_string()),
            ..IncidentConfig::default()
        }
    }

    fn event() -> AlertEvent {
        AlertEvent::new("Firewall", Utc.with_ymd_and_hms(2015, 11, 18, 12, 7, 0).unwrap())
            .with_record(LogRecord::new().with_field("src_ip", "123.123.321.321"))
    }

    fn transport() -> MockTransport {
        MockTransport::new()
            .respond("/tas/api/login/operator", HttpResponse::new(200, "tok"))
            .respond(INCIDENTS_PATH, HttpResponse::new(201, r#"{"number":"I 1511 001"}"#))
            .respond("/tas/api/logout", HttpResponse::new(204, ""))
    }

    #[test]
    fn render_both_templates() {
        let submitter = IncidentSubmitter::new(config(), Arc::new(MockTransport::new()));
        let rendered = submitter.render(&event());

        assert_eq!(rendered.description, "Firewall: 123.123.321.321");
        assert_eq!(rendered.optional_fields, "optionalFields1:ip:123.123.321.321");
    }

    #[test]
    fn render_without_templates() {
        let config = IncidentConfig {
            description: None,
            optional_fields: None,
            ..config()
        };
        let submitter = IncidentSubmitter::new(config, Arc::new(MockTransport::new()));

        assert_eq!(submitter.render(&event()), RenderedIncident::default());
    }

    #[test]
    fn submit_creates_incident() {
        let transport = Arc::new(transport());
        let submitter = IncidentSubmitter::new(config(), transport.clone());

        let outcome = submitter.submit(&event()).unwrap();

        assert!(outcome.is_created());
        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        let body = calls[1].body.as_ref().unwrap();
        assert_eq!(body["request"], "Firewall: 123.123.321.321");
        assert_eq!(body["optionalFields1"]["ip"], "123.123.321.321");
        assert_eq!(calls[1].authorization, "TOKEN id=\"tok\"");
    }

    #[test]
    fn unknown_login_mode_makes_no_calls() {
        let transport = Arc::new(transport());
        let config = IncidentConfig {
            login_mode: Some("robot".to_string()),
            ..config()
        };
        let submitter = IncidentSubmitter::new(config, transport.clone());

        let err = submitter.submit(&event()).unwrap_err();

        assert!(err.is_config());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn missing_endpoint_makes_no_calls() {
        let transport = Arc::new(transport());
        let config = IncidentConfig {
            endpoint: None,
            ..config()
        };
        let submitter = IncidentSubmitter::new(config, transport.clone());

        let err = submitter.submit(&event()).unwrap_err();

        match err {
            NotifyError::Config(e) => assert_eq!(e.field, "endpoint"),
            other => panic!("expected Config, got {other:?}"),
        }
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn too_many_optional_fields_make_no_calls() {
        let transport = Arc::new(transport());
        let config = IncidentConfig {
            optional_fields: Some(vec!["g1:k:v"; 11].join(",")),
            ..config()
        };
        let submitter = IncidentSubmitter::new(config, transport.clone());

        let err = submitter.submit(&event()).unwrap_err();

        assert!(err.is_config());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn rejected_lookup_is_an_error_and_logs_out() {
        let transport = Arc::new(
            transport().respond("/tas/api/incidents/priorities", HttpResponse::new(500, "")),
        );
        let config = IncidentConfig {
            priority: Some("P1".to_string()),
            ..config()
        };
        let submitter = IncidentSubmitter::new(config, transport.clone());

        let err = submitter.submit(&event()).unwrap_err();

        assert!(matches!(err, NotifyError::LookupRejected { status: 500, .. }));
        let calls = transport.calls();
        assert!(calls.iter().all(|c| c.method == "GET"));
        assert!(calls.last().unwrap().url.ends_with("/tas/api/logout"));
    }

    #[test]
    fn rejected_creation_is_an_error() {
        let transport = Arc::new(
            MockTransport::new()
                .respond("/tas/api/login/operator", HttpResponse::new(200, "tok"))
                .respond(INCIDENTS_PATH, HttpResponse::new(400, "caller unknown"))
                .respond("/tas/api/logout", HttpResponse::new(204, "")),
        );
        let submitter = IncidentSubmitter::new(config(), transport.clone());

        let err = submitter.submit(&event()).unwrap_err();

        match err {
            NotifyError::CreationRejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "caller unknown");
            }
            other => panic!("expected CreationRejected, got {other:?}"),
        }
        assert_eq!(transport.calls().len(), 3);
    }

    #[test]
    fn unresolved_category_aborts() {
        let transport = Arc::new(
            transport().respond(
                "/tas/api/incidents/priorities",
                HttpResponse::new(200, r#"[{"name":"P1","id":"p-1"}]"#),
            ),
        );
        let config = IncidentConfig {
            priority: Some("P9".to_string()),
            ..config()
        };
        let submitter = IncidentSubmitter::new(config, transport.clone());

        let outcome = submitter.submit(&event()).unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::Aborted {
                category: Category::Priority,
                name: "P9".to_string()
            }
        );
        let calls = transport.calls();
        assert!(calls.iter().all(|c| c.method == "GET"));
        assert!(calls.last().unwrap().url.ends_with("/tas/api/logout"));
    }
}
