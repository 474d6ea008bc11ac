//! Shared helpers for submission tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use topdesk_notify::{
    AlertEvent, Auth, HttpResponse, HttpTransport, IncidentConfig, LogRecord, NotifyError,
    Password, Result, SubmissionEvent, SubmissionObserver, SubmissionState,
};

/// A request seen by [`FakeTopdesk`].
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub authorization: String,
    pub body: Option<Value>,
}

impl Call {
    /// Path and query of the request, without the endpoint.
    pub fn path(&self) -> &str {
        self.url.strip_prefix(ENDPOINT).unwrap_or(&self.url)
    }
}

/// Endpoint used by [`config`].
pub const ENDPOINT: &str = "https://topdesk.test";

/// Token handed out by [`FakeTopdesk`] on login.
pub const TOKEN: &str = "c2Vzc2lvbi10b2tlbg";

/// In-memory TOPdesk that answers by path and records every request.
///
/// Later routes win over earlier ones. Unrouted paths fail like a refused
/// connection.
#[derive(Debug)]
pub struct FakeTopdesk {
    routes: Vec<(&'static str, String, HttpResponse)>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTopdesk {
    /// A backend that accepts logins, logouts and incident creation.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
        .route("GET", "/tas/api/login/person", 200, TOKEN)
        .route("GET", "/tas/api/login/operator", 200, TOKEN)
        .route("GET", "/tas/api/logout", 204, "")
        .route(
            "POST",
            "/tas/api/incidents/",
            201,
            r#"{"id":"d3a2c1b0","number":"I 1511 001"}"#,
        )
    }

    /// Answers `method path` with `status` and `body`.
    pub fn route(mut self, method: &'static str, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .push((method, path.to_string(), HttpResponse::new(status, body)));
        self
    }

    /// Answers a lookup with the given candidates.
    pub fn lookup(self, path: &str, candidates: Value) -> Self {
        self.route("GET", path, 200, &candidates.to_string())
    }

    /// Returns the recorded requests.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Returns `METHOD path` for every recorded request.
    pub fn trace(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| format!("{} {}", call.method, call.path()))
            .collect()
    }

    fn answer(&self, method: &'static str, url: &str, auth: &Auth, body: Option<Value>) -> Result<HttpResponse> {
        let call = Call {
            method,
            url: url.to_string(),
            authorization: auth.header_value(),
            body,
        };
        let path = call.path().to_string();
        self.calls.lock().push(call);

        self.routes
            .iter()
            .rev()
            .find(|(m, p, _)| *m == method && *p == path)
            .map(|(_, _, response)| response.clone())
            .ok_or_else(|| NotifyError::transport(format!("{method} {path}"), "connection refused"))
    }
}

impl HttpTransport for FakeTopdesk {
    fn get(&self, url: &str, auth: &Auth) -> Result<HttpResponse> {
        self.answer("GET", url, auth, None)
    }

    fn post_json(&self, url: &str, auth: &Auth, body: &Value) -> Result<HttpResponse> {
        self.answer("POST", url, auth, Some(body.clone()))
    }
}

/// Observer that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SubmissionEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<SubmissionEvent> {
        self.events.lock().clone()
    }

    pub fn states(&self) -> Vec<SubmissionState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SubmissionEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl SubmissionObserver for RecordingObserver {
    fn observe(&self, event: &SubmissionEvent) {
        self.events.lock().push(event.clone());
    }
}

/// A valid operator configuration with templates and no categories.
pub fn config() -> IncidentConfig {
    IncidentConfig {
        endpoint: Some(format!("{ENDPOINT}/")),
        username: Some("graylog".to_string()),
        password: Some(Password::new("s3cret")),
        login_mode: Some("operator".to_string()),
        caller_email: Some("foo@bar.com".to_string()),
        summary: Some("Firewall alert".to_string()),
        category: Some("Security".to_string()),
        description: Some(
            "Stream %stream% fired at %triggeredAt%, source %src_ip%, hash %sha256%".to_string(),
        ),
        optional_fields: Some(
            "optionalFields1:text1:%src_ip%,optionalFields2:text2:%sha256%".to_string(),
        ),
        ..IncidentConfig::default()
    }
}

/// An alert with one matching record.
pub fn event() -> AlertEvent {
    AlertEvent::new("Firewall", Utc.with_ymd_and_hms(2015, 11, 18, 12, 7, 0).unwrap()).with_record(
        LogRecord::new()
            .with_field("src_ip", "123.123.321.321")
            .with_field("sha256", "soidjfvoisdjfg0983sovsdsg"),
    )
}

pub fn shared(fake: FakeTopdesk) -> Arc<FakeTopdesk> {
    Arc::new(fake)
}
