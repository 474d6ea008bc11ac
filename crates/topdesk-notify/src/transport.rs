//! HTTP transport for the TOPdesk REST API.
//!
//! The pipeline talks to TOPdesk only through the [`HttpTransport`] trait.
//! [`ReqwestTransport`] is the production implementation; tests substitute
//! a recording transport to check which calls were made and in what order.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::warn;

use crate::config::{IncidentConfig, Password};
use crate::error::{NotifyError, Result};

/// Credentials attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP Basic credentials, used for login only.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: Password,
    },
    /// Session token returned by login.
    Token(String),
}

impl Auth {
    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{}", password.expose()));
                format!("Basic {encoded}")
            }
            Self::Token(token) => format!("TOKEN id=\"{token}\""),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Token(_) => f.debug_tuple("Token").field(&"[REDACTED]").finish(),
        }
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Blocking HTTP access to the ticketing API.
///
/// Non-success statuses are not errors at this level; callers decide.
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Issues a GET request.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if the request cannot be completed.
    fn get(&self, url: &str, auth: &Auth) -> Result<HttpResponse>;

    /// Issues a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if the request cannot be completed.
    fn post_json(&self, url: &str, auth: &Auth, body: &Value) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a client from the TLS and timeout settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if the TLS backend cannot be set up.
    pub fn new(config: &IncidentConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();

        if config.insecure_skip_verify {
            warn!("TLS certificate verification is disabled for the TOPdesk endpoint");
            builder = builder.danger_accept_invalid_certs(true);
        }

        // No deadline unless configured.
        builder = builder.timeout(config.timeout_secs.map(Duration::from_secs));

        let client = builder
            .build()
            .map_err(|e| NotifyError::transport("client setup", e))?;
        Ok(Self { client })
    }

    fn execute(&self, call: &str, request: reqwest::blocking::RequestBuilder) -> Result<HttpResponse> {
        let response = request
            .send()
            .map_err(|e| NotifyError::transport(call, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| NotifyError::transport(call, e))?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, auth: &Auth) -> Result<HttpResponse> {
        let request = self
            .client
            .get(url)
            .header(AUTHORIZATION, auth.header_value());
        self.execute(&format!("GET {url}"), request)
    }

    fn post_json(&self, url: &str, auth: &Auth, body: &Value) -> Result<HttpResponse> {
        let request = self.post_request(url, auth, body);
        self.execute(&format!("POST {url}"), request)
    }
}

impl ReqwestTransport {
    fn post_request(&self, url: &str, auth: &Auth, body: &Value) -> reqwest::blocking::RequestBuilder {
        self.client
            .post(url)
            .header(AUTHORIZATION, auth.header_value())
            .json(body)
    }
}
