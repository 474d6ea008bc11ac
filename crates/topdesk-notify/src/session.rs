//! TOPdesk API sessions.
//!
//! A session token is obtained with Basic credentials and passed to every
//! later call. [`Session::scope`] ties the token to a closure: whatever the
//! closure returns, the token is invalidated afterwards.

use std::fmt;

use tracing::debug;

use crate::config::{IncidentConfig, LoginMode, Password};
use crate::error::{NotifyError, Result};
use crate::observer::{SubmissionEvent, SubmissionObserver, SubmissionState};
use crate::transport::{Auth, HttpTransport};

/// Path of the logout call.
pub const LOGOUT_PATH: &str = "/tas/api/logout";

/// Returns the login path for a mode.
#[must_use]
pub fn login_path(mode: LoginMode) -> String {
    format!("/tas/api/login/{mode}")
}

/// An authenticated session.
pub struct Session<'a> {
    transport: &'a dyn HttpTransport,
    config: &'a IncidentConfig,
    token: String,
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.config.endpoint)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl<'a> Session<'a> {
    /// Logs in and returns the session.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if the request fails and
    /// `NotifyError::LoginRejected` for a non-success status.
    pub fn login(
        transport: &'a dyn HttpTransport,
        config: &'a IncidentConfig,
        mode: LoginMode,
    ) -> Result<Self> {
        let auth = Auth::Basic {
            username: config.username.clone().unwrap_or_default(),
            password: config.password.clone().unwrap_or_else(|| Password::new("")),
        };
        let response = transport.get(&config.api_url(&login_path(mode)), &auth)?;
        if !response.is_success() {
            return Err(NotifyError::LoginRejected {
                status: response.status,
                body: response.body,
            });
        }

        debug!(mode = %mode, "logged in");
        Ok(Self {
            transport,
            config,
            token: response.body,
        })
    }

    /// Runs `f` inside a session and always logs out afterwards.
    ///
    /// Logout failures are reported to `observer` and never change the
    /// result of `f`.
    ///
    /// # Errors
    ///
    /// Returns the login error, or whatever `f` returned.
    pub fn scope<T>(
        transport: &'a dyn HttpTransport,
        config: &'a IncidentConfig,
        mode: LoginMode,
        observer: &dyn SubmissionObserver,
        f: impl FnOnce(&Session<'a>) -> Result<T>,
    ) -> Result<T> {
        observer.observe(&SubmissionEvent::StateChanged(SubmissionState::LoggingIn));
        let session = Self::login(transport, config, mode)?;

        let result = f(&session);

        observer.observe(&SubmissionEvent::StateChanged(SubmissionState::LoggingOut));
        if let Err(e) = session.logout() {
            observer.observe(&SubmissionEvent::LogoutFailed {
                reason: e.to_string(),
            });
        }

        result
    }

    /// Returns the session token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the credentials for authenticated calls.
    #[must_use]
    pub fn auth(&self) -> Auth {
        Auth::Token(self.token.clone())
    }

    /// Returns the transport the session was opened on.
    #[must_use]
    pub fn transport(&self) -> &'a dyn HttpTransport {
        self.transport
    }

    /// Invalidates the token.
    fn logout(self) -> Result<()> {
        let url = self.config.api_url(LOGOUT_PATH);
        let response = self.transport.get(&url, &self.auth())?;
        if !response.is_success() {
            return Err(NotifyError::transport(
                "logout",
                format!("status {}: {}", response.status, response.body),
            ));
        }
        debug!("logged out");
        Ok(())
    }
}
