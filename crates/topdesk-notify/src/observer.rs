//! Structured submission events.
//!
//! The submitter reports its progress through a [`SubmissionObserver`]
//! instead of a process-wide logger. [`TracingObserver`] forwards every
//! event to `tracing` and is used when the host does not inject its own.

use std::fmt;

use crate::category::Category;

/// Stages of one incident submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    /// Nothing has happened yet.
    Idle,
    /// Requesting a session token.
    LoggingIn,
    /// Looking up category identifiers.
    ResolvingCategories,
    /// Creating the incident.
    Posting,
    /// Invalidating the session token.
    LoggingOut,
    /// The incident was created and the session closed.
    Done,
    /// The submission stopped before the incident was created.
    Aborted,
}

impl SubmissionState {
    /// Returns the state as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoggingIn => "logging_in",
            Self::ResolvingCategories => "resolving_categories",
            Self::Posting => "posting",
            Self::LoggingOut => "logging_out",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns true for `Done` and `Aborted`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened during a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// The submission moved to a new state.
    StateChanged(SubmissionState),
    /// A category name was resolved.
    CategoryResolved {
        /// The category.
        category: Category,
        /// The configured name.
        name: String,
        /// The backend identifier.
        id: String,
    },
    /// A category name has no backend match; no incident is created.
    CategoryNotFound {
        /// The category.
        category: Category,
        /// The configured name.
        name: String,
    },
    /// TOPdesk accepted the incident.
    IncidentCreated {
        /// Response body.
        response: String,
    },
    /// TOPdesk rejected the incident.
    IncidentRejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The logout call failed; the error is not escalated.
    LogoutFailed {
        /// What went wrong.
        reason: String,
    },
}

/// Receives submission events.
pub trait SubmissionObserver: Send + Sync + fmt::Debug {
    /// Called for every event, in order.
    fn observe(&self, event: &SubmissionEvent);
}

/// Observer that emits every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SubmissionObserver for TracingObserver {
    fn observe(&self, event: &SubmissionEvent) {
        match event {
            SubmissionEvent::StateChanged(state) => {
                tracing::debug!(state = %state, "submission state changed");
            }
            SubmissionEvent::CategoryResolved { category, name, id } => {
                tracing::debug!(category = %category, name = %name, id = %id, "category resolved");
            }
            SubmissionEvent::CategoryNotFound { category, name } => {
                tracing::error!(
                    category = %category,
                    name = %name,
                    "no ID found for name, not creating incident"
                );
            }
            SubmissionEvent::IncidentCreated { response } => {
                tracing::info!(response = %response, "incident created");
            }
            SubmissionEvent::IncidentRejected { status, body } => {
                tracing::error!(status, body = %body, "incident creation failed");
            }
            SubmissionEvent::LogoutFailed { reason } => {
                tracing::warn!(reason = %reason, "logout failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(SubmissionState::Done.is_terminal());
        assert!(SubmissionState::Aborted.is_terminal());
        assert!(!SubmissionState::Posting.is_terminal());
        assert!(!SubmissionState::Idle.is_terminal());
    }

    #[test]
    fn state_display() {
        assert_eq!(
            SubmissionState::ResolvingCategories.to_string(),
            "resolving_categories"
        );
        assert_eq!(SubmissionState::LoggingOut.to_string(), "logging_out");
    }

    #[test]
    fn tracing_observer_accepts_every_event() {
        let observer = TracingObserver;
        let events = [
            SubmissionEvent::StateChanged(SubmissionState::LoggingIn),
            SubmissionEvent::CategoryResolved {
                category: Category::Priority,
                name: "P1".to_string(),
                id: "1".to_string(),
            },
            SubmissionEvent::CategoryNotFound {
                category: Category::Urgency,
                name: "Whenever".to_string(),
            },
            SubmissionEvent::IncidentCreated {
                response: "{}".to_string(),
            },
            SubmissionEvent::IncidentRejected {
                status: 400,
                body: "bad".to_string(),
            },
            SubmissionEvent::LogoutFailed {
                reason: "timeout".to_string(),
            },
        ];

        for event in &events {
            observer.observe(event);
        }
    }
}
