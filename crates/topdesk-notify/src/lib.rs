//! TOPdesk incident notifications for log stream alerts.
//!
//! `topdesk-notify` turns a fired log stream alert into a TOPdesk incident.
//! The incident description and optional fields are rendered from
//! `%placeholder%` templates filled with the stream title, the trigger time,
//! and the fields of the first matching log record.
//!
//! # Features
//!
//! - **Validation**: configuration is checked before any network call
//! - **Category resolution**: configured names are mapped to TOPdesk identifiers
//! - **Scoped sessions**: every login is followed by a logout, whatever happens in between
//! - **Structured events**: submission progress is reported through a [`SubmissionObserver`]
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use topdesk_notify::{AlarmCallback, AlertEvent, IncidentAdapter, IncidentConfig, LogRecord};
//!
//! let config = IncidentConfig::from_json(
//!     r#"{
//!         "endpoint": "https://topdesk.example.com",
//!         "username": "api",
//!         "password": "secret",
//!         "login_mode": "operator",
//!         "caller_email": "monitoring@example.com",
//!         "summary": "Firewall alert",
//!         "description": "Blocked traffic from %src_ip% on %stream%"
//!     }"#,
//! )?;
//!
//! let adapter = IncidentAdapter::initialize(config)?;
//!
//! let event = AlertEvent::new("Firewall", Utc::now())
//!     .with_record(LogRecord::new().with_field("src_ip", "10.0.0.7"));
//!
//! let outcome = adapter.call(&event)?;
//! println!("created: {}", outcome.is_created());
//! # Ok::<(), topdesk_notify::NotifyError>(())
//! ```
//!
//! # Rendering only
//!
//! Templates can be rendered without contacting TOPdesk:
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use topdesk_notify::template::{render, LogRecord, RenderContext};
//!
//! let record = LogRecord::new().with_field("src_ip", "10.0.0.7");
//! let context = RenderContext {
//!     stream_title: "Firewall",
//!     triggered_at: Utc.with_ymd_and_hms(2015, 11, 18, 12, 7, 0).unwrap(),
//!     record: Some(&record),
//! };
//!
//! assert_eq!(
//!     render("%stream% %src_ip% %triggeredAt%", &context),
//!     "Firewall 10.0.0.7 2015-11-18 12:07:00+0000"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod category;
pub mod config;
pub mod error;
pub mod fields;
pub mod observer;
pub mod optional_fields;
pub mod payload;
pub mod session;
pub mod submitter;
pub mod template;
pub mod transport;
pub mod validate;

// Re-export main types at crate root
pub use adapter::{AlarmCallback, IncidentAdapter, ADAPTER_NAME};
pub use category::Category;
pub use config::{IncidentConfig, LoginMode, Password};
pub use error::{ConfigError, ConfigErrorKind, NotifyError, Result};
pub use fields::{requested_configuration, ConfigField, FieldKind};
pub use observer::{SubmissionEvent, SubmissionObserver, SubmissionState, TracingObserver};
pub use optional_fields::OptionalFieldGroups;
pub use payload::IncidentPayload;
pub use submitter::{IncidentSubmitter, RenderedIncident, SubmissionOutcome};
pub use template::{AlertEvent, LogRecord};
pub use transport::{Auth, HttpResponse, HttpTransport, ReqwestTransport};
pub use validate::validate;
