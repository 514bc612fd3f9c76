//! Notification records and the builder that produces them
//!
//! A caller describes a notification with [`NotificationSpec`] and hands it to
//! the controller. The request is split into two halves on submission:
//!
//! - [`NotificationRecord`] - immutable, cloneable data that a rendering layer
//!   can snapshot freely
//! - [`NotificationCallbacks`] - the `on_action` / `on_dismiss` hooks, which
//!   are `FnOnce` and therefore can fire at most once each
//!
//! # Example
//!
//! ```rust
//! use herald_core::{NotificationDuration, NotificationSpec, Severity};
//!
//! let (record, callbacks) = NotificationSpec::success("Post saved")
//!     .with_action("Undo", || println!("undo"))
//!     .build();
//!
//! assert_eq!(record.severity(), Severity::Success);
//! assert_eq!(record.action_label(), Some("Undo"));
//! // Actionable notifications stay up until handled
//! assert_eq!(record.duration(), NotificationDuration::Indefinite);
//! assert!(callbacks.has_action());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Callback invoked when a notification is acted on or dismissed
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Unique notification identifier
///
/// Ids are random; comparing two ids says nothing about creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification severity
///
/// Carries no behaviour in the queue; it is passed through to whatever
/// renders the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral style
    #[default]
    Default,
    /// Informational notification
    Info,
    /// Success notification
    Success,
    /// Warning notification
    Warning,
    /// Error notification
    Error,
}

impl Severity {
    /// Get the lowercase name used in serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Default => "default",
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// How long a notification stays displayed before it dismisses itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationDuration {
    /// Short display, resolved from controller configuration
    #[default]
    Short,
    /// Long display, resolved from controller configuration
    Long,
    /// Never dismissed automatically
    Indefinite,
    /// Explicit display time
    Custom(Duration),
}

impl NotificationDuration {
    /// Build an explicit duration from a signed millisecond count
    ///
    /// Negative and zero values are coerced to [`NotificationDuration::Short`].
    /// A zero timer could retire the notification before `show` hands back
    /// its id.
    pub fn from_millis(millis: i64) -> Self {
        match u64::try_from(millis) {
            Ok(0) => {
                tracing::warn!("Zero notification duration, using short");
                NotificationDuration::Short
            }
            Ok(ms) => NotificationDuration::Custom(Duration::from_millis(ms)),
            Err(_) => {
                tracing::warn!("Negative notification duration {}ms, using short", millis);
                NotificationDuration::Short
            }
        }
    }

    /// Check if this duration never expires
    pub fn is_indefinite(&self) -> bool {
        matches!(self, NotificationDuration::Indefinite)
    }

    /// Resolve to a concrete timeout
    ///
    /// Returns `None` for [`NotificationDuration::Indefinite`]. A zero
    /// `Custom` duration resolves like `Short`.
    pub fn resolve(&self, short: Duration, long: Duration) -> Option<Duration> {
        match self {
            NotificationDuration::Short => Some(short),
            NotificationDuration::Long => Some(long),
            NotificationDuration::Indefinite => None,
            NotificationDuration::Custom(duration) if duration.is_zero() => Some(short),
            NotificationDuration::Custom(duration) => Some(*duration),
        }
    }
}

/// Immutable description of one notification
///
/// Produced by [`NotificationSpec::build`]. There are no setters: once a
/// record exists, only its position in the controller's queue changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    id: NotificationId,
    message: String,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_label: Option<String>,
    duration: NotificationDuration,
    manually_dismissible: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Unique identifier
    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// Message text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity passed through to the renderer
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Label of the action affordance, if any
    pub fn action_label(&self) -> Option<&str> {
        self.action_label.as_deref()
    }

    /// Check if the notification offers an action
    pub fn has_action(&self) -> bool {
        self.action_label.is_some()
    }

    /// Display duration
    pub fn duration(&self) -> NotificationDuration {
        self.duration
    }

    /// Whether the user may swipe or close the notification away
    pub fn is_manually_dismissible(&self) -> bool {
        self.manually_dismissible
    }

    /// When the notification was requested
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Callbacks attached to a notification
///
/// Each hook is consumed when it fires, so neither can run twice.
#[derive(Default)]
pub struct NotificationCallbacks {
    on_action: Option<Callback>,
    on_dismiss: Option<Callback>,
}

impl NotificationCallbacks {
    /// Create an empty callback set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action callback is attached
    pub fn has_action(&self) -> bool {
        self.on_action.is_some()
    }

    /// Check if a dismiss callback is attached
    pub fn has_dismiss(&self) -> bool {
        self.on_dismiss.is_some()
    }

    /// Take the action callback, leaving `None` behind
    pub fn take_action(&mut self) -> Option<Callback> {
        self.on_action.take()
    }

    /// Take the dismiss callback, leaving `None` behind
    pub fn take_dismiss(&mut self) -> Option<Callback> {
        self.on_dismiss.take()
    }
}

impl fmt::Debug for NotificationCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCallbacks")
            .field("on_action", &self.has_action())
            .field("on_dismiss", &self.has_dismiss())
            .finish()
    }
}

/// Request to show a notification
///
/// Builder in the usual `with_*` style. Construction never fails: odd input
/// is coerced or logged rather than rejected.
pub struct NotificationSpec {
    message: String,
    severity: Severity,
    action_label: Option<String>,
    duration: Option<NotificationDuration>,
    manually_dismissible: bool,
    callbacks: NotificationCallbacks,
}

impl NotificationSpec {
    /// Create a new notification request with default settings
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Default,
            action_label: None,
            duration: None,
            manually_dismissible: true,
            callbacks: NotificationCallbacks::new(),
        }
    }

    /// Create a success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Success)
    }

    /// Create an error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Error)
    }

    /// Create a warning notification
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Warning)
    }

    /// Create an info notification
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Info)
    }

    /// Set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set display duration
    pub fn with_duration(mut self, duration: NotificationDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Make persistent (no auto-dismiss)
    pub fn persistent(self) -> Self {
        self.with_duration(NotificationDuration::Indefinite)
    }

    /// Add an action button with its callback
    pub fn with_action<F>(mut self, label: impl Into<String>, on_action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.action_label = Some(label.into());
        self.callbacks.on_action = Some(Box::new(on_action));
        self
    }

    /// Add an action button without a callback
    ///
    /// Useful when the caller only listens for controller events.
    pub fn with_action_label(mut self, label: impl Into<String>) -> Self {
        self.action_label = Some(label.into());
        self
    }

    /// Set the dismiss callback
    pub fn on_dismiss<F>(mut self, on_dismiss: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.callbacks.on_dismiss = Some(Box::new(on_dismiss));
        self
    }

    /// Set whether the user may dismiss the notification by hand
    pub fn with_manual_dismiss(mut self, allowed: bool) -> Self {
        self.manually_dismissible = allowed;
        self
    }

    /// Duration the built record will carry
    ///
    /// Without an explicit duration, actionable notifications are
    /// indefinite and everything else is short.
    pub fn effective_duration(&self) -> NotificationDuration {
        match self.duration {
            Some(duration) => duration,
            None if self.action_label.is_some() => NotificationDuration::Indefinite,
            None => NotificationDuration::Short,
        }
    }

    /// Split into the immutable record and its callbacks
    pub fn build(self) -> (NotificationRecord, NotificationCallbacks) {
        if self.message.is_empty() {
            tracing::warn!("Building notification with an empty message");
        }

        let duration = self.effective_duration();
        let record = NotificationRecord {
            id: NotificationId::new(),
            message: self.message,
            severity: self.severity,
            action_label: self.action_label,
            duration,
            manually_dismissible: self.manually_dismissible,
            created_at: Utc::now(),
        };

        (record, self.callbacks)
    }
}

impl fmt::Debug for NotificationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationSpec")
            .field("message", &self.message)
            .field("severity", &self.severity)
            .field("action_label", &self.action_label)
            .field("duration", &self.duration)
            .field("manually_dismissible", &self.manually_dismissible)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
