//! Core notification types for Herald
//!
//! This crate provides the plain data shared by the notification queue:
//! identifiers, severities, durations, the immutable notification record,
//! its callbacks, the builder used to request a notification, and the
//! controller configuration.
//!
//! Nothing in this crate owns lifecycle state. A [`NotificationRecord`] never
//! changes after [`NotificationSpec::build`] produces it; where a record is
//! (pending, displayed, retired) is tracked by the controller in `herald-state`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod record;

pub use config::{
    ControllerConfig, DisplayMode, DEFAULT_EVENT_CAPACITY, DEFAULT_LONG_DURATION_MS,
    DEFAULT_SHORT_DURATION_MS,
};
pub use error::{ControllerError, Result};
pub use record::{
    Callback, NotificationCallbacks, NotificationDuration, NotificationId, NotificationRecord,
    NotificationSpec, Severity,
};
