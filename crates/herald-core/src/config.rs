//! Controller configuration
//!
//! Configuration is plain serde data so it can live in a JSON file next to the
//! rest of an application's settings. Every field has a default; a config
//! file only needs the fields it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ControllerError, Result};
use crate::record::NotificationDuration;

/// Default display time for [`NotificationDuration::Short`] (4 seconds)
pub const DEFAULT_SHORT_DURATION_MS: u64 = 4_000;

/// Default display time for [`NotificationDuration::Long`] (10 seconds)
pub const DEFAULT_LONG_DURATION_MS: u64 = 10_000;

/// Default buffer size of the controller event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// How many notifications may be displayed at once, and what happens on overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayMode {
    /// One notification at a time; overflow waits in a FIFO queue
    #[default]
    Single,
    /// Up to `max_concurrent` at a time; overflow waits in a FIFO queue
    Queued {
        /// Number of display slots
        max_concurrent: usize,
    },
    /// Up to `max_concurrent` at a time; overflow evicts the oldest
    Stacked {
        /// Number of display slots
        max_concurrent: usize,
    },
}

impl DisplayMode {
    /// Number of display slots
    pub fn capacity(&self) -> usize {
        match self {
            DisplayMode::Single => 1,
            DisplayMode::Queued { max_concurrent } | DisplayMode::Stacked { max_concurrent } => {
                *max_concurrent
            }
        }
    }

    /// Check if overflow evicts instead of queueing
    pub fn evicts_on_overflow(&self) -> bool {
        matches!(self, DisplayMode::Stacked { .. })
    }

    /// Validate the slot count
    pub fn validate(&self) -> Result<()> {
        match self.capacity() {
            0 => Err(ControllerError::InvalidCapacity(0)),
            _ => Ok(()),
        }
    }
}

/// Notification controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Slot layout
    pub mode: DisplayMode,

    /// Display time for short notifications in milliseconds
    pub short_duration_ms: u64,

    /// Display time for long notifications in milliseconds
    pub long_duration_ms: u64,

    /// Fire `on_dismiss` for queued notifications dropped by `dismiss_all`
    pub notify_discarded: bool,

    /// Buffer size of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Single,
            short_duration_ms: DEFAULT_SHORT_DURATION_MS,
            long_duration_ms: DEFAULT_LONG_DURATION_MS,
            notify_discarded: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Single-slot configuration (snackbar style)
    pub fn single() -> Self {
        Self::default()
    }

    /// Multi-slot configuration with a FIFO overflow queue
    pub fn queued(max_concurrent: usize) -> Self {
        Self { mode: DisplayMode::Queued { max_concurrent }, ..Default::default() }
    }

    /// Bounded-stack configuration (toast style)
    pub fn stacked(max_concurrent: usize) -> Self {
        Self { mode: DisplayMode::Stacked { max_concurrent }, ..Default::default() }
    }

    /// Set display mode
    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set short and long display times
    pub fn with_durations(mut self, short: Duration, long: Duration) -> Self {
        self.short_duration_ms = short.as_millis().try_into().unwrap_or(u64::MAX);
        self.long_duration_ms = long.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Set whether discarded queue entries get their dismiss callback
    pub fn with_notify_discarded(mut self, notify: bool) -> Self {
        self.notify_discarded = notify;
        self
    }

    /// Set event channel buffer size
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Display time for short notifications
    pub fn short_duration(&self) -> Duration {
        Duration::from_millis(self.short_duration_ms)
    }

    /// Display time for long notifications
    pub fn long_duration(&self) -> Duration {
        Duration::from_millis(self.long_duration_ms)
    }

    /// Resolve a notification duration to a timeout
    ///
    /// Returns `None` for indefinite notifications.
    pub fn resolve(&self, duration: NotificationDuration) -> Option<Duration> {
        duration.resolve(self.short_duration(), self.long_duration())
    }

    /// Check the configuration for programmer errors
    pub fn validate(&self) -> Result<()> {
        self.mode.validate()?;

        if self.event_capacity == 0 {
            return Err(ControllerError::InvalidEventCapacity(0));
        }

        for (field, value) in [
            ("short_duration_ms", self.short_duration_ms),
            ("long_duration_ms", self.long_duration_ms),
        ] {
            if value == 0 {
                return Err(ControllerError::InvalidDuration { field, value });
            }
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let config = Self::from_json(&contents)?;
        tracing::debug!("Loaded notification config from {}", path.display());
        Ok(config)
    }
}
