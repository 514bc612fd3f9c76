//! Notification lifecycle controller
//!
//! This module drives notifications through their lifecycle:
//!
//! ```text
//! Pending -> Displayed -> Retiring -> Retired
//! ```
//!
//! A displayed notification retires when its duration timer fires, when it is
//! dismissed, when its action is performed, or (stacked mode) when it is
//! evicted by a newer notification. Whichever trigger takes the store lock
//! first wins; every later trigger for the same id finds nothing to retire and
//! does nothing.
//!
//! All queue mutations happen under one mutex. Callbacks always run after the
//! lock is released, so a callback may call back into the controller.

use herald_core::{
    Callback, ControllerConfig, NotificationId, NotificationRecord, NotificationSpec, Result,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};

use crate::store::{DisplayDecision, QueueStore, RetireResult, Retired};
use crate::timer::TimerHandle;

/// Why a notification left the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetireCause {
    /// Duration timer fired
    Expired,
    /// Dismissed programmatically
    Dismissed,
    /// Dismissed by the user (swipe or close button)
    UserDismissed,
    /// Action performed
    Action,
    /// Pushed out by a newer notification in stacked mode
    Evicted,
    /// Removed by `dismiss_all` or `shutdown`
    Cleared,
}

/// Lifecycle state of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    /// Waiting for a display slot
    Pending,
    /// Occupying a display slot
    Displayed,
    /// Left the display; callbacks still running
    Retiring,
    /// No longer tracked
    ///
    /// Also reported for ids the controller never issued.
    Retired,
}

/// Which callback a panic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackKind {
    /// The `on_action` callback
    Action,
    /// The `on_dismiss` callback
    Dismiss,
}

impl CallbackKind {
    /// Get the callback name
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackKind::Action => "on_action",
            CallbackKind::Dismiss => "on_dismiss",
        }
    }
}

/// Events broadcast on every lifecycle transition
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A notification took a display slot
    Displayed {
        /// The displayed record
        record: NotificationRecord,
    },
    /// A notification is waiting for a slot
    Queued {
        /// Queued notification
        id: NotificationId,
    },
    /// A notification left the display
    Retired {
        /// Retired notification
        id: NotificationId,
        /// What retired it
        cause: RetireCause,
    },
    /// A queued notification was dropped without being displayed
    Discarded {
        /// Discarded notification
        id: NotificationId,
    },
    /// A callback panicked; queue state was already consistent
    CallbackPanicked {
        /// Notification whose callback panicked
        id: NotificationId,
        /// Which callback
        callback: CallbackKind,
        /// Panic message
        message: String,
    },
}

/// State guarded by the controller lock
struct Shared {
    store: QueueStore,
    /// Armed timers, keyed by displayed notification
    timers: HashMap<NotificationId, TimerHandle>,
    /// Retired notifications whose callbacks are still running
    retiring: HashSet<NotificationId>,
}

struct Inner {
    config: ControllerConfig,
    runtime: Handle,
    shared: Mutex<Shared>,
    events_tx: broadcast::Sender<NotificationEvent>,
    current_tx: watch::Sender<Vec<NotificationRecord>>,
}

/// Controller for timed, dismissible, queued notifications
///
/// Cloning is cheap; all clones drive the same queue. Dropping the last
/// clone cancels every outstanding timer.
///
/// # Example
///
/// ```no_run
/// use herald_core::{ControllerConfig, NotificationSpec};
/// use herald_state::controller::NotificationController;
///
/// #[tokio::main]
/// async fn main() {
///     let controller = NotificationController::new(ControllerConfig::single()).unwrap();
///
///     let saved = controller.show(NotificationSpec::success("Saved"));
///     let queued = controller.show(NotificationSpec::info("Synced"));
///
///     assert_eq!(controller.peek_current()[0].id(), saved);
///     controller.dismiss(saved);
///     assert_eq!(controller.peek_current()[0].id(), queued);
/// }
/// ```
#[derive(Clone)]
pub struct NotificationController {
    inner: Arc<Inner>,
}

impl NotificationController {
    /// Create a controller that schedules timers on the current tokio runtime
    pub fn new(config: ControllerConfig) -> Result<Self> {
        let runtime = Handle::try_current()?;
        Self::with_runtime(config, runtime)
    }

    /// Create a controller that schedules timers on the given runtime
    pub fn with_runtime(config: ControllerConfig, runtime: Handle) -> Result<Self> {
        config.validate()?;

        let store = QueueStore::new(config.mode)?;
        let (events_tx, _) = broadcast::channel(config.event_capacity);
        let (current_tx, _) = watch::channel(Vec::new());

        tracing::debug!("Notification controller created with {:?}", config.mode);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                runtime,
                shared: Mutex::new(Shared {
                    store,
                    timers: HashMap::new(),
                    retiring: HashSet::new(),
                }),
                events_tx,
                current_tx,
            }),
        })
    }

    /// Get the controller configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Show a notification, or queue it if no slot is free
    ///
    /// Returns the new notification's id without waiting for it to be
    /// displayed or dismissed. In stacked mode an evicted notification's
    /// `on_dismiss` runs before this returns.
    pub fn show(&self, spec: NotificationSpec) -> NotificationId {
        let (record, callbacks) = spec.build();
        let id = record.id();

        let evicted = {
            let mut shared = self.inner.shared.lock();

            match shared.store.enqueue_or_display(record.clone(), callbacks) {
                DisplayDecision::Displayed => {
                    self.on_displayed(&mut shared, &record);
                    None
                }
                DisplayDecision::Queued => {
                    tracing::debug!(%id, pending = shared.store.pending_len(), "Notification queued");
                    self.emit(NotificationEvent::Queued { id });
                    None
                }
                DisplayDecision::DisplayedWithEviction(evicted) => {
                    let evicted_id = evicted.id();
                    Self::cancel_timer(&mut shared, evicted_id);
                    shared.retiring.insert(evicted_id);
                    tracing::debug!(id = %evicted_id, "Notification evicted");
                    self.emit(NotificationEvent::Retired {
                        id: evicted_id,
                        cause: RetireCause::Evicted,
                    });
                    self.on_displayed(&mut shared, &record);
                    Some(evicted)
                }
            }
        };

        if let Some(evicted) = evicted {
            self.complete(evicted, RetireCause::Evicted);
        }

        id
    }

    /// Dismiss a displayed notification
    ///
    /// Returns `true` if this call retired it. Unknown, queued and already
    /// retired ids are a no-op.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.retire_where(id, RetireCause::Dismissed, |_| true)
    }

    /// Dismiss a displayed notification on the user's behalf
    ///
    /// Like [`dismiss`](Self::dismiss), but only applies to notifications
    /// built with manual dismissal allowed.
    pub fn dismiss_by_user(&self, id: NotificationId) -> bool {
        self.retire_where(id, RetireCause::UserDismissed, |record| {
            if !record.is_manually_dismissible() {
                tracing::warn!(id = %record.id(), "Notification does not allow manual dismissal");
                return false;
            }
            true
        })
    }

    /// Perform a displayed notification's action
    ///
    /// Runs `on_action` (if any) and then `on_dismiss`. Returns `true` if this
    /// call retired the notification.
    pub fn perform_action(&self, id: NotificationId) -> bool {
        self.retire_where(id, RetireCause::Action, |_| true)
    }

    /// Dismiss every displayed notification and drop the queue
    ///
    /// Queued notifications are not promoted. Their `on_dismiss` only runs
    /// when [`ControllerConfig::notify_discarded`] is set.
    pub fn dismiss_all(&self) {
        let (current, pending) = {
            let mut shared = self.inner.shared.lock();

            for (_, timer) in shared.timers.drain() {
                timer.cancel();
            }

            let (current, pending) = shared.store.drain();
            for retired in &current {
                shared.retiring.insert(retired.id());
                self.emit(NotificationEvent::Retired {
                    id: retired.id(),
                    cause: RetireCause::Cleared,
                });
            }
            for discarded in &pending {
                self.emit(NotificationEvent::Discarded { id: discarded.id() });
            }
            self.publish_current(&shared);

            (current, pending)
        };

        tracing::debug!(
            displayed = current.len(),
            discarded = pending.len(),
            "Dismissed all notifications"
        );

        for retired in current {
            self.complete(retired, RetireCause::Cleared);
        }

        if self.inner.config.notify_discarded {
            for mut discarded in pending {
                if let Some(callback) = discarded.callbacks.take_dismiss() {
                    self.invoke(discarded.id(), CallbackKind::Dismiss, callback);
                }
            }
        }
    }

    /// Cancel all timers and clear the controller
    ///
    /// Equivalent to [`dismiss_all`](Self::dismiss_all); the controller can be
    /// used again afterwards.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down notification controller");
        self.dismiss_all();
    }

    /// Snapshot of displayed notifications, oldest first
    pub fn peek_current(&self) -> Vec<NotificationRecord> {
        self.inner.shared.lock().store.peek_current()
    }

    /// Snapshot of queued notifications, oldest first
    pub fn pending(&self) -> Vec<NotificationRecord> {
        self.inner.shared.lock().store.pending()
    }

    /// Lifecycle state of a notification
    pub fn state(&self, id: NotificationId) -> NotificationState {
        let shared = self.inner.shared.lock();

        if shared.retiring.contains(&id) {
            NotificationState::Retiring
        } else if shared.store.is_current(id) {
            NotificationState::Displayed
        } else if shared.store.is_pending(id) {
            NotificationState::Pending
        } else {
            NotificationState::Retired
        }
    }

    /// Check if nothing is displayed or queued
    pub fn is_idle(&self) -> bool {
        self.inner.shared.lock().store.is_empty()
    }

    /// Number of armed dismiss timers
    pub fn active_timers(&self) -> usize {
        self.inner.shared.lock().timers.len()
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Watch the displayed notifications
    pub fn watch_current(&self) -> watch::Receiver<Vec<NotificationRecord>> {
        self.inner.current_tx.subscribe()
    }

    fn retire_where<F>(&self, id: NotificationId, cause: RetireCause, allow: F) -> bool
    where
        F: FnOnce(&NotificationRecord) -> bool,
    {
        let retired = {
            let mut shared = self.inner.shared.lock();

            let allowed = match shared.store.get_current(id) {
                Some(record) => allow(record),
                None => {
                    tracing::trace!(%id, ?cause, "Ignoring retirement of non-displayed notification");
                    return false;
                }
            };
            if !allowed {
                return false;
            }

            let (retired, promoted) = match shared.store.retire_current(id) {
                RetireResult::NotFound => return false,
                RetireResult::Idle(retired) => (retired, None),
                RetireResult::Promoted { retired, next } => (retired, Some(next)),
            };

            Self::cancel_timer(&mut shared, id);
            shared.retiring.insert(id);
            tracing::debug!(%id, ?cause, "Notification retired");
            self.emit(NotificationEvent::Retired { id, cause });

            match promoted {
                Some(next) => self.on_displayed(&mut shared, &next),
                None => self.publish_current(&shared),
            }

            retired
        };

        self.complete(retired, cause);
        true
    }

    /// Arm the timer and announce a newly displayed record
    fn on_displayed(&self, shared: &mut Shared, record: &NotificationRecord) {
        let id = record.id();

        if let Some(delay) = self.inner.config.resolve(record.duration()) {
            self.arm_timer(shared, id, delay);
        }

        tracing::debug!(%id, severity = record.severity().as_str(), "Notification displayed");
        self.publish_current(shared);
        self.emit(NotificationEvent::Displayed { record: record.clone() });
    }

    fn arm_timer(&self, shared: &mut Shared, id: NotificationId, delay: Duration) {
        let weak = Arc::downgrade(&self.inner);

        let timer = TimerHandle::spawn(&self.inner.runtime, delay, move || {
            if let Some(inner) = weak.upgrade() {
                NotificationController { inner }.retire_where(id, RetireCause::Expired, |_| true);
            }
        });

        if let Some(previous) = shared.timers.insert(id, timer) {
            previous.cancel();
        }
    }

    fn cancel_timer(shared: &mut Shared, id: NotificationId) {
        if let Some(timer) = shared.timers.remove(&id) {
            timer.cancel();
        }
    }

    /// Run a retired record's callbacks and finish its retirement
    fn complete(&self, mut retired: Retired, cause: RetireCause) {
        let id = retired.id();

        if cause == RetireCause::Action {
            if let Some(callback) = retired.callbacks.take_action() {
                self.invoke(id, CallbackKind::Action, callback);
            }
        }
        if let Some(callback) = retired.callbacks.take_dismiss() {
            self.invoke(id, CallbackKind::Dismiss, callback);
        }

        self.inner.shared.lock().retiring.remove(&id);
    }

    fn invoke(&self, id: NotificationId, kind: CallbackKind, callback: Callback) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
            let message = panic_message(payload.as_ref());
            tracing::error!(%id, callback = kind.as_str(), "Notification callback panicked: {}", message);
            self.emit(NotificationEvent::CallbackPanicked { id, callback: kind, message });
        }
    }

    fn publish_current(&self, shared: &Shared) {
        self.inner.current_tx.send_replace(shared.store.peek_current());
    }

    fn emit(&self, event: NotificationEvent) {
        // No receivers is fine
        let _ = self.inner.events_tx.send(event);
    }
}

impl fmt::Debug for NotificationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.shared.lock();
        f.debug_struct("NotificationController")
            .field("config", &self.inner.config)
            .field("store", &shared.store)
            .field("timers", &shared.timers.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
