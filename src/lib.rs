//! Herald: queued, timed, dismissible notifications
//!
//! Herald keeps track of which notifications (toasts, snackbars) are on
//! screen, which are waiting, and when each should go away. It renders
//! nothing itself; a UI layer subscribes to the controller and draws what it
//! is told.
//!
//! # Display modes
//!
//! - [`DisplayMode::Single`] - one notification at a time, the rest wait in
//!   FIFO order (snackbar style)
//! - [`DisplayMode::Queued`] - up to `max_concurrent` at once, the rest wait
//!   in FIFO order and move into the first slot that frees up
//! - [`DisplayMode::Stacked`] - up to `max_concurrent` at once, a new arrival
//!   evicts the oldest (toast style)
//!
//! # Example
//!
//! ```no_run
//! use herald::{ControllerConfig, NotificationController, NotificationSpec};
//!
//! #[tokio::main]
//! async fn main() {
//!     herald::logging::init();
//!
//!     let controller = NotificationController::new(ControllerConfig::single()).unwrap();
//!     let id = controller.show(
//!         NotificationSpec::info("Message archived").with_action("Undo", || println!("restoring")),
//!     );
//!
//!     controller.perform_action(id);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod logging;

// Re-export commonly used types
pub use herald_core::{
    Callback, ControllerConfig, ControllerError, DisplayMode, NotificationCallbacks,
    NotificationDuration, NotificationId, NotificationRecord, NotificationSpec, Result, Severity,
};

pub use herald_state::{
    CallbackKind, DisplayDecision, NotificationController, NotificationEvent, NotificationManager,
    NotificationState, QueueStore, RetireCause, RetireResult, Retired,
};
