//! Notification queue state for Herald
//!
//! This crate provides the queue store, the timer-driven lifecycle controller
//! built on it, and a shareable handle for an application's default controller.
//!
//! # Modules
//!
//! - [`store`] - Displayed slots and FIFO overflow queue
//! - [`controller`] - Show / dismiss / action / auto-dismiss lifecycle
//! - [`manager`] - Explicitly initialised default controller handle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod controller;
pub mod manager;
pub mod store;
mod timer;

pub use controller::{
    CallbackKind, NotificationController, NotificationEvent, NotificationState, RetireCause,
};
pub use manager::NotificationManager;
pub use store::{DisplayDecision, QueueStore, RetireResult, Retired};
