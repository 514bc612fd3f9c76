//! Default notification controller handle
//!
//! Applications usually want one controller that any component can reach.
//! Rather than a process global, [`NotificationManager`] is a cheap, cloneable
//! handle that is passed around explicitly, initialised once, and torn down
//! on exit. Tests inject their own controller with [`NotificationManager::install`].

use herald_core::{ControllerConfig, NotificationId, NotificationSpec, Result};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::controller::NotificationController;

/// Shared handle to an optional default controller
#[derive(Clone, Default)]
pub struct NotificationManager {
    controller: Arc<RwLock<Option<NotificationController>>>,
}

impl NotificationManager {
    /// Create an uninitialised manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller on the current runtime and install it
    ///
    /// A previously installed controller is shut down first.
    pub fn init(&self, config: ControllerConfig) -> Result<NotificationController> {
        let controller = NotificationController::new(config)?;
        self.install(controller.clone());
        Ok(controller)
    }

    /// Install an existing controller
    ///
    /// A previously installed controller is shut down first.
    pub fn install(&self, controller: NotificationController) {
        let previous = self.controller.write().replace(controller);
        if let Some(previous) = previous {
            tracing::debug!("Replacing installed notification controller");
            previous.shutdown();
        }
    }

    /// Get the installed controller
    pub fn controller(&self) -> Option<NotificationController> {
        self.controller.read().clone()
    }

    /// Check if a controller is installed
    pub fn is_initialized(&self) -> bool {
        self.controller.read().is_some()
    }

    /// Shut down and uninstall the controller
    pub fn teardown(&self) {
        let previous = self.controller.write().take();
        if let Some(previous) = previous {
            previous.shutdown();
        }
    }

    /// Show a notification on the installed controller
    ///
    /// Returns `None` if no controller is installed.
    pub fn show(&self, spec: NotificationSpec) -> Option<NotificationId> {
        match self.controller() {
            Some(controller) => Some(controller.show(spec)),
            None => {
                tracing::warn!("Notification dropped: manager not initialized");
                None
            }
        }
    }

    /// Show a success notification
    pub fn success(&self, message: impl Into<String>) -> Option<NotificationId> {
        self.show(NotificationSpec::success(message))
    }

    /// Show an error notification
    pub fn error(&self, message: impl Into<String>) -> Option<NotificationId> {
        self.show(NotificationSpec::error(message))
    }

    /// Show a warning notification
    pub fn warning(&self, message: impl Into<String>) -> Option<NotificationId> {
        self.show(NotificationSpec::warning(message))
    }

    /// Show an info notification
    pub fn info(&self, message: impl Into<String>) -> Option<NotificationId> {
        self.show(NotificationSpec::info(message))
    }

    /// Dismiss a notification on the installed controller
    pub fn dismiss(&self, id: NotificationId) -> bool {
        match self.controller() {
            Some(controller) => controller.dismiss(id),
            None => {
                tracing::warn!(%id, "Dismiss ignored: manager not initialized");
                false
            }
        }
    }

    /// Perform a notification's action on the installed controller
    pub fn perform_action(&self, id: NotificationId) -> bool {
        match self.controller() {
            Some(controller) => controller.perform_action(id),
            None => {
                tracing::warn!(%id, "Action ignored: manager not initialized");
                false
            }
        }
    }

    /// Dismiss everything on the installed controller
    pub fn dismiss_all(&self) {
        match self.controller() {
            Some(controller) => controller.dismiss_all(),
            None => tracing::warn!("Dismiss all ignored: manager not initialized"),
        }
    }
}

impl std::fmt::Debug for NotificationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationManager")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
