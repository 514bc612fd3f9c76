//! Cancellable auto-dismiss timers

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle for an armed dismiss timer
///
/// When dropped, the timer is cancelled and its callback never runs.
pub(crate) struct TimerHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    _handle: JoinHandle<()>,
}

impl TimerHandle {
    /// Run `on_expire` after `delay` unless cancelled first
    pub(crate) fn spawn<F>(runtime: &Handle, delay: Duration, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel();

        let handle = runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => on_expire(),
                _ = stop_rx => {}
            }
        });

        TimerHandle { stop_tx: Some(stop_tx), _handle: handle }
    }

    /// Cancel the timer
    pub(crate) fn cancel(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}
