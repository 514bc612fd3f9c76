//! Notification lifecycle integration tests
//!
//! End-to-end scenarios through the public `herald` API.

use herald::{
    ControllerConfig, DisplayMode, NotificationController, NotificationDuration,
    NotificationEvent, NotificationManager, NotificationRecord, NotificationSpec,
    NotificationState, RetireCause,
};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Shared, ordered record of callback invocations
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn tracked(&self, message: &str) -> NotificationSpec {
        let journal = self.clone();
        let name = message.to_string();
        NotificationSpec::new(message).on_dismiss(move || journal.write(format!("dismiss:{}", name)))
    }

    fn with_undo(&self, message: &str) -> NotificationSpec {
        let journal = self.clone();
        let name = message.to_string();
        self.tracked(message)
            .with_action("Undo", move || journal.write(format!("action:{}", name)))
    }

    fn write(&self, entry: String) {
        self.0.lock().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

fn messages(records: &[NotificationRecord]) -> Vec<&str> {
    records.iter().map(|r| r.message()).collect()
}

/// Single slot: later notifications wait in order and move up on dismissal
#[tokio::test]
async fn test_single_slot_queue_order() {
    let controller = NotificationController::new(ControllerConfig::single()).unwrap();
    let journal = Journal::default();

    let a = controller.show(journal.tracked("A"));
    let b = controller.show(journal.tracked("B"));
    let c = controller.show(journal.tracked("C"));

    assert_eq!(messages(&controller.peek_current()), vec!["A"]);
    assert_eq!(messages(&controller.pending()), vec!["B", "C"]);

    controller.dismiss(a);
    assert_eq!(messages(&controller.peek_current()), vec!["B"]);
    assert_eq!(messages(&controller.pending()), vec!["C"]);

    controller.dismiss(b);
    controller.dismiss(c);
    assert!(controller.is_idle());
    assert_eq!(journal.entries(), vec!["dismiss:A", "dismiss:B", "dismiss:C"]);
}

/// A short notification retires itself exactly once
#[tokio::test(start_paused = true)]
async fn test_short_notification_times_out() {
    let controller = NotificationController::new(ControllerConfig::single()).unwrap();
    let journal = Journal::default();
    let mut events = controller.subscribe();

    let a = controller.show(journal.tracked("A").with_duration(NotificationDuration::Short));

    tokio::time::sleep(controller.config().short_duration() * 3).await;

    assert_eq!(journal.entries(), vec!["dismiss:A"]);
    assert!(controller.peek_current().is_empty());

    let mut expired = 0;
    while let Ok(event) = events.try_recv() {
        if let NotificationEvent::Retired { id, cause } = event {
            assert_eq!(id, a);
            assert_eq!(cause, RetireCause::Expired);
            expired += 1;
        }
    }
    assert_eq!(expired, 1);
}

/// Performing an action runs on_action then on_dismiss; later dismissals do nothing
#[tokio::test]
async fn test_action_then_stale_dismiss() {
    let controller = NotificationController::new(ControllerConfig::single()).unwrap();
    let journal = Journal::default();

    let a = controller.show(journal.with_undo("A"));
    assert_eq!(controller.peek_current()[0].action_label(), Some("Undo"));

    assert!(controller.perform_action(a));
    assert!(!controller.dismiss(a));
    assert!(!controller.dismiss_by_user(a));

    assert_eq!(journal.entries(), vec!["action:A", "dismiss:A"]);
}

/// Stacked mode evicts the oldest notification when full
#[tokio::test]
async fn test_stacked_overflow_evicts_oldest() {
    let controller = NotificationController::new(ControllerConfig::stacked(3)).unwrap();
    let journal = Journal::default();
    let mut events = controller.subscribe();

    let first = controller.show(journal.tracked("1"));
    controller.show(journal.tracked("2"));
    controller.show(journal.tracked("3"));
    controller.show(journal.tracked("4"));

    assert_eq!(journal.entries(), vec!["dismiss:1"]);
    assert_eq!(messages(&controller.peek_current()), vec!["2", "3", "4"]);
    assert!(controller.pending().is_empty());

    let evictions: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event {
            NotificationEvent::Retired { id, cause: RetireCause::Evicted } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(evictions, vec![first]);
}

/// dismiss_all fires on_dismiss for displayed notifications only
#[tokio::test]
async fn test_dismiss_all_with_queue() {
    let controller = NotificationController::new(ControllerConfig::queued(2)).unwrap();
    let journal = Journal::default();
    let mut events = controller.subscribe();

    controller.show(journal.tracked("A"));
    controller.show(journal.tracked("B"));
    let c = controller.show(journal.tracked("C"));
    assert_eq!(messages(&controller.peek_current()), vec!["A", "B"]);
    assert_eq!(messages(&controller.pending()), vec!["C"]);

    controller.dismiss_all();

    assert_eq!(journal.entries(), vec!["dismiss:A", "dismiss:B"]);
    assert!(controller.peek_current().is_empty());
    assert!(controller.pending().is_empty());
    assert_eq!(controller.state(c), NotificationState::Retired);

    let discarded: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event {
            NotificationEvent::Discarded { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(discarded, vec![c]);
}

/// Opting in fires on_dismiss for discarded queue entries too
#[tokio::test]
async fn test_dismiss_all_notifies_discarded() {
    let config = ControllerConfig::queued(2).with_notify_discarded(true);
    let controller = NotificationController::new(config).unwrap();
    let journal = Journal::default();

    controller.show(journal.tracked("A"));
    controller.show(journal.tracked("B"));
    controller.show(journal.tracked("C"));
    controller.dismiss_all();

    assert_eq!(journal.entries(), vec!["dismiss:A", "dismiss:B", "dismiss:C"]);
}

/// Actionable notifications default to indefinite and wait for the user
#[tokio::test(start_paused = true)]
async fn test_actionable_waits_for_user() {
    let controller = NotificationController::new(ControllerConfig::single()).unwrap();
    let journal = Journal::default();

    let a = controller.show(journal.with_undo("A"));
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(controller.state(a), NotificationState::Displayed);
    assert!(journal.entries().is_empty());
}

/// Mixed durations in a single slot play back one after another
#[tokio::test(start_paused = true)]
async fn test_queue_drains_over_time() {
    let config = ControllerConfig::single()
        .with_durations(Duration::from_millis(200), Duration::from_millis(500));
    let controller = NotificationController::new(config).unwrap();
    let journal = Journal::default();
    let mut current = controller.watch_current();

    controller.show(journal.tracked("short"));
    controller.show(journal.tracked("long").with_duration(NotificationDuration::Long));
    controller.show(journal.tracked("custom").with_duration(NotificationDuration::from_millis(50)));

    tokio::time::sleep(Duration::from_millis(210)).await;
    assert_eq!(messages(&current.borrow_and_update()), vec!["long"]);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(messages(&current.borrow_and_update()), vec!["custom"]);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(current.borrow_and_update().is_empty());
    assert_eq!(journal.entries(), vec!["dismiss:short", "dismiss:long", "dismiss:custom"]);
}

/// Configuration loaded from disk drives the controller
#[tokio::test]
async fn test_controller_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "mode": {{ "kind": "stacked", "max_concurrent": 2 }}, "long_duration_ms": 8000 }}"#
    )
    .unwrap();

    let config = ControllerConfig::load(file.path()).await.unwrap();
    assert_eq!(config.mode, DisplayMode::Stacked { max_concurrent: 2 });
    assert_eq!(config.long_duration(), Duration::from_secs(8));

    let controller = NotificationController::new(config).unwrap();
    controller.show(NotificationSpec::new("a"));
    controller.show(NotificationSpec::new("b"));
    controller.show(NotificationSpec::new("c"));
    assert_eq!(messages(&controller.peek_current()), vec!["b", "c"]);
}

/// The manager handle is initialised, used from clones, and torn down
#[tokio::test]
async fn test_manager_lifecycle() {
    herald::logging::init();

    let manager = NotificationManager::new();
    assert!(manager.info("ignored").is_none());

    let controller = manager.init(ControllerConfig::single()).unwrap();
    let worker = manager.clone();

    let saved = worker.success("Saved").unwrap();
    let failed = worker.error("Sync failed").unwrap();
    assert_eq!(controller.state(saved), NotificationState::Displayed);
    assert_eq!(controller.state(failed), NotificationState::Pending);

    manager.teardown();
    assert!(!worker.is_initialized());
    assert!(controller.is_idle());
}
