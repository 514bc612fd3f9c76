//! Concurrency integration tests
//!
//! Timers, dismissals and actions race on a multi-threaded runtime; every
//! notification must still retire exactly once.

use herald::{
    ControllerConfig, NotificationController, NotificationEvent, NotificationId, NotificationSpec,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NOTIFICATIONS: usize = 200;

struct Counters {
    dismissed: Vec<AtomicUsize>,
    actioned: Vec<AtomicUsize>,
}

impl Counters {
    fn new(len: usize) -> Arc<Self> {
        Arc::new(Self {
            dismissed: (0..len).map(|_| AtomicUsize::new(0)).collect(),
            actioned: (0..len).map(|_| AtomicUsize::new(0)).collect(),
        })
    }

    fn spec(self: &Arc<Self>, index: usize) -> NotificationSpec {
        let on_dismiss = Arc::clone(self);
        let on_action = Arc::clone(self);
        NotificationSpec::new(format!("notification {}", index))
            .on_dismiss(move || {
                on_dismiss.dismissed[index].fetch_add(1, Ordering::SeqCst);
            })
            .with_action("Retry", move || {
                on_action.actioned[index].fetch_add(1, Ordering::SeqCst);
            })
    }
}

/// Timers, dismissals, user dismissals and actions racing on the same ids
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_triggers_retire_once() {
    herald::logging::init();

    let config = ControllerConfig::stacked(8)
        .with_durations(Duration::from_millis(5), Duration::from_millis(10));
    let controller = NotificationController::new(config).unwrap();
    let counters = Counters::new(NOTIFICATIONS);

    // Show from several tasks at once
    let mut producers = Vec::new();
    for chunk in 0..4 {
        let controller = controller.clone();
        let counters = Arc::clone(&counters);
        producers.push(tokio::spawn(async move {
            let per_chunk = NOTIFICATIONS / 4;
            let mut ids = Vec::new();
            for index in chunk * per_chunk..(chunk + 1) * per_chunk {
                let spec = counters.spec(index).with_duration(herald::NotificationDuration::Short);
                ids.push(controller.show(spec));
                tokio::task::yield_now().await;
            }
            ids
        }));
    }

    let mut ids: Vec<NotificationId> = Vec::new();
    for producer in producers {
        ids.extend(producer.await.unwrap());
    }

    // Three competing retirements per id
    let mut racers = Vec::new();
    for id in ids {
        let c = controller.clone();
        racers.push(tokio::spawn(async move { c.dismiss(id) }));
        let c = controller.clone();
        racers.push(tokio::spawn(async move { c.perform_action(id) }));
        let c = controller.clone();
        racers.push(tokio::spawn(async move { c.dismiss_by_user(id) }));
    }
    for racer in racers {
        racer.await.unwrap();
    }

    controller.dismiss_all();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(controller.is_idle());
    assert_eq!(controller.active_timers(), 0);

    for index in 0..NOTIFICATIONS {
        let dismissed = counters.dismissed[index].load(Ordering::SeqCst);
        let actioned = counters.actioned[index].load(Ordering::SeqCst);
        assert_eq!(dismissed, 1, "notification {} dismissed {} times", index, dismissed);
        assert!(actioned <= 1, "notification {} actioned {} times", index, actioned);
    }
}

/// Single-slot queue keeps FIFO display order while two consumers race to dismiss
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifo_under_competing_consumers() {
    let config = ControllerConfig::single().with_event_capacity(NOTIFICATIONS * 4);
    let controller = NotificationController::new(config).unwrap();
    let mut events = controller.subscribe();
    let dismissed: Arc<Vec<AtomicUsize>> =
        Arc::new((0..NOTIFICATIONS).map(|_| AtomicUsize::new(0)).collect());

    for index in 0..NOTIFICATIONS {
        let dismissed = Arc::clone(&dismissed);
        controller.show(
            NotificationSpec::new(index.to_string())
                .persistent()
                .on_dismiss(move || {
                    dismissed[index].fetch_add(1, Ordering::SeqCst);
                }),
        );
    }

    let mut consumers = Vec::new();
    for by_user in [false, true] {
        let controller = controller.clone();
        consumers.push(tokio::spawn(async move {
            loop {
                let Some(head) = controller.peek_current().first().map(|r| r.id()) else {
                    break;
                };
                if by_user {
                    controller.dismiss_by_user(head);
                } else {
                    controller.dismiss(head);
                }
                tokio::task::yield_now().await;
            }
        }));
    }
    for consumer in consumers {
        consumer.await.unwrap();
    }

    assert!(controller.is_idle());
    for (index, count) in dismissed.iter().enumerate() {
        let count = count.load(Ordering::SeqCst);
        assert_eq!(count, 1, "notification {} dismissed {} times", index, count);
    }

    // Events are published under the store lock, so they reflect transition order
    let mut displayed = Vec::new();
    let mut panics = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            NotificationEvent::Displayed { record } => {
                displayed.push(record.message().parse::<usize>().unwrap());
            }
            NotificationEvent::CallbackPanicked { .. } => panics += 1,
            _ => {}
        }
    }
    assert_eq!(displayed, (0..NOTIFICATIONS).collect::<Vec<_>>());
    assert_eq!(panics, 0);
}
