//! End-to-end scenarios for the queue engine: ordering, retries,
//! rejection aggregates, the concurrency ceiling, pause/resume at both
//! levels, discard semantics, and panic absorption.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{sleep, Instant};

use taskline::{
    Bus, Channel, EventKind, ExecuteFn, QueueConfig, QueueError, Status, TaskContext, TaskError,
    TaskId, TaskQueue, TaskSpec,
};

const ALL_KINDS: [EventKind; 7] = [
    EventKind::Enqueue,
    EventKind::Dequeue,
    EventKind::Pause,
    EventKind::Resume,
    EventKind::Fulfilled,
    EventKind::Rejected,
    EventKind::Retry,
];

type Recorded = (EventKind, TaskId, Option<TaskError>);
type Recording = Arc<Mutex<Vec<Recorded>>>;

/// Subscribes a recording listener for every kind.
fn record_events<T: Send + Sync + 'static>(queue: &TaskQueue<T>) -> Recording {
    let events: Recording = Arc::new(Mutex::new(Vec::new()));
    for kind in ALL_KINDS {
        let sink = Arc::clone(&events);
        queue.add_listener(
            kind,
            Arc::new(move |task, err| {
                sink.lock().unwrap().push((kind, task.id(), err.cloned()));
            }),
        );
    }
    events
}

fn kinds_for(events: &Recording, id: TaskId) -> Vec<EventKind> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, task, _)| *task == id)
        .map(|(kind, _, _)| *kind)
        .collect()
}

fn cfg(concurrent_tasks: usize, max_retry_on_error: u32) -> QueueConfig {
    QueueConfig {
        concurrent_tasks,
        max_retry_on_error,
        tick_interval: Duration::from_millis(1),
    }
}

/// Polls `pred` until it holds or the deadline passes.
async fn wait_until(deadline: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let end = Instant::now() + deadline;
    while Instant::now() < end {
        if pred() {
            return true;
        }
        sleep(Duration::from_millis(5)).await;
    }
    pred()
}

fn ok_spec(name: &'static str, value: u32) -> TaskSpec<u32> {
    TaskSpec::named(
        name,
        ExecuteFn::arc(move |_ctx: TaskContext| async move { Ok::<_, TaskError>(value) }),
    )
}

#[tokio::test]
async fn test_serial_queue_runs_in_submission_order() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    queue.start();

    let spec = |tag: &'static str, value: u32| {
        let order = Arc::clone(&order);
        TaskSpec::named(
            tag,
            ExecuteFn::arc(move |_ctx: TaskContext| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(tag);
                    Ok::<_, TaskError>(value)
                }
            }),
        )
    };

    let a = queue.enqueue(spec("a", 1));
    let b = queue.enqueue(spec("b", 2));
    let c = queue.enqueue(spec("c", 3));

    assert_eq!(a.result().await, Ok(1));
    assert_eq!(b.result().await, Ok(2));
    assert_eq!(c.result().await, Ok(3));
    assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(a.status(), Status::Fulfilled);
    queue.stop();
}

#[tokio::test]
async fn test_failed_attempt_is_retried_then_fulfilled() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(2, 1));
    let events = record_events(&queue);
    queue.start();

    let attempts = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&attempts);
    let task = queue.enqueue(TaskSpec::named(
        "flaky",
        ExecuteFn::arc(move |_ctx: TaskContext| {
            let attempt = seen.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt == 1 {
                    Err(TaskError::fail("first boom"))
                } else {
                    Ok(attempt * 10)
                }
            }
        }),
    ));

    assert_eq!(task.result().await, Ok(20));
    assert_eq!(task.status(), Status::Fulfilled);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    assert!(
        wait_until(Duration::from_secs(1), || {
            kinds_for(&events, task.id()).contains(&EventKind::Fulfilled)
        })
        .await
    );
    assert_eq!(
        kinds_for(&events, task.id()),
        vec![
            EventKind::Enqueue,
            EventKind::Dequeue,
            EventKind::Retry,
            EventKind::Dequeue,
            EventKind::Fulfilled,
        ]
    );

    // The retry notification carries the triggering attempt error.
    let retry_error = events
        .lock()
        .unwrap()
        .iter()
        .find(|(kind, id, _)| *kind == EventKind::Retry && *id == task.id())
        .and_then(|(_, _, err)| err.clone());
    assert_eq!(retry_error, Some(TaskError::fail("first boom")));
    queue.stop();
}

#[tokio::test]
async fn test_zero_retry_budget_rejects_after_one_attempt() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    let events = record_events(&queue);
    queue.start();

    let task = queue.enqueue(TaskSpec::named(
        "doomed",
        ExecuteFn::arc(|_ctx: TaskContext| async move {
            Err::<u32, _>(TaskError::fail("E"))
        }),
    ));

    assert_eq!(
        task.result().await,
        Err(QueueError::Exhausted {
            errors: vec![TaskError::fail("E")],
        })
    );
    assert_eq!(task.status(), Status::Rejected);

    assert!(
        wait_until(Duration::from_secs(1), || {
            kinds_for(&events, task.id()).contains(&EventKind::Rejected)
        })
        .await
    );
    assert_eq!(
        kinds_for(&events, task.id()),
        vec![EventKind::Enqueue, EventKind::Dequeue, EventKind::Rejected]
    );

    // Rejection events carry no error; the aggregate travels on the result.
    let rejected = events
        .lock()
        .unwrap()
        .iter()
        .find(|(kind, _, _)| *kind == EventKind::Rejected)
        .map(|(_, _, err)| err.clone())
        .expect("rejected event recorded");
    assert_eq!(rejected, None);
    queue.stop();
}

#[tokio::test]
async fn test_aggregate_holds_one_error_per_attempt_in_order() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 2));
    queue.start();

    let attempts = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&attempts);
    let task = queue.enqueue(TaskSpec::new(ExecuteFn::arc(
        move |_ctx: TaskContext| {
            let attempt = seen.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err::<u32, _>(TaskError::fail(format!("boom {attempt}"))) }
        },
    )));

    let err = task.result().await.expect_err("budget exhausted");
    let errors = err.attempt_errors().expect("aggregate").to_vec();
    assert_eq!(
        errors,
        vec![
            TaskError::fail("boom 1"),
            TaskError::fail("boom 2"),
            TaskError::fail("boom 3"),
        ]
    );
    queue.stop();
}

#[tokio::test]
async fn test_concurrency_ceiling_is_never_exceeded() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(2, 0));
    queue.start();

    let inflight = Arc::new(AtomicU32::new(0));
    let peak = Arc::new(AtomicU32::new(0));

    let mut tasks = Vec::new();
    for n in 0..4 {
        let inflight = Arc::clone(&inflight);
        let peak = Arc::clone(&peak);
        tasks.push(queue.enqueue(TaskSpec::new(ExecuteFn::arc(
            move |_ctx: TaskContext| {
                let inflight = Arc::clone(&inflight);
                let peak = Arc::clone(&peak);
                async move {
                    let current = inflight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(current, Ordering::SeqCst);
                    sleep(Duration::from_millis(20)).await;
                    inflight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(n)
                }
            },
        ))));
    }

    for (n, task) in tasks.iter().enumerate() {
        assert_eq!(task.result().await, Ok(n as u32));
    }
    // Full batches run both members together, never more.
    assert_eq!(peak.load(Ordering::SeqCst), 2);
    queue.stop();
}

#[tokio::test]
async fn test_global_pause_blocks_new_batches_but_not_inflight_work() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    let events = record_events(&queue);
    queue.start();

    let slow = queue.enqueue(TaskSpec::named(
        "slow",
        ExecuteFn::arc(|_ctx: TaskContext| async move {
            sleep(Duration::from_millis(50)).await;
            Ok::<_, TaskError>(1)
        }),
    ));

    assert!(
        wait_until(Duration::from_secs(1), || {
            kinds_for(&events, slow.id()).contains(&EventKind::Dequeue)
        })
        .await
    );
    queue.pause();
    let parked = queue.enqueue(ok_spec("parked", 2));

    // The in-flight task settles normally under a global pause.
    assert_eq!(slow.result().await, Ok(1));

    sleep(Duration::from_millis(40)).await;
    assert_eq!(parked.status(), Status::Accepted);
    assert!(!kinds_for(&events, parked.id()).contains(&EventKind::Dequeue));

    queue.resume();
    assert_eq!(parked.result().await, Ok(2));
    queue.stop();
}

#[tokio::test]
async fn test_paused_task_is_skipped_until_resumed() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    let events = record_events(&queue);

    let task = queue.enqueue(ok_spec("deferred", 5));
    queue.pause_task(&task);
    assert_eq!(task.status(), Status::Paused);

    queue.start();
    sleep(Duration::from_millis(40)).await;
    assert!(!kinds_for(&events, task.id()).contains(&EventKind::Dequeue));
    assert_eq!(task.status(), Status::Paused);

    // Resume restores the pre-pause status and the task becomes eligible.
    queue.resume_task(&task);
    assert_eq!(task.result().await, Ok(5));

    let kinds = kinds_for(&events, task.id());
    assert_eq!(kinds[..3], [EventKind::Enqueue, EventKind::Pause, EventKind::Resume]);
    queue.stop();
}

#[tokio::test]
async fn test_resume_without_pause_is_a_noop() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    let events = record_events(&queue);

    let task = queue.enqueue(ok_spec("steady", 1));
    queue.resume_task(&task);

    assert_eq!(task.status(), Status::Accepted);
    assert!(!kinds_for(&events, task.id()).contains(&EventKind::Resume));
}

#[tokio::test]
async fn test_clear_discards_pending_results_silently() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    let events = record_events(&queue);

    let first = queue.enqueue(ok_spec("one", 1));
    let second = queue.enqueue(ok_spec("two", 2));
    queue.clear();

    assert_eq!(first.result().await, Err(QueueError::Discarded));
    assert_eq!(second.result().await, Err(QueueError::Discarded));
    assert!(queue.tasks().is_empty());

    // Only the two enqueue notifications ever fired.
    let recorded = events.lock().unwrap();
    assert_eq!(recorded.len(), 2);
    assert!(recorded.iter().all(|(kind, _, _)| *kind == EventKind::Enqueue));
}

#[tokio::test]
async fn test_settled_value_survives_stop() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    queue.start();

    let done = queue.enqueue(ok_spec("done", 9));
    assert_eq!(done.result().await, Ok(9));

    queue.stop();
    // The result slot keeps its value after the records are gone.
    assert_eq!(done.result().await, Ok(9));
    assert_eq!(done.status(), Status::Fulfilled);
}

#[tokio::test]
async fn test_stop_halts_dispatch_until_restarted() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    queue.start();
    queue.stop();

    let task = queue.enqueue(ok_spec("later", 3));
    sleep(Duration::from_millis(40)).await;
    assert_eq!(task.status(), Status::Accepted);

    queue.start();
    assert_eq!(task.result().await, Ok(3));
    queue.stop();
}

#[tokio::test]
async fn test_executor_panic_becomes_attempt_error() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(1, 0));
    queue.start();

    let task = queue.enqueue(TaskSpec::named(
        "bomb",
        ExecuteFn::arc(|ctx: TaskContext| async move {
            if ctx.name() == Some("bomb") {
                panic!("kaboom");
            }
            Ok::<u32, TaskError>(0)
        }),
    ));

    let err = task.result().await.expect_err("panic rejects the task");
    assert_eq!(
        err.attempt_errors(),
        Some(
            [TaskError::Panicked {
                reason: "kaboom".to_string(),
            }]
            .as_slice()
        )
    );

    // The loop survived the panic.
    let next = queue.enqueue(ok_spec("after", 4));
    assert_eq!(next.result().await, Ok(4));
    queue.stop();
}

#[tokio::test]
async fn test_same_name_tasks_are_distinct() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(2, 0));
    queue.start();

    let left = queue.enqueue(ok_spec("twin", 1));
    let right = queue.enqueue(ok_spec("twin", 2));

    assert!(!taskline::Task::same(&left, &right));
    assert_ne!(left.id(), right.id());
    assert_eq!(left.result().await, Ok(1));
    assert_eq!(right.result().await, Ok(2));
    queue.stop();
}

#[tokio::test]
async fn test_every_success_emits_enqueue_dequeue_fulfilled_in_order() {
    let queue: TaskQueue<u32> = TaskQueue::new(cfg(3, 0));
    let events = record_events(&queue);
    queue.start();

    let tasks: Vec<_> = (0..3)
        .map(|n| queue.enqueue(ok_spec("ok", n)))
        .collect();
    for task in &tasks {
        assert!(task.result().await.is_ok());
    }

    assert!(
        wait_until(Duration::from_secs(1), || {
            events
                .lock()
                .unwrap()
                .iter()
                .filter(|(kind, _, _)| *kind == EventKind::Fulfilled)
                .count()
                == 3
        })
        .await
    );
    for task in &tasks {
        assert_eq!(
            kinds_for(&events, task.id()),
            vec![EventKind::Enqueue, EventKind::Dequeue, EventKind::Fulfilled]
        );
    }
    queue.stop();
}

#[tokio::test]
async fn test_bus_channel_delivers_to_raw_receiver() {
    let bus: Arc<Bus<u32>> = Arc::new(Bus::default());
    let mut rx = bus.receiver();

    let channel: Arc<dyn Channel<u32>> = bus;
    let queue: TaskQueue<u32> = TaskQueue::builder(cfg(1, 0))
        .with_channel(channel)
        .build();
    queue.start();

    let task = queue.enqueue(ok_spec("wired", 6));
    assert_eq!(task.result().await, Ok(6));

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(rx.recv().await.expect("event delivered").kind);
    }
    assert_eq!(
        seen,
        vec![EventKind::Enqueue, EventKind::Dequeue, EventKind::Fulfilled]
    );
    queue.stop();
}

#[tokio::test]
async fn test_builder_uses_injected_id_supplier() {
    use taskline::IdSupplier;
    use uuid::Uuid;

    struct FixedIds(Uuid);
    impl IdSupplier for FixedIds {
        fn generate(&self) -> TaskId {
            TaskId::from(self.0)
        }
    }

    let fixed = Uuid::new_v4();
    let queue: TaskQueue<u32> = TaskQueue::builder(cfg(1, 0))
        .with_ids(Arc::new(FixedIds(fixed)))
        .build();

    let task = queue.enqueue(ok_spec("fixed", 0));
    assert_eq!(task.id(), TaskId::from(fixed));
}
