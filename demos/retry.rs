//! # Demo: retry
//!
//! A flaky task fails twice before succeeding. With `max_retry_on_error = 2`
//! the queue re-queues it after each failure and the third attempt wins.
//!
//! ## Flow
//! ```text
//! enqueue("flaky") ──► Accepted
//!   ├─► attempt 1 ──► Err("boom #1") ──► Retry event, ToRetry
//!   ├─► attempt 2 ──► Err("boom #2") ──► Retry event, ToRetry
//!   └─► attempt 3 ──► Ok(value)      ──► Fulfilled, result resolves
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use taskline::{
    EventKind, ExecuteFn, QueueConfig, TaskContext, TaskError, TaskQueue, TaskSpec,
};

static ATTEMPTS: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = QueueConfig::default();
    cfg.max_retry_on_error = 2;

    let queue: TaskQueue<u32> = TaskQueue::new(cfg);
    queue.add_listener(
        EventKind::Retry,
        Arc::new(|task, err| {
            println!(
                "[retry] task={} err={}",
                task.name().unwrap_or("<unnamed>"),
                err.map(|e| e.to_string()).unwrap_or_default()
            );
        }),
    );
    queue.start();

    let flaky = queue.enqueue(TaskSpec::named(
        "flaky",
        ExecuteFn::arc(|_ctx: TaskContext| {
            let attempt = ATTEMPTS.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                println!("[flaky] attempt {attempt}");
                if attempt <= 2 {
                    Err(TaskError::fail(format!("boom #{attempt}")))
                } else {
                    Ok(attempt * 100)
                }
            }
        }),
    ));

    let value = flaky.result().await?;
    println!("[main] succeeded with {value}");

    queue.stop();
    Ok(())
}
