//! # Demo: pause_resume
//!
//! Shows both suspension levels:
//! - `pause_task`/`resume_task` park one task and put it back into the
//!   eligible pool;
//! - `pause`/`resume` gate the whole dispatch loop.
//!
//! ## Flow
//! ```text
//! enqueue("deferred") ──► pause_task ──► Paused (skipped by dispatch)
//! enqueue("eager")    ──► runs normally
//! resume_task("deferred") ──► Accepted again ──► runs
//! pause()  ──► no new batches
//! resume() ──► dispatch continues
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example pause_resume
//! ```

use std::time::Duration;

use taskline::{ExecuteFn, QueueConfig, Status, TaskContext, TaskError, TaskQueue, TaskSpec};
use tokio::time::sleep;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let queue: TaskQueue<&'static str> = TaskQueue::new(QueueConfig::default());
    queue.start();

    let deferred = queue.enqueue(TaskSpec::named(
        "deferred",
        ExecuteFn::arc(|_ctx: TaskContext| async move { Ok::<_, TaskError>("deferred done") }),
    ));
    queue.pause_task(&deferred);

    let eager = queue.enqueue(TaskSpec::named(
        "eager",
        ExecuteFn::arc(|_ctx: TaskContext| async move { Ok::<_, TaskError>("eager done") }),
    ));

    println!("[main] {}", eager.result().await?);
    println!("[main] deferred status: {}", deferred.status().as_label());

    queue.resume_task(&deferred);
    println!("[main] {}", deferred.result().await?);

    queue.pause();
    let parked = queue.enqueue(TaskSpec::named(
        "parked",
        ExecuteFn::arc(|_ctx: TaskContext| async move { Ok::<_, TaskError>("parked done") }),
    ));
    sleep(Duration::from_millis(50)).await;
    assert_eq!(parked.status(), Status::Accepted);
    println!("[main] parked while queue is paused: {}", parked.status().as_label());

    queue.resume();
    println!("[main] {}", parked.result().await?);

    queue.stop();
    Ok(())
}
