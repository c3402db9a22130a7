//! # Demo: basic
//!
//! Enqueues a few named tasks into a serial queue and awaits each result,
//! with the built-in [`LogWriter`] printing every lifecycle notification.
//!
//! ## Flow
//! ```text
//! TaskQueue::new(cfg) ──► LogWriter::attach(channel)
//!   ├─► enqueue("alpha") ──► [enqueue] ...
//!   ├─► enqueue("beta")  ──► [enqueue] ...
//!   ├─► start()
//!   │     ├─► [dequeue] alpha ──► [fulfilled] alpha
//!   │     └─► [dequeue] beta  ──► [fulfilled] beta
//!   └─► result().await per task
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic --features logging
//! ```

use taskline::{ExecuteFn, LogWriter, QueueConfig, TaskContext, TaskError, TaskQueue, TaskSpec};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let queue: TaskQueue<String> = TaskQueue::new(QueueConfig::default());
    LogWriter::attach(queue.channel().as_ref());

    let alpha = queue.enqueue(TaskSpec::named(
        "alpha",
        ExecuteFn::arc(|ctx: TaskContext| async move {
            Ok::<_, TaskError>(format!("alpha ran as {}", ctx.id))
        }),
    ));
    let beta = queue.enqueue(TaskSpec::named(
        "beta",
        ExecuteFn::arc(|ctx: TaskContext| async move {
            Ok::<_, TaskError>(format!("beta ran as {}", ctx.id))
        }),
    ));

    queue.start();

    println!("[main] {}", alpha.result().await?);
    println!("[main] {}", beta.result().await?);

    queue.stop();
    Ok(())
}
