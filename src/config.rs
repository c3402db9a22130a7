//! # Queue configuration.
//!
//! Provides [`QueueConfig`], the construction-time settings for a
//! [`TaskQueue`](crate::TaskQueue).
//!
//! Config is fixed once the queue is built; there is no runtime mutation
//! surface. Out-of-range values are clamped by the accessor helpers rather
//! than rejected, so a zero `concurrent_tasks` still yields a working queue.

use std::time::Duration;

/// Construction-time configuration for a [`TaskQueue`](crate::TaskQueue).
///
/// ## Field semantics
/// - `concurrent_tasks`: batch ceiling — at most this many executors run
///   simultaneously (`0` is treated as `1`)
/// - `max_retry_on_error`: retry attempts granted *after* the first failure
///   (`0` = a single attempt, no retries)
/// - `tick_interval`: period of the dispatch loop (clamped to ≥ 1ms)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the clamp accessors over
/// reading fields directly so sentinel handling stays in one place.
#[derive(Clone, Copy, Debug)]
pub struct QueueConfig {
    /// Maximum number of executors in flight within one dispatch batch.
    ///
    /// Selection truncates the eligible set to this many tasks, and the
    /// dispatch loop waits for the whole batch to settle before selecting
    /// again, so the ceiling holds globally without per-slot bookkeeping.
    pub concurrent_tasks: usize,

    /// How many times a failed task is re-queued before it is rejected.
    ///
    /// A task's final aggregate error therefore carries
    /// `max_retry_on_error + 1` entries, one per attempt.
    pub max_retry_on_error: u32,

    /// Period of the dispatch tick.
    ///
    /// Best-effort: a tick that arrives while a batch is still in flight
    /// is skipped entirely, never queued up.
    pub tick_interval: Duration,
}

impl QueueConfig {
    /// Returns the batch ceiling, clamped to a minimum of 1.
    #[inline]
    pub fn concurrent_tasks_clamped(&self) -> usize {
        self.concurrent_tasks.max(1)
    }

    /// Returns the tick period, clamped to a minimum of 1ms.
    ///
    /// `tokio::time::interval` panics on a zero period; the clamp keeps a
    /// zeroed config usable.
    #[inline]
    pub fn tick_interval_clamped(&self) -> Duration {
        self.tick_interval.max(Duration::from_millis(1))
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `concurrent_tasks = 1` (serial execution)
    /// - `max_retry_on_error = 1` (one retry after the first failure)
    /// - `tick_interval = 10ms`
    fn default() -> Self {
        Self {
            concurrent_tasks: 1,
            max_retry_on_error: 1,
            tick_interval: Duration::from_millis(10),
        }
    }
}
