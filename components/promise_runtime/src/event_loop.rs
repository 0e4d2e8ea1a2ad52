//! Event loop implementation.
//!
//! This module provides the host event loop that owns the task queue and the
//! microtask queue promises schedule their reaction flushes on.

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::promise::{Promise, PromiseState};
use crate::task_queue::{JobQueue, MicroTask, Task, TaskQueue};
use tracing::{debug, warn};

/// Counters describing the work an [`EventLoop`] has done.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLoopStats {
    /// Number of tasks executed
    pub tasks_run: u64,
    /// Number of microtasks executed
    pub microtasks_run: u64,
    /// Number of microtask checkpoints performed
    pub checkpoints: u64,
}

/// The host event loop.
///
/// Each iteration (turn) of the loop:
/// 1. Takes the oldest task from the task queue and executes it
/// 2. Drains all microtasks in the microtask queue
/// 3. Repeats
///
/// # Examples
///
/// ```
/// use promise_runtime::{EventLoop, Promise, PromiseState};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
/// let promise = Promise::resolve(event_loop.jobs(), 42);
/// let doubled = promise.map(|v| match v {
///     Value::Smi(n) => Ok(Value::Smi(n * 2)),
///     other => Ok(other),
/// });
///
/// event_loop.run_until_done().unwrap();
/// assert_eq!(doubled.state(), PromiseState::Fulfilled);
/// assert_eq!(doubled.value(), Some(Value::Smi(84)));
/// ```
#[derive(Debug)]
pub struct EventLoop {
    task_queue: TaskQueue,
    jobs: JobQueue,
    stats: EventLoopStats,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues and default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates a new EventLoop with the given configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            task_queue: TaskQueue::new(),
            jobs: JobQueue::with_config(config),
            stats: EventLoopStats::default(),
        }
    }

    /// The microtask queue handle to create promises on.
    pub fn jobs(&self) -> &JobQueue {
        &self.jobs
    }

    /// The active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        self.jobs.config()
    }

    /// Work counters accumulated so far.
    pub fn stats(&self) -> &EventLoopStats {
        &self.stats
    }

    /// Runs the event loop until all tasks and microtasks are processed.
    ///
    /// # Returns
    ///
    /// `Ok(())` if everything completed, or the first error raised by a task,
    /// a microtask, or the microtask limit.
    pub fn run_until_done(&mut self) -> RuntimeResult<()> {
        while !self.task_queue.is_empty() || !self.jobs.is_empty() {
            self.process_one_cycle()?;
        }
        Ok(())
    }

    /// Runs cycles until `promise` settles or there is no work left.
    ///
    /// Returns the promise's state at that point; `Pending` means the
    /// promise can no longer be settled by queued work.
    pub fn run_until_settled(&mut self, promise: &Promise) -> RuntimeResult<PromiseState> {
        while !promise.is_settled() && (!self.task_queue.is_empty() || !self.jobs.is_empty()) {
            self.process_one_cycle()?;
        }
        Ok(promise.state())
    }

    /// Adds a task to the task queue.
    ///
    /// The task will be executed in the next available iteration of the event loop.
    pub fn enqueue_task(&mut self, task: Task) {
        self.task_queue.enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    ///
    /// The microtask will be executed after the current task completes.
    pub fn enqueue_microtask(&mut self, microtask: MicroTask) {
        self.jobs.enqueue(microtask);
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.task_queue.is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Runs all microtasks in the queue until empty.
    ///
    /// New microtasks added during execution are also processed before this
    /// method returns, up to the configured `microtask_limit`.
    pub fn run_all_microtasks(&mut self) -> RuntimeResult<()> {
        let limit = self.jobs.config().microtask_limit;
        let mut ran = 0usize;
        self.stats.checkpoints += 1;

        loop {
            if let Some(limit) = limit {
                if ran >= limit && !self.jobs.is_empty() {
                    warn!(limit, pending = self.jobs.len(), "microtask checkpoint limit reached");
                    return Err(RuntimeError::MicrotaskLimitExceeded { limit });
                }
            }
            let Some(microtask) = self.jobs.dequeue() else {
                break;
            };
            ran += 1;
            self.stats.microtasks_run += 1;
            microtask.run()?;
        }

        if ran > 0 {
            debug!(ran, "microtask checkpoint complete");
        }
        Ok(())
    }

    /// Processes one complete cycle: one task followed by all microtasks.
    pub fn process_one_cycle(&mut self) -> RuntimeResult<()> {
        if let Some(task) = self.task_queue.dequeue() {
            self.stats.tasks_run += 1;
            task.run()?;
        }

        self.run_all_microtasks()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
