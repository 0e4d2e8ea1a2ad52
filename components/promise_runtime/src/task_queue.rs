//! Task and microtask queue management.
//!
//! This module provides the task and microtask queues used by the event loop.
//! Tasks are executed one at a time, with all microtasks draining after each
//! task. Promises only ever see the microtask side, through a [`JobQueue`]
//! handle.

use crate::config::RuntimeConfig;
use core_types::JsError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A task to be executed by the event loop.
///
/// Tasks represent work to be done in a later iteration of the event loop,
/// such as host I/O completions that settle promises.
pub struct Task {
    callback: Box<dyn FnOnce() -> Result<(), JsError>>,
}

impl Task {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute when the task runs
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) -> Result<(), JsError> {
        (self.callback)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// A microtask to be executed by the event loop.
///
/// Microtasks are executed after each task. Promise reaction flushes are
/// microtasks.
pub struct MicroTask {
    callback: Box<dyn FnOnce() -> Result<(), JsError>>,
}

impl MicroTask {
    /// Creates a new MicroTask from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute when the microtask runs
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the microtask.
    pub fn run(self) -> Result<(), JsError> {
        (self.callback)()
    }
}

impl std::fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MicroTask {{ ... }}")
    }
}

/// A queue for tasks.
///
/// Tasks are processed in FIFO order, one at a time.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a task to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Removes and returns the next task from the queue.
    pub fn dequeue(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// A queue for microtasks.
///
/// Microtasks are drained completely after each task.
#[derive(Debug, Default)]
pub struct MicrotaskQueue {
    queue: VecDeque<MicroTask>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&mut self, microtask: MicroTask) {
        self.queue.push_back(microtask);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&mut self) -> Option<MicroTask> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Debug)]
struct JobQueueInner {
    queue: RefCell<MicrotaskQueue>,
    config: RuntimeConfig,
}

/// Shared handle to a microtask queue.
///
/// This is the single "schedule this callback to run later" primitive the
/// promise engine consumes. Cloning the handle shares the queue. The queue
/// is only drained by its owner (normally an [`EventLoop`](crate::EventLoop)).
///
/// # Examples
///
/// ```
/// use promise_runtime::{JobQueue, MicroTask};
///
/// let jobs = JobQueue::new();
/// jobs.enqueue(MicroTask::new(|| Ok(())));
/// assert_eq!(jobs.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct JobQueue {
    inner: Rc<JobQueueInner>,
}

impl JobQueue {
    /// Creates an empty queue with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates an empty queue carrying `config`.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(JobQueueInner {
                queue: RefCell::new(MicrotaskQueue::new()),
                config,
            }),
        }
    }

    /// Schedules a microtask behind every microtask already queued.
    pub fn enqueue(&self, microtask: MicroTask) {
        self.inner.queue.borrow_mut().enqueue(microtask);
    }

    /// Removes and returns the oldest microtask.
    ///
    /// The queue is not borrowed while the returned microtask runs, so it may
    /// schedule further microtasks.
    pub fn dequeue(&self) -> Option<MicroTask> {
        self.inner.queue.borrow_mut().dequeue()
    }

    /// Returns true if no microtask is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }

    /// Returns the number of queued microtasks.
    pub fn len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// The configuration shared by everything scheduled on this queue.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Returns true if both handles share one queue.
    pub fn same_queue(&self, other: &JobQueue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
