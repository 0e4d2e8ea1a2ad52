//! Promise settlement core and reaction scheduling.
//!
//! A [`Promise`] starts pending and settles at most once. Observers register
//! reactions before or after settlement; reactions never run inline, they are
//! flushed through the promise's [`JobQueue`] in registration order.

use crate::task_queue::{JobQueue, MicroTask};
use core_types::{same_thenable, JsError, SettleCallback, Thenable, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

thread_local! {
    static NEXT_PROMISE_ID: Cell<u64> = const { Cell::new(1) };
}

fn next_promise_id() -> u64 {
    NEXT_PROMISE_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    })
}

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled,
    /// The promise has been rejected with a reason.
    Rejected,
}

impl PromiseState {
    /// Lower-case state name, as used in `allSettled` records.
    pub fn as_str(self) -> &'static str {
        match self {
            PromiseState::Pending => "pending",
            PromiseState::Fulfilled => "fulfilled",
            PromiseState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A continuation passed to [`Promise::then`].
///
/// Returning `Ok` settles the derived promise with the value (adopting it
/// if it is itself a thenable); returning `Err` rejects it.
pub struct Handler {
    callback: Box<dyn FnOnce(Value) -> Result<Value, Value>>,
}

impl Handler {
    /// Creates a new Handler from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Value) -> Result<Value, Value> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Calls the handler with the settlement payload.
    pub fn call(self, arg: Value) -> Result<Value, Value> {
        (self.callback)(arg)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler {{ ... }}")
    }
}

/// Capability that fulfills (or adopts into) a promise.
///
/// Calls after the first accepted `Resolve`/`Reject` call are no-ops.
#[derive(Clone)]
pub struct Resolve {
    promise: Promise,
}

impl Resolve {
    /// Settles the promise successfully with `value`.
    pub fn call(&self, value: impl Into<Value>) {
        self.promise.settle_success(value.into());
    }
}

impl fmt::Debug for Resolve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolve(#{})", self.promise.id())
    }
}

/// Capability that rejects a promise.
///
/// Calls after the first accepted `Resolve`/`Reject` call are no-ops.
#[derive(Clone)]
pub struct Reject {
    promise: Promise,
}

impl Reject {
    /// Settles the promise as failed with `reason`, or adopts it if it is
    /// a thenable.
    pub fn call(&self, reason: impl Into<Value>) {
        self.promise.settle_failure(reason.into());
    }
}

impl fmt::Debug for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reject(#{})", self.promise.id())
    }
}

struct PromiseInner {
    state: PromiseState,
    value: Option<Value>,
    fulfill_reactions: Vec<SettleCallback>,
    reject_reactions: Vec<SettleCallback>,
    // Set by the first accepted capability call, even while adopting.
    locked: bool,
    adopted: Option<Rc<dyn Thenable>>,
}

struct Shared {
    id: u64,
    this: Weak<Shared>,
    jobs: JobQueue,
    inner: RefCell<PromiseInner>,
}

impl Thenable for Shared {
    fn subscribe(&self, on_fulfilled: SettleCallback, on_rejected: SettleCallback) {
        if let Some(shared) = self.this.upgrade() {
            Promise { shared }.register_reaction(Some(on_fulfilled), Some(on_rejected));
        }
    }

    fn adopted(&self) -> Option<Rc<dyn Thenable>> {
        self.inner.borrow().adopted.clone()
    }
}

/// A deferred value.
///
/// `Promise` is a cheap handle; clones refer to the same instance.
///
/// # Examples
///
/// ```
/// use promise_runtime::{EventLoop, Promise, PromiseState};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
/// let (promise, resolve, _reject) = Promise::with_resolvers(event_loop.jobs());
/// assert_eq!(promise.state(), PromiseState::Pending);
///
/// resolve.call(42);
/// resolve.call(100); // ignored
/// assert_eq!(promise.value(), Some(Value::Smi(42)));
/// event_loop.run_until_done().unwrap();
/// ```
#[derive(Clone)]
pub struct Promise {
    shared: Rc<Shared>,
}

impl Promise {
    fn pending(jobs: &JobQueue) -> Promise {
        let id = next_promise_id();
        let shared = Rc::new_cyclic(|this| Shared {
            id,
            this: this.clone(),
            jobs: jobs.clone(),
            inner: RefCell::new(PromiseInner {
                state: PromiseState::Pending,
                value: None,
                fulfill_reactions: Vec::new(),
                reject_reactions: Vec::new(),
                locked: false,
                adopted: None,
            }),
        });
        Promise { shared }
    }

    /// Creates a promise and runs `executor` synchronously with its two
    /// settlement capabilities.
    ///
    /// An `Err` returned by the executor rejects the promise, unless it was
    /// already resolved or rejected.
    pub fn new<F>(jobs: &JobQueue, executor: F) -> Promise
    where
        F: FnOnce(Resolve, Reject) -> Result<(), Value>,
    {
        let promise = Promise::pending(jobs);
        let resolve = Resolve {
            promise: promise.clone(),
        };
        let reject = Reject {
            promise: promise.clone(),
        };
        if let Err(reason) = executor(resolve, reject) {
            trace!(promise = promise.id(), "executor failed");
            promise.settle_failure(reason);
        }
        promise
    }

    /// Creates a pending promise together with its capabilities.
    pub fn with_resolvers(jobs: &JobQueue) -> (Promise, Resolve, Reject) {
        let promise = Promise::pending(jobs);
        let resolve = Resolve {
            promise: promise.clone(),
        };
        let reject = Reject {
            promise: promise.clone(),
        };
        (promise, resolve, reject)
    }

    /// Creates a promise resolved with `value`.
    ///
    /// A thenable `value` is adopted, so the result may still be pending.
    pub fn resolve(jobs: &JobQueue, value: impl Into<Value>) -> Promise {
        let value = value.into();
        Promise::new(jobs, move |resolve, _| {
            resolve.call(value);
            Ok(())
        })
    }

    /// Creates a promise rejected with `reason`.
    ///
    /// A thenable `reason` is adopted the same way as in [`Promise::resolve`],
    /// so the result takes on the thenable's eventual outcome.
    pub fn reject(jobs: &JobQueue, reason: impl Into<Value>) -> Promise {
        let reason = reason.into();
        Promise::new(jobs, move |_, reject| {
            reject.call(reason);
            Ok(())
        })
    }

    /// Identifier unique within the creating thread, used in log output.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// The queue this promise schedules its reactions on.
    pub fn jobs(&self) -> &JobQueue {
        &self.shared.jobs
    }

    /// Current state.
    pub fn state(&self) -> PromiseState {
        self.shared.inner.borrow().state
    }

    /// Returns true once the promise is fulfilled or rejected.
    pub fn is_settled(&self) -> bool {
        self.state() != PromiseState::Pending
    }

    /// The settlement payload: the value if fulfilled, the reason if rejected.
    pub fn value(&self) -> Option<Value> {
        self.shared.inner.borrow().value.clone()
    }

    /// Returns true if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// This promise as a thenable payload.
    pub fn to_value(&self) -> Value {
        Value::Thenable(self.as_thenable())
    }

    fn as_thenable(&self) -> Rc<dyn Thenable> {
        self.shared.clone()
    }

    /// Appends reactions to the fulfillment and rejection sequences.
    ///
    /// Either may be absent. Reactions run asynchronously, exactly once, in
    /// registration order; registering on a settled promise schedules a new
    /// flush.
    pub fn register_reaction(
        &self,
        on_fulfilled: Option<SettleCallback>,
        on_rejected: Option<SettleCallback>,
    ) {
        {
            let mut inner = self.shared.inner.borrow_mut();
            if let Some(callback) = on_fulfilled {
                inner.fulfill_reactions.push(callback);
            }
            if let Some(callback) = on_rejected {
                inner.reject_reactions.push(callback);
            }
        }
        self.flush();
    }

    pub(crate) fn settle_success(&self, value: Value) {
        if self.lock() {
            self.resolve_value(value, 0);
        }
    }

    pub(crate) fn settle_failure(&self, reason: Value) {
        if self.lock() {
            self.reject_value(reason, 0);
        }
    }

    /// First capability call wins.
    fn lock(&self) -> bool {
        let mut inner = self.shared.inner.borrow_mut();
        if inner.locked || inner.state != PromiseState::Pending {
            return false;
        }
        inner.locked = true;
        true
    }

    fn resolve_value(&self, value: Value, depth: usize) {
        match value {
            Value::Thenable(thenable) => self.adopt(thenable, depth),
            other => self.settle(PromiseState::Fulfilled, other),
        }
    }

    // A thenable reason is followed like a thenable value.
    fn reject_value(&self, reason: Value, depth: usize) {
        match reason {
            Value::Thenable(thenable) => self.adopt(thenable, depth),
            other => self.settle(PromiseState::Rejected, other),
        }
    }

    fn adopt(&self, thenable: Rc<dyn Thenable>, depth: usize) {
        let max_depth = self.shared.jobs.config().max_adoption_depth;
        if depth >= max_depth {
            warn!(promise = self.id(), max_depth, "thenable adoption too deep");
            let error = JsError::range_error(format!(
                "thenable adoption exceeded maximum depth of {max_depth}"
            ));
            self.settle(PromiseState::Rejected, error.into());
            return;
        }
        if self.adoption_cycle(&thenable, max_depth) {
            warn!(promise = self.id(), "chaining cycle detected");
            let error = JsError::type_error(format!(
                "Chaining cycle detected for promise #{}",
                self.id()
            ));
            self.settle(PromiseState::Rejected, error.into());
            return;
        }

        trace!(promise = self.id(), depth, "adopting thenable");
        self.shared.inner.borrow_mut().adopted = Some(Rc::clone(&thenable));

        let called = Rc::new(Cell::new(false));
        let on_fulfilled: SettleCallback = {
            let this = self.clone();
            let called = Rc::clone(&called);
            Box::new(move |value| {
                if called.replace(true) {
                    return;
                }
                this.resolve_value(value, depth + 1);
            })
        };
        let on_rejected: SettleCallback = {
            let this = self.clone();
            Box::new(move |reason| {
                if called.replace(true) {
                    return;
                }
                this.reject_value(reason, depth + 1);
            })
        };
        thenable.subscribe(on_fulfilled, on_rejected);
    }

    /// Walks the adoption chain starting at `thenable` looking for `self`.
    fn adoption_cycle(&self, thenable: &Rc<dyn Thenable>, max_hops: usize) -> bool {
        let me = self.as_thenable();
        let mut cursor = Some(Rc::clone(thenable));
        let mut hops = 0;
        while let Some(current) = cursor {
            if same_thenable(&current, &me) {
                return true;
            }
            hops += 1;
            if hops > max_hops {
                return false;
            }
            cursor = current.adopted();
        }
        false
    }

    fn settle(&self, state: PromiseState, value: Value) {
        {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.state != PromiseState::Pending {
                return;
            }
            inner.state = state;
            inner.value = Some(value);
            inner.adopted = None;
        }
        trace!(promise = self.id(), %state, "settled");
        self.flush();
    }

    /// Schedules delivery of the currently registered reactions.
    fn flush(&self) {
        if !self.is_settled() {
            return;
        }
        debug!(promise = self.id(), "scheduling reaction flush");
        let shared = Rc::clone(&self.shared);
        self.shared.jobs.enqueue(MicroTask::new(move || {
            Promise { shared }.drain();
            Ok(())
        }));
    }

    fn drain(&self) {
        let (callbacks, payload) = {
            let mut inner = self.shared.inner.borrow_mut();
            let fulfilled = mem::take(&mut inner.fulfill_reactions);
            let rejected = mem::take(&mut inner.reject_reactions);
            let callbacks = match inner.state {
                PromiseState::Fulfilled => fulfilled,
                PromiseState::Rejected => rejected,
                PromiseState::Pending => return,
            };
            (callbacks, inner.value.clone().unwrap_or(Value::Undefined))
        };
        for callback in callbacks {
            callback(payload.clone());
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.borrow();
        f.debug_struct("Promise")
            .field("id", &self.shared.id)
            .field("state", &inner.state)
            .field("value", &inner.value)
            .field("fulfill_reactions", &inner.fulfill_reactions.len())
            .field("reject_reactions", &inner.reject_reactions.len())
            .finish()
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        promise.to_value()
    }
}

impl From<&Promise> for Value {
    fn from(promise: &Promise) -> Self {
        promise.to_value()
    }
}
