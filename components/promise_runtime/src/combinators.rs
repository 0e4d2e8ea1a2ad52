//! Multi-promise combinators: `all`, `all_settled`, `any`, `race`.
//!
//! Each combinator takes an already materialized slice of promises and
//! returns one derived promise. Inputs are observed through
//! [`Promise::register_reaction`], so "first" means first to be flushed;
//! ties among inputs settled before the call resolve in input order.

use crate::promise::{Promise, PromiseState};
use crate::task_queue::JobQueue;
use core_types::{JsError, SettleCallback, Value};
use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;
use tracing::debug;

/// Typed view of one `all_settled` record.
///
/// Records are `Value::Object`s of the form `{status: "fulfilled", value}`
/// or `{status: "rejected", reason}`.
///
/// # Examples
///
/// ```
/// use promise_runtime::SettledOutcome;
/// use core_types::Value;
///
/// let record = SettledOutcome::Rejected(Value::from("e")).to_value();
/// assert_eq!(record.get("status"), Some(&Value::from("rejected")));
/// assert_eq!(SettledOutcome::from_value(&record), Some(SettledOutcome::Rejected(Value::from("e"))));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SettledOutcome {
    /// The input fulfilled with this value
    Fulfilled(Value),
    /// The input rejected with this reason
    Rejected(Value),
}

impl SettledOutcome {
    /// The record's `status` field.
    pub fn status(&self) -> PromiseState {
        match self {
            SettledOutcome::Fulfilled(_) => PromiseState::Fulfilled,
            SettledOutcome::Rejected(_) => PromiseState::Rejected,
        }
    }

    /// Builds the record value.
    pub fn to_value(&self) -> Value {
        let status = Value::from(self.status().as_str());
        match self {
            SettledOutcome::Fulfilled(value) => {
                Value::object([("status", status), ("value", value.clone())])
            }
            SettledOutcome::Rejected(reason) => {
                Value::object([("status", status), ("reason", reason.clone())])
            }
        }
    }

    /// Parses a record value; `None` if it is not a well-formed record.
    pub fn from_value(record: &Value) -> Option<Self> {
        match record.get("status")? {
            Value::String(s) if s == PromiseState::Fulfilled.as_str() => {
                Some(SettledOutcome::Fulfilled(record.get("value")?.clone()))
            }
            Value::String(s) if s == PromiseState::Rejected.as_str() => {
                Some(SettledOutcome::Rejected(record.get("reason")?.clone()))
            }
            _ => None,
        }
    }
}

impl Promise {
    /// Fulfills with every input's value, in input order, once all inputs
    /// fulfill; rejects with the first rejection.
    ///
    /// An empty input fulfills with an empty array.
    pub fn all(jobs: &JobQueue, promises: &[Promise]) -> Promise {
        if promises.is_empty() {
            return Promise::resolve(jobs, Value::Array(Vec::new()));
        }
        let total = promises.len();
        debug!(inputs = total, "Promise.all");

        Promise::new(jobs, |resolve, reject| {
            let values = Rc::new(RefCell::new(vec![Value::Undefined; total]));
            let fulfilled = Rc::new(Cell::new(0usize));

            for (index, promise) in promises.iter().enumerate() {
                let on_fulfilled: SettleCallback = {
                    let values = Rc::clone(&values);
                    let fulfilled = Rc::clone(&fulfilled);
                    let resolve = resolve.clone();
                    Box::new(move |value| {
                        values.borrow_mut()[index] = value;
                        fulfilled.set(fulfilled.get() + 1);
                        if fulfilled.get() == total {
                            let values = mem::take(&mut *values.borrow_mut());
                            resolve.call(Value::Array(values));
                        }
                    })
                };
                let on_rejected: SettleCallback = {
                    let reject = reject.clone();
                    Box::new(move |reason| reject.call(reason))
                };
                promise.register_reaction(Some(on_fulfilled), Some(on_rejected));
            }
            Ok(())
        })
    }

    /// Fulfills, once every input has settled, with one
    /// [`SettledOutcome`] record per input. Never rejects.
    pub fn all_settled(jobs: &JobQueue, promises: &[Promise]) -> Promise {
        if promises.is_empty() {
            return Promise::resolve(jobs, Value::Array(Vec::new()));
        }
        let total = promises.len();
        debug!(inputs = total, "Promise.allSettled");

        Promise::new(jobs, |resolve, _| {
            let records = Rc::new(RefCell::new(vec![Value::Undefined; total]));
            let settled = Rc::new(Cell::new(0usize));

            let record = {
                let records = Rc::clone(&records);
                move |index: usize, outcome: SettledOutcome| {
                    records.borrow_mut()[index] = outcome.to_value();
                    settled.set(settled.get() + 1);
                    if settled.get() == total {
                        let records = mem::take(&mut *records.borrow_mut());
                        resolve.call(Value::Array(records));
                    }
                }
            };
            let record = Rc::new(record);

            for (index, promise) in promises.iter().enumerate() {
                let on_fulfilled: SettleCallback = {
                    let record = Rc::clone(&record);
                    Box::new(move |value| record(index, SettledOutcome::Fulfilled(value)))
                };
                let on_rejected: SettleCallback = {
                    let record = Rc::clone(&record);
                    Box::new(move |reason| record(index, SettledOutcome::Rejected(reason)))
                };
                promise.register_reaction(Some(on_fulfilled), Some(on_rejected));
            }
            Ok(())
        })
    }

    /// Fulfills with the first input to fulfill; rejects with an
    /// `AggregateError` of every reason, in input order, once all inputs
    /// reject.
    ///
    /// An empty input rejects with an `AggregateError` holding no reasons.
    pub fn any(jobs: &JobQueue, promises: &[Promise]) -> Promise {
        if promises.is_empty() {
            return Promise::reject(jobs, JsError::aggregate(Vec::new()));
        }
        let total = promises.len();
        debug!(inputs = total, "Promise.any");

        Promise::new(jobs, |resolve, reject| {
            let reasons = Rc::new(RefCell::new(vec![Value::Undefined; total]));
            let rejected = Rc::new(Cell::new(0usize));

            for (index, promise) in promises.iter().enumerate() {
                let on_fulfilled: SettleCallback = {
                    let resolve = resolve.clone();
                    Box::new(move |value| resolve.call(value))
                };
                let on_rejected: SettleCallback = {
                    let reasons = Rc::clone(&reasons);
                    let rejected = Rc::clone(&rejected);
                    let reject = reject.clone();
                    Box::new(move |reason| {
                        reasons.borrow_mut()[index] = reason;
                        rejected.set(rejected.get() + 1);
                        if rejected.get() == total {
                            let reasons = mem::take(&mut *reasons.borrow_mut());
                            reject.call(JsError::aggregate(reasons));
                        }
                    })
                };
                promise.register_reaction(Some(on_fulfilled), Some(on_rejected));
            }
            Ok(())
        })
    }

    /// Settles like the first input to settle.
    ///
    /// An empty input never settles.
    pub fn race(jobs: &JobQueue, promises: &[Promise]) -> Promise {
        debug!(inputs = promises.len(), "Promise.race");

        Promise::new(jobs, |resolve, reject| {
            for promise in promises {
                let on_fulfilled: SettleCallback = {
                    let resolve = resolve.clone();
                    Box::new(move |value| resolve.call(value))
                };
                let on_rejected: SettleCallback = {
                    let reject = reject.clone();
                    Box::new(move |reason| reject.call(reason))
                };
                promise.register_reaction(Some(on_fulfilled), Some(on_rejected));
            }
            Ok(())
        })
    }
}
