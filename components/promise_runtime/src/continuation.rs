//! `then`, `catch` and `finally`.
//!
//! Each continuation returns a new derived promise whose settlement comes
//! from running a user handler against the parent's settlement. Handlers run
//! inside a failure boundary: an `Err` rejects the derived promise.

use crate::promise::{Handler, Promise};
use core_types::{SettleCallback, Value};
use std::cell::Cell;
use std::rc::Rc;

impl Promise {
    /// Registers continuations and returns the derived promise.
    ///
    /// A missing handler forwards the parent's payload unchanged: values to
    /// the success side, reasons to the failure side. A handler that returns
    /// a thenable makes the derived promise adopt it.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_runtime::{EventLoop, Handler, Promise};
    /// use core_types::Value;
    ///
    /// let mut event_loop = EventLoop::new();
    /// let jobs = event_loop.jobs().clone();
    /// let chained = Promise::resolve(&jobs, 1)
    ///     .then(Some(Handler::new(move |_| Ok(Promise::resolve(&jobs, 2).into()))), None)
    ///     .then(None, None);
    ///
    /// event_loop.run_until_done().unwrap();
    /// assert_eq!(chained.value(), Some(Value::Smi(2)));
    /// ```
    pub fn then(&self, on_fulfilled: Option<Handler>, on_rejected: Option<Handler>) -> Promise {
        Promise::new(self.jobs(), |resolve, reject| {
            let on_success: SettleCallback = {
                let resolve = resolve.clone();
                let reject = reject.clone();
                Box::new(move |value| match on_fulfilled {
                    Some(handler) => match handler.call(value) {
                        Ok(result) => resolve.call(result),
                        Err(reason) => reject.call(reason),
                    },
                    None => resolve.call(value),
                })
            };
            let on_failure: SettleCallback = Box::new(move |reason| match on_rejected {
                Some(handler) => match handler.call(reason) {
                    Ok(result) => resolve.call(result),
                    Err(error) => reject.call(error),
                },
                None => reject.call(reason),
            });
            self.register_reaction(Some(on_success), Some(on_failure));
            Ok(())
        })
    }

    /// Registers a failure handler; shorthand for `then(None, Some(handler))`.
    pub fn catch(&self, on_rejected: Handler) -> Promise {
        self.then(None, Some(on_rejected))
    }

    /// Runs `f` once the promise settles, whatever the outcome.
    ///
    /// The derived promise keeps the parent's value or reason. If `f` fails,
    /// its error replaces the parent's outcome.
    pub fn finally<F>(&self, f: F) -> Promise
    where
        F: FnOnce() -> Result<(), Value> + 'static,
    {
        let f = Rc::new(Cell::new(Some(f)));
        let on_fulfilled = {
            let f = Rc::clone(&f);
            Handler::new(move |value| {
                if let Some(f) = f.take() {
                    f()?;
                }
                Ok(value)
            })
        };
        let on_rejected = Handler::new(move |reason| {
            if let Some(f) = f.take() {
                f()?;
            }
            Err(reason)
        });
        self.then(Some(on_fulfilled), Some(on_rejected))
    }

    /// Success-only `then` taking a closure directly.
    pub fn map<F>(&self, f: F) -> Promise
    where
        F: FnOnce(Value) -> Result<Value, Value> + 'static,
    {
        self.then(Some(Handler::new(f)), None)
    }
}
