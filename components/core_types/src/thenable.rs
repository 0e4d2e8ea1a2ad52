//! The deferred-value capability.
//!
//! A value that implements [`Thenable`] is adopted, not stored, when it is
//! used to settle a promise: the promise subscribes to it and takes over its
//! eventual outcome.

use crate::Value;
use std::rc::Rc;

/// One-shot callback receiving a settlement payload.
pub type SettleCallback = Box<dyn FnOnce(Value)>;

/// Capability interface of a deferred value.
///
/// Implementors must eventually call at most one of the two callbacks, at
/// most once.
pub trait Thenable {
    /// Registers continuations for this value's eventual settlement.
    fn subscribe(&self, on_fulfilled: SettleCallback, on_rejected: SettleCallback);

    /// The thenable this value is currently waiting on, if any.
    ///
    /// Used to walk adoption chains when looking for cycles.
    fn adopted(&self) -> Option<Rc<dyn Thenable>> {
        None
    }
}

/// Returns true if both handles point at the same thenable allocation.
pub fn same_thenable(a: &Rc<dyn Thenable>, b: &Rc<dyn Thenable>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}
