//! Deferred values and the microtask event loop that drives them.
//!
//! This crate provides:
//! - [`Promise`] - a value settled at most once, with `then`/`catch`/`finally`
//!   continuations and the `all`/`all_settled`/`any`/`race` combinators
//! - [`JobQueue`] - the FIFO microtask queue promises schedule reactions on
//! - [`EventLoop`] - a host loop owning the task queue and the job queue
//! - [`RuntimeConfig`] - limits shared by a loop and its promises
//!
//! Everything here is single-threaded; promises are `Rc` handles and are
//! neither `Send` nor `Sync`.
//!
//! # Examples
//!
//! ```
//! use promise_runtime::{EventLoop, Handler, Promise, PromiseState};
//! use core_types::Value;
//!
//! let mut event_loop = EventLoop::new();
//! let jobs = event_loop.jobs().clone();
//!
//! let results = Promise::all(
//!     &jobs,
//!     &[Promise::resolve(&jobs, 1), Promise::resolve(&jobs, 2)],
//! );
//! let recovered = Promise::reject(&jobs, "e").catch(Handler::new(|_| Ok(Value::Smi(0))));
//!
//! event_loop.run_until_done().unwrap();
//! assert_eq!(results.value(), Some(Value::Array(vec![Value::Smi(1), Value::Smi(2)])));
//! assert_eq!(recovered.state(), PromiseState::Fulfilled);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combinators;
pub mod config;
pub mod continuation;
pub mod error;
pub mod event_loop;
pub mod promise;
pub mod task_queue;

// Re-export main types at crate root
pub use combinators::SettledOutcome;
pub use config::RuntimeConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use event_loop::{EventLoop, EventLoopStats};
pub use promise::{Handler, Promise, PromiseState, Reject, Resolve};
pub use task_queue::{JobQueue, MicroTask, MicrotaskQueue, Task, TaskQueue};
