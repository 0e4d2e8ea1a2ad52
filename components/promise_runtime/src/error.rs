//! Host-level runtime errors.
//!
//! Promise failures are settlement outcomes and never surface here. These
//! errors describe the event loop itself failing.

use core_types::JsError;
use thiserror::Error;

/// Errors raised while driving the task and microtask queues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A task or microtask returned an error
    #[error("task failed: {0}")]
    TaskFailed(#[from] JsError),

    /// A single checkpoint kept producing microtasks past the configured limit
    #[error("microtask checkpoint exceeded {limit} microtasks")]
    MicrotaskLimitExceeded {
        /// The configured limit
        limit: usize,
    },
}

/// Result type for event loop operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
