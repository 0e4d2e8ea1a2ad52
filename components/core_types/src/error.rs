//! Error payloads and error kinds.
//!
//! This module provides the error values that travel through the rejection
//! channel, modelled after JavaScript's built-in error constructors.

use crate::Value;
use std::fmt;
use thiserror::Error;

/// The kind of an error payload.
///
/// These correspond to the built-in error constructors a promise engine
/// needs to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic error raised by user code
    Error,
    /// Type error (e.g. a promise resolved with itself)
    TypeError,
    /// Value out of allowed range (e.g. adoption nested too deeply)
    RangeError,
    /// Several failures wrapped into one
    AggregateError,
}

impl ErrorKind {
    /// Returns the constructor name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::AggregateError => "AggregateError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error payload with a message.
///
/// Aggregate errors additionally carry the ordered list of reasons they wrap
/// in [`JsError::errors`]; for every other kind that list is empty.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError, Value};
///
/// let error = JsError::new(ErrorKind::RangeError, "too deep");
/// assert_eq!(error.to_string(), "RangeError: too deep");
///
/// let aggregate = JsError::aggregate(vec![Value::from("a"), Value::from("b")]);
/// assert_eq!(aggregate.kind, ErrorKind::AggregateError);
/// assert_eq!(aggregate.errors.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Wrapped reasons, index-aligned with the inputs that produced them
    pub errors: Vec<Value>,
}

impl JsError {
    /// Creates an error of the given kind with no wrapped reasons.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Creates a plain `Error`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    /// Creates a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Creates a `RangeError`.
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    /// Creates an `AggregateError` wrapping `errors` in order.
    pub fn aggregate(errors: Vec<Value>) -> Self {
        Self {
            kind: ErrorKind::AggregateError,
            message: "All promises were rejected".to_string(),
            errors,
        }
    }
}
