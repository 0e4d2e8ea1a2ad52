//! Core value and error types for the deferred-value engine.
//!
//! This crate provides the dynamically typed payloads that flow through
//! promises, the error values the engine raises, and the capability trait
//! that marks a value as adoptable during settlement.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of settlement payloads
//! - [`JsError`] - Error payloads raised by the engine or by user handlers
//! - [`ErrorKind`] - Types of errors
//! - [`Thenable`] - Capability interface of a deferred value
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let num = Value::Smi(42);
//! assert_eq!(num.to_string(), "42");
//!
//! let error = JsError::type_error("undefined is not a function");
//! assert_eq!(error.kind, ErrorKind::TypeError);
//! let reason: Value = error.into();
//! assert_eq!(reason.to_string(), "TypeError: undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod thenable;
mod value;

pub use error::{ErrorKind, JsError};
pub use thenable::{same_thenable, SettleCallback, Thenable};
pub use value::Value;
