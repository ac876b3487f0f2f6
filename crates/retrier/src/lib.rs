#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Synchronous retry with backoff.
//!
//! This crate runs an operation repeatedly until it succeeds or an attempt
//! budget is exhausted, pausing between attempts according to a pluggable
//! [`BackoffStrategy`](retry::BackoffStrategy):
//!
//! - **Typed retries** via [`retry_with_custom_backoff`] and [`retry_exponential`]
//!   for closures returning `Result<T, E>`
//! - **Dynamic retries** via [`retry_dynamic`] for callables of arbitrary
//!   signature wrapped in a [`Function`], with arguments and results carried
//!   as [`Value`]s
//! - **Configurable executors** via [`Retrier`] and [`RetryConfig`], with an
//!   injectable sleeper and random source
//!
//! Everything runs on the calling thread. Pauses are blocking sleeps, there
//! is no background work and no cancellation: once started, a retry cycle
//! runs until success or budget exhaustion.
//!
//! # Examples
//!
//! ```rust
//! use retrier::prelude::*;
//! use std::time::Duration;
//!
//! let mut calls = 0;
//! let result = retry_exponential(3, Duration::from_millis(1), || {
//!     calls += 1;
//!     if calls < 2 { Err("transient") } else { Ok(calls) }
//! });
//! assert_eq!(result, Ok(2));
//!
//! let div = Value::from(Function::new(|a: f64, b: f64| {
//!     if b == 0.0 {
//!         Err(std::io::Error::other("can not divide by zero"))
//!     } else {
//!         Ok(a / b)
//!     }
//! }));
//! let out = retry_dynamic(2, Duration::from_millis(1), &div, &values![9.0, 3.0]).unwrap();
//! assert_eq!(out[0].get::<f64>(), Some(3.0));
//! ```

pub mod config;
pub mod dynamic;
pub mod error;
pub mod retry;

#[cfg(test)]
mod testing;

pub use config::RetryConfig;
pub use dynamic::{Function, Value, retry_dynamic};
pub use error::{InvokeError, Result};
pub use retry::{Retrier, retry_exponential, retry_with_custom_backoff};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use retrier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RetryConfig;
    pub use crate::dynamic::{Function, Value, retry_dynamic};
    pub use crate::error::InvokeError;
    pub use crate::retry::{
        BackoffStrategy, Delay, ExponentialBackoff, Retrier, retry_exponential,
        retry_with_custom_backoff,
    };
    pub use crate::values;
}
