//! Retry loop and backoff strategies.
//!
//! The loop and the delay computation are separate pieces:
//!
//! - [`BackoffStrategy`] - pure computation of the next [`Delay`]
//! - [`ExponentialBackoff`] - the default jittered exponential strategy
//! - [`Retrier`] - the loop, which owns the attempt budget and sleeps via [`Sleep`]
//!
//! # Examples
//!
//! ```rust
//! use retrier::retry::{ExponentialBackoff, Retrier};
//! use retrier::RetryConfig;
//! use std::time::Duration;
//!
//! let mut retrier = Retrier::new(RetryConfig::new(3, Duration::from_millis(1)))
//!     .with_strategy(ExponentialBackoff::builder().jitter(0.0).build());
//!
//! let result = retrier.run(|| Ok::<_, std::io::Error>(42));
//! assert_eq!(result.unwrap(), 42);
//! ```

mod executor;
mod exponential;
mod strategy;

pub(crate) use executor::Failure;
pub use executor::{
    Retrier, Sleep, ThreadRandom, ThreadSleep, retry_exponential, retry_with_custom_backoff,
};
pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use strategy::{BackoffStrategy, Delay};
