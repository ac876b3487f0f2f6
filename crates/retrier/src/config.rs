//! Configuration for the retry executor.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`Retrier`](crate::Retrier).
///
/// Deserializable so it can live alongside the rest of an application's
/// settings:
///
/// ```rust
/// use retrier::RetryConfig;
/// use std::time::Duration;
///
/// let config: RetryConfig = toml::from_str(r#"
///     attempts = 5
///     initial_delay = { secs = 0, nanos = 250000000 }
/// "#).unwrap();
///
/// assert_eq!(config.attempts, 5);
/// assert_eq!(config.initial_delay, Duration::from_millis(250));
/// assert!(!config.require_error_return);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of invocations of the wrapped operation.
    ///
    /// The typed loop always invokes at least once, even when this is zero.
    /// The dynamic invoker rejects zero.
    pub attempts: u32,

    /// Reject callables without an error-shaped trailing return instead of
    /// invoking them once.
    pub require_error_return: bool,

    /// Delay state seeded into the backoff strategy. Zero means "no pause".
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            require_error_return: false,
            initial_delay: Duration::from_millis(100),
        }
    }
}

impl RetryConfig {
    /// Create a config with the given budget and initial delay.
    pub fn new(attempts: u32, initial_delay: Duration) -> Self {
        Self {
            attempts,
            initial_delay,
            ..Self::default()
        }
    }

    /// Set the attempt budget.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the initial delay.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Require callables to declare an error-shaped trailing return.
    pub fn require_error_return(mut self, require: bool) -> Self {
        self.require_error_return = require;
        self
    }

    /// The number of invocations the typed loop performs at most.
    ///
    /// This is the at-least-once rule: a zero budget still runs once.
    pub fn effective_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}
