//! The synchronous retry loop.

use super::exponential::ExponentialBackoff;
use super::strategy::BackoffStrategy;
use crate::config::RetryConfig;
use rand::RngCore;
use std::fmt;
use std::time::Duration;
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Blocks the calling thread between attempts.
///
/// [`ThreadSleep`] is the production implementation; tests substitute one
/// that records pauses instead of waiting.
pub trait Sleep: Send + Sync {
    /// Pause for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Draws from [`rand::thread_rng`], which is seeded once per thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RngCore for ThreadRandom {
    fn next_u32(&mut self) -> u32 {
        rand::thread_rng().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        rand::thread_rng().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        rand::thread_rng().try_fill_bytes(dest)
    }
}

/// How a failed attempt should be treated by the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure<E> {
    /// Transient, retry if budget remains.
    Retry(E),
    /// Return immediately.
    Abort(E),
}

/// A configured retry executor.
///
/// Owns the attempt budget, the backoff strategy, the sleeper and the random
/// source used for jitter. Every part is injectable so the loop can be
/// exercised deterministically without real time passing.
///
/// # Examples
///
/// ```rust
/// use retrier::{Retrier, RetryConfig};
/// use std::time::Duration;
///
/// let mut retrier = Retrier::new(RetryConfig::new(3, Duration::from_millis(1)));
///
/// let mut calls = 0;
/// let result = retrier.run(|| {
///     calls += 1;
///     if calls < 3 { Err("not yet") } else { Ok(calls) }
/// });
///
/// assert_eq!(result, Ok(3));
/// ```
pub struct Retrier<S = ExponentialBackoff> {
    config: RetryConfig,
    strategy: S,
    sleep: Box<dyn Sleep>,
    rng: Box<dyn RngCore + Send>,
}

impl Retrier<ExponentialBackoff> {
    /// Create a retrier using the default jittered exponential backoff.
    ///
    /// Jitter is drawn from the thread-local generator; see
    /// [`Retrier::with_rng`] to substitute a seeded one.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            strategy: ExponentialBackoff::default(),
            sleep: Box::new(ThreadSleep),
            rng: Box::new(ThreadRandom),
        }
    }
}

impl Default for Retrier<ExponentialBackoff> {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl<S> Retrier<S>
where
    S: BackoffStrategy,
{
    /// Replace the backoff strategy.
    pub fn with_strategy<T: BackoffStrategy>(self, strategy: T) -> Retrier<T> {
        Retrier {
            config: self.config,
            strategy,
            sleep: self.sleep,
            rng: self.rng,
        }
    }

    /// Replace the sleeper.
    pub fn with_sleep(mut self, sleep: impl Sleep + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Replace the random source used for jitter.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// The active backoff strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// The operation is always invoked at least once, even with a zero
    /// budget. Between failures the strategy is consulted and the retrier
    /// sleeps for the returned pause; it is never consulted after a success
    /// or after the last permitted attempt.
    ///
    /// # Returns
    /// - `Ok(T)`: the first successful result
    /// - `Err(E)`: the error from the last attempt
    pub fn run<T, E, F>(&mut self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.drive(|_| operation().map_err(Failure::Retry))
    }

    /// Core loop shared by [`Retrier::run`] and the dynamic invoker.
    ///
    /// `operation` receives the 1-based attempt number.
    pub(crate) fn drive<T, E, F>(&mut self, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, Failure<E>>,
    {
        let budget = self.config.effective_attempts();
        let mut delay = self.config.initial_delay;
        let mut attempt = 1;

        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(Failure::Abort(error)) => {
                    #[cfg(feature = "tracing")]
                    debug!(attempt, "aborting, failure is not retryable");
                    return Err(error);
                }
                Err(Failure::Retry(error)) => {
                    if attempt >= budget {
                        #[cfg(feature = "tracing")]
                        warn!(attempts = attempt, "retry budget exhausted");
                        return Err(error);
                    }

                    let step = self.strategy.next_delay(delay, &mut *self.rng);
                    #[cfg(feature = "tracing")]
                    debug!(
                        attempt,
                        budget,
                        pause = ?step.pause,
                        "attempt failed, backing off"
                    );
                    if !step.pause.is_zero() {
                        self.sleep.sleep(step.pause);
                    }
                    delay = step.next;
                    attempt += 1;
                }
            }
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Retrier<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("config", &self.config)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Retry `operation` with a caller-supplied backoff strategy.
///
/// Runs at most `attempts` times (at least once), starting from
/// `initial_delay`, and returns the first success or the last error.
///
/// # Examples
///
/// ```rust
/// use retrier::retry_with_custom_backoff;
/// use std::time::Duration;
///
/// let mut calls = 0;
/// let result: Result<(), &str> = retry_with_custom_backoff(
///     3,
///     Duration::from_millis(1),
///     |delay: Duration| delay, // constant
///     || {
///         calls += 1;
///         Err("still down")
///     },
/// );
///
/// assert_eq!(result, Err("still down"));
/// assert_eq!(calls, 3);
/// ```
pub fn retry_with_custom_backoff<T, E, S, F>(
    attempts: u32,
    initial_delay: Duration,
    strategy: S,
    operation: F,
) -> Result<T, E>
where
    S: BackoffStrategy,
    F: FnMut() -> Result<T, E>,
{
    Retrier::new(RetryConfig::new(attempts, initial_delay))
        .with_strategy(strategy)
        .run(operation)
}

/// Retry `operation` with the default jittered exponential backoff.
///
/// See [`ExponentialBackoff`] for the delay schedule. A zero
/// `initial_delay` retries without pausing.
///
/// # Examples
///
/// ```rust
/// use retrier::retry_exponential;
/// use std::time::Duration;
///
/// let result = retry_exponential(1, Duration::ZERO, || Ok::<_, std::io::Error>(42));
/// assert_eq!(result.unwrap(), 42);
/// ```
pub fn retry_exponential<T, E, F>(attempts: u32, initial_delay: Duration, operation: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    Retrier::new(RetryConfig::new(attempts, initial_delay)).run(operation)
}
