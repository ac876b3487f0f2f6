//! Exponential backoff with jitter.

use super::strategy::{BackoffStrategy, Delay};
use rand::{Rng, RngCore};
use std::time::Duration;

/// Exponential backoff strategy with configurable jitter.
///
/// Each step pauses for the current delay plus a random fraction of it, then
/// grows the delay by `multiplier`. Jitter keeps independent callers from
/// retrying in lockstep.
///
/// # Mathematical Formula
///
/// For a current delay `d`:
/// ```text
/// pause = d + uniform[0, d) * jitter
/// next  = pause * multiplier
/// ```
/// Both values are capped at `max_delay` when one is configured.
///
/// With the defaults (`multiplier = 2.0`, `jitter = 0.5`) this is
/// `pause = d + random(0, d) / 2` and `next = 2 * pause`.
///
/// A zero current delay is a fixed point: it yields [`Delay::ZERO`], so the
/// retry loop retries immediately without ever growing the delay. Seed a
/// non-zero initial delay to get backoff.
///
/// # Examples
///
/// ```rust
/// use retrier::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// // Default configuration (multiplier=2.0, jitter=0.5, no cap)
/// let backoff = ExponentialBackoff::default();
///
/// // Custom configuration
/// let backoff = ExponentialBackoff::builder()
///     .multiplier(3.0)
///     .jitter(0.0)
///     .max_delay(Duration::from_secs(30))
///     .build();
///
/// let step = backoff.next_delay(Duration::from_millis(100), &mut rand::thread_rng());
/// assert_eq!(step.pause, Duration::from_millis(100));
/// assert_eq!(step.next, Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    multiplier: f64,
    jitter: f64,
    max_delay: Option<Duration>,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// The growth factor applied after each pause.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The jitter fraction in `[0.0, 1.0]`.
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// The optional upper bound on pauses and delay state.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl Default for ExponentialBackoff {
    /// Defaults:
    /// - `multiplier`: 2.0 (doubles each time)
    /// - `jitter`: 0.5 (adds up to half the current delay)
    /// - `max_delay`: none
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            jitter: 0.5,
            max_delay: None,
        }
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn next_delay(&self, current: Duration, rng: &mut dyn RngCore) -> Delay {
        if current.is_zero() {
            return Delay::ZERO;
        }

        let jittered = if self.jitter > 0.0 {
            let fraction = rng.gen_range(0.0..1.0) * self.jitter;
            current.saturating_add(scale(current, fraction))
        } else {
            current
        };

        let pause = self.cap(jittered);
        let next = self.cap(scale(pause, self.multiplier));
        Delay::new(pause, next)
    }
}

/// Multiply a duration by a non-negative factor, saturating on overflow.
fn scale(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Builder for configuring `ExponentialBackoff`.
///
/// # Examples
///
/// ```rust
/// use retrier::retry::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .multiplier(1.5)
///     .jitter(0.1)
///     .max_delay(Duration::from_secs(30))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    multiplier: Option<f64>,
    jitter: Option<f64>,
    max_delay: Option<Duration>,
}

impl ExponentialBackoffBuilder {
    /// Set the exponential multiplier.
    ///
    /// Values below 1.0 (and NaN) are raised to 1.0 so the delay never
    /// shrinks.
    ///
    /// Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(if multiplier >= 1.0 { multiplier } else { 1.0 });
        self
    }

    /// Set the jitter factor (0.0 to 1.0).
    ///
    /// A jitter of 0.5 lets a pause grow by up to half of the current delay.
    ///
    /// Default: 0.5
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) });
        self
    }

    /// Set the maximum delay between retries.
    ///
    /// Default: unbounded
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Build the `ExponentialBackoff` instance.
    ///
    /// Uses default values for any unset parameters.
    pub fn build(self) -> ExponentialBackoff {
        let defaults = ExponentialBackoff::default();
        ExponentialBackoff {
            multiplier: self.multiplier.unwrap_or(defaults.multiplier),
            jitter: self.jitter.unwrap_or(defaults.jitter),
            max_delay: self.max_delay.or(defaults.max_delay),
        }
    }
}
