//! The backoff strategy abstraction.

use rand::RngCore;
use std::time::Duration;

/// One step of a backoff schedule.
///
/// `pause` is how long the retry loop sleeps before the next attempt, `next`
/// becomes the current delay handed to the strategy after the following
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delay {
    /// Time to sleep before the next attempt.
    pub pause: Duration,
    /// Delay state carried into the next strategy call.
    pub next: Duration,
}

impl Delay {
    /// No pause, no growth.
    pub const ZERO: Delay = Delay {
        pause: Duration::ZERO,
        next: Duration::ZERO,
    };

    /// Create a new delay step.
    pub fn new(pause: Duration, next: Duration) -> Self {
        Self { pause, next }
    }
}

/// A strategy computing the delay between retry attempts.
///
/// Strategies are pure: they never sleep themselves. The retry loop asks the
/// strategy for a [`Delay`] after a failed attempt that will be followed by
/// another attempt, sleeps for [`Delay::pause`], and feeds [`Delay::next`]
/// back in on the following failure.
///
/// Randomness is supplied by the caller so that jitter can be made
/// deterministic under test.
///
/// # Examples
///
/// Any `Fn(Duration) -> Duration` is a strategy. The current delay is used
/// as the pause and the closure's result becomes the next delay:
///
/// ```rust
/// use retrier::retry::{BackoffStrategy, Delay};
/// use std::time::Duration;
///
/// let linear = |current: Duration| current + Duration::from_millis(10);
/// let step = linear.next_delay(Duration::from_millis(5), &mut rand::thread_rng());
///
/// assert_eq!(step, Delay::new(Duration::from_millis(5), Duration::from_millis(15)));
/// ```
pub trait BackoffStrategy {
    /// Compute the pause before the next attempt and the delay state that
    /// follows it.
    ///
    /// # Parameters
    /// - `current`: the delay state after the previous step (the caller's
    ///   initial delay on the first call)
    /// - `rng`: random source for jitter
    fn next_delay(&self, current: Duration, rng: &mut dyn RngCore) -> Delay;
}

impl<F> BackoffStrategy for F
where
    F: Fn(Duration) -> Duration,
{
    fn next_delay(&self, current: Duration, _rng: &mut dyn RngCore) -> Delay {
        Delay::new(current, self(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_pauses_for_current_delay() {
        let constant = |current: Duration| current;
        let mut rng = rand::thread_rng();

        let step = constant.next_delay(Duration::from_millis(7), &mut rng);
        assert_eq!(step.pause, Duration::from_millis(7));
        assert_eq!(step.next, Duration::from_millis(7));
    }

    #[test]
    fn test_closure_doubling() {
        let doubling = |current: Duration| current * 2;
        let mut rng = rand::thread_rng();

        let first = doubling.next_delay(Duration::from_millis(1), &mut rng);
        let second = doubling.next_delay(first.next, &mut rng);

        assert_eq!(first, Delay::new(Duration::from_millis(1), Duration::from_millis(2)));
        assert_eq!(second, Delay::new(Duration::from_millis(2), Duration::from_millis(4)));
    }

    #[test]
    fn test_zero_delay_constant() {
        assert_eq!(Delay::ZERO, Delay::default());
    }
}
