//! Retrying arbitrary callables.

use super::function::Function;
use super::value::Value;
use crate::config::RetryConfig;
use crate::error::{InvokeError, Result};
use crate::retry::{BackoffStrategy, Failure, Retrier};
use std::time::Duration;
#[cfg(feature = "tracing")]
use tracing::debug;

impl<S> Retrier<S>
where
    S: BackoffStrategy,
{
    /// Invoke a dynamic callable until its trailing return value is nil or
    /// the attempt budget is spent.
    ///
    /// `callable` must hold a [`Function`]. Validation happens once, before
    /// the first invocation, and never consumes budget or sleeps:
    ///
    /// 1. the attempt budget must be at least one
    /// 2. the value must be callable
    /// 3. the arguments must fit the signature (count, then types)
    /// 4. the callable must return at least one value
    ///
    /// A callable without an error-shaped trailing return cannot signal
    /// failure, so it is invoked exactly once and all of its return values
    /// are handed back verbatim. With
    /// [`RetryConfig::require_error_return`] set it is rejected with
    /// [`InvokeError::NoErrorReturn`] instead.
    ///
    /// On success the trailing nil is dropped and the preceding values are
    /// returned. A trailing value that is neither nil nor an error aborts with
    /// [`InvokeError::InvalidErrorSentinel`] without retrying.
    pub fn invoke(&mut self, callable: &Value, args: &[Value]) -> Result<Vec<Value>> {
        let function = self.validate(callable, args)?;

        if !function.signature().has_error_output() {
            #[cfg(feature = "tracing")]
            debug!("callable cannot report errors, invoking once");
            return function.call_unchecked(args);
        }

        self.drive(|_| {
            let mut out = function.call_unchecked(args).map_err(Failure::Abort)?;
            match out.pop() {
                Some(Value::Nil) => Ok(out),
                Some(Value::Error(error)) => {
                    #[cfg(feature = "tracing")]
                    debug!(%error, "callable returned an error");
                    Err(Failure::Retry(InvokeError::OperationFailed(error)))
                }
                Some(other) => Err(Failure::Abort(InvokeError::InvalidErrorSentinel {
                    found: other.type_name(),
                })),
                None => Err(Failure::Abort(InvokeError::NoReturnValues)),
            }
        })
    }

    fn validate<'a>(&self, callable: &'a Value, args: &[Value]) -> Result<&'a Function> {
        if self.config().attempts == 0 {
            return Err(InvokeError::InvalidAttemptBudget);
        }

        let function = callable
            .downcast_ref::<Function>()
            .ok_or(InvokeError::NotCallable {
                found: callable.type_name(),
            })?;

        let signature = function.signature();
        signature.check_args(args)?;

        if signature.outputs() == 0 {
            return Err(InvokeError::NoReturnValues);
        }
        if !signature.has_error_output() && self.config().require_error_return {
            return Err(InvokeError::NoErrorReturn);
        }

        Ok(function)
    }
}

/// Retry an arbitrary callable with the default jittered exponential backoff.
///
/// `callable` is usually a [`Function`] converted into a [`Value`]; any other
/// value is rejected with [`InvokeError::NotCallable`]. See
/// [`Retrier::invoke`] for the full calling convention.
///
/// # Examples
///
/// ```rust
/// use retrier::{Function, Value, retry_dynamic, values};
/// use std::time::Duration;
///
/// let sum = Value::from(Function::new(|a: i32, b: i32, c: i32, d: i32| {
///     Ok::<_, std::io::Error>(a + b + c + d)
/// }));
///
/// let out = retry_dynamic(2, Duration::from_millis(1), &sum, &values![1, 2, 3, 4]).unwrap();
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0].get::<i32>(), Some(10));
/// ```
pub fn retry_dynamic(
    attempts: u32,
    initial_delay: Duration,
    callable: &Value,
    args: &[Value],
) -> Result<Vec<Value>> {
    Retrier::new(RetryConfig::new(attempts, initial_delay)).invoke(callable, args)
}
