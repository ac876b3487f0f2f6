//! Error types for the dynamic invoker.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// A shareable error value as produced by a wrapped callable.
pub type BoxError = Arc<dyn StdError + Send + Sync + 'static>;

/// Result type alias for dynamic invocations.
pub type Result<T> = std::result::Result<T, InvokeError>;

/// Errors returned by [`retry_dynamic`](crate::retry_dynamic) and
/// [`Retrier::invoke`](crate::Retrier::invoke).
///
/// Everything except [`InvokeError::OperationFailed`] and
/// [`InvokeError::InvalidErrorSentinel`] is detected before the callable is
/// invoked, so no attempt budget is consumed and no time is spent sleeping.
#[derive(Debug, Clone, Error)]
pub enum InvokeError {
    /// The attempt budget was zero.
    #[error("retry: attempts must be greater than 0")]
    InvalidAttemptBudget,

    /// The supplied value does not hold a [`Function`](crate::Function).
    #[error("retry: value of type `{found}` is not callable")]
    NotCallable {
        /// Type name of the supplied value
        found: &'static str,
    },

    /// The number of arguments does not fit the callable's parameters.
    #[error(
        "retry: argument count mismatch: expected {qualifier}{expected}, got {found}",
        qualifier = at_least(.variadic)
    )]
    ArgumentCountMismatch {
        /// Declared fixed parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
        /// Whether the callable accepts extra trailing arguments
        variadic: bool,
    },

    /// An argument's runtime type does not match the declared parameter.
    #[error("retry: argument {index} has type `{found}`, expected `{expected}`")]
    ArgumentTypeMismatch {
        /// Zero-based argument position
        index: usize,
        /// Declared parameter type
        expected: &'static str,
        /// Supplied argument type
        found: &'static str,
    },

    /// The callable returns nothing, so failure cannot be observed.
    #[error("retry: callable must return at least one value")]
    NoReturnValues,

    /// The callable has no error-shaped trailing return and the retrier
    /// requires one.
    #[error("retry: callable's last return value must be error-shaped")]
    NoErrorReturn,

    /// The trailing return value was neither nil nor an error.
    #[error("retry: callable's last return value must be an error or nil, got `{found}`")]
    InvalidErrorSentinel {
        /// Type name of the offending value
        found: &'static str,
    },

    /// The callable kept failing until the attempt budget ran out.
    #[error("retry: operation failed: {0}")]
    OperationFailed(#[source] BoxError),
}

fn at_least(variadic: &bool) -> &'static str {
    if *variadic { "at least " } else { "" }
}

impl InvokeError {
    /// Whether this error was raised by upfront validation, before any
    /// invocation.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidAttemptBudget
                | Self::NotCallable { .. }
                | Self::ArgumentCountMismatch { .. }
                | Self::ArgumentTypeMismatch { .. }
                | Self::NoReturnValues
                | Self::NoErrorReturn
        )
    }

    /// The error returned by the last failed attempt, if any.
    pub fn cause(&self) -> Option<&BoxError> {
        match self {
            Self::OperationFailed(cause) => Some(cause),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_display() {
        let fixed = InvokeError::ArgumentCountMismatch {
            expected: 2,
            found: 3,
            variadic: false,
        };
        assert_eq!(
            fixed.to_string(),
            "retry: argument count mismatch: expected 2, got 3"
        );

        let variadic = InvokeError::ArgumentCountMismatch {
            expected: 1,
            found: 0,
            variadic: true,
        };
        assert_eq!(
            variadic.to_string(),
            "retry: argument count mismatch: expected at least 1, got 0"
        );
    }

    #[test]
    fn test_operation_failed_exposes_source() {
        let cause: BoxError = Arc::new(std::io::Error::other("disk on fire"));
        let err = InvokeError::OperationFailed(cause);

        assert!(!err.is_structural());
        assert_eq!(err.cause().map(|c| c.to_string()).as_deref(), Some("disk on fire"));
        assert_eq!(
            StdError::source(&err).map(|s| s.to_string()).as_deref(),
            Some("disk on fire")
        );
    }

    #[test]
    fn test_structural_classification() {
        assert!(InvokeError::InvalidAttemptBudget.is_structural());
        assert!(InvokeError::NoReturnValues.is_structural());
        assert!(InvokeError::NoErrorReturn.is_structural());
        assert!(InvokeError::NotCallable { found: "i32" }.is_structural());
        assert!(!InvokeError::InvalidErrorSentinel { found: "bool" }.is_structural());
    }
}
