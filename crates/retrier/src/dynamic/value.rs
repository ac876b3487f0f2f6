//! Type-erased values passed to and returned from dynamic callables.

use crate::error::BoxError;
use std::any::{Any, type_name};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A dynamically typed argument or return value.
///
/// The three variants mirror the calling convention of the dynamic invoker:
/// the trailing return value of a callable is either [`Value::Nil`]
/// (success), [`Value::Error`] (retryable failure) or anything else
/// (a malformed convention).
///
/// Values are cheap to clone; the payload is reference counted.
///
/// # Examples
///
/// ```rust
/// use retrier::Value;
///
/// let value = Value::new(42_i64);
/// assert_eq!(value.downcast_ref::<i64>(), Some(&42));
/// assert_eq!(value.type_name(), "i64");
/// assert!(value.downcast_ref::<i32>().is_none());
/// ```
#[derive(Clone)]
pub enum Value {
    /// The absence of a value.
    Nil,
    /// An error value.
    Error(BoxError),
    /// Any other value.
    Data {
        /// The payload
        inner: Arc<dyn Any + Send + Sync>,
        /// `std::any::type_name` of the payload
        type_name: &'static str,
    },
}

impl Value {
    /// Wrap a value.
    ///
    /// A `Value` passed here is returned unchanged rather than nested, so
    /// `Value::new(Value::Nil)` is still nil. Errors wrapped this way are
    /// plain data; use [`Value::error`] to mark a value as error-shaped.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut slot = Some(value);
        if let Some(value) = (&mut slot as &mut dyn Any)
            .downcast_mut::<Option<Value>>()
            .and_then(Option::take)
        {
            return value;
        }

        match slot {
            Some(value) => Value::Data {
                inner: Arc::new(value),
                type_name: type_name::<T>(),
            },
            None => Value::Nil,
        }
    }

    /// Wrap an error.
    ///
    /// Accepts anything that converts into a boxed error, including
    /// `Box<dyn Error + Send + Sync>` itself and plain strings.
    pub fn error<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let boxed: Box<dyn StdError + Send + Sync> = error.into();
        Value::Error(Arc::from(boxed))
    }

    /// Whether this is [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The error held by this value, if it is error-shaped.
    pub fn as_error(&self) -> Option<&BoxError> {
        match self {
            Value::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        match self {
            Value::Data { inner, .. } => inner.is::<T>(),
            _ => false,
        }
    }

    /// Borrow the payload as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Data { inner, .. } => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Clone the payload out as a `T`.
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// A human readable name of the held type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Error(_) => "error",
            Value::Data { type_name, .. } => *type_name,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Error(error) => f.debug_tuple("Error").field(&error.to_string()).finish(),
            Value::Data { type_name, .. } => write!(f, "Data(<{type_name}>)"),
        }
    }
}

/// Build a `Vec<Value>` from a list of expressions.
///
/// Expressions that already are [`Value`]s are kept as they are, so nil and
/// error arguments can be mixed with plain data.
///
/// ```rust
/// use retrier::{Value, values};
///
/// let args = values![1_i32, 2.5_f64, "three", Value::Nil];
/// assert_eq!(args.len(), 4);
/// assert_eq!(args[1].get::<f64>(), Some(2.5));
/// assert!(args[3].is_nil());
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::new($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil() {
        let value = Value::Nil;
        assert!(value.is_nil());
        assert!(value.as_error().is_none());
        assert!(value.downcast_ref::<()>().is_none());
        assert_eq!(value.type_name(), "nil");
    }

    #[test]
    fn test_error_is_not_data() {
        let value = Value::error(std::io::Error::other("boom"));
        assert!(!value.is_nil());
        assert_eq!(value.as_error().map(|e| e.to_string()).as_deref(), Some("boom"));
        assert!(!value.is::<std::io::Error>());
        assert_eq!(format!("{value:?}"), "Error(\"boom\")");
    }

    #[test]
    fn test_data_downcast() {
        let value = Value::new(String::from("hello"));
        assert!(value.is::<String>());
        assert_eq!(value.get::<String>().as_deref(), Some("hello"));
        assert_eq!(value.type_name(), "alloc::string::String");
        assert_eq!(format!("{value:?}"), "Data(<alloc::string::String>)");
    }

    #[test]
    fn test_clone_shares_payload() {
        let value = Value::new(vec![1_u8, 2, 3]);
        let copy = value.clone();
        assert_eq!(copy.downcast_ref::<Vec<u8>>(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn test_values_macro() {
        let empty = values![];
        assert!(empty.is_empty());

        let args = values![1_i32, true,];
        assert_eq!(args[0].get::<i32>(), Some(1));
        assert_eq!(args[1].get::<bool>(), Some(true));
    }

    #[test]
    fn test_values_macro_keeps_existing_values() {
        let args = values![Value::Nil, 3_u8, Value::error("refused")];

        assert!(args[0].is_nil());
        assert_eq!(args[1].get::<u8>(), Some(3));
        assert_eq!(
            args[2].as_error().map(|e| e.to_string()).as_deref(),
            Some("refused")
        );
    }

    #[test]
    fn test_new_does_not_nest_values() {
        let inner = Value::new(5_i64);
        let outer = Value::new(inner);

        assert!(!outer.is::<Value>());
        assert_eq!(outer.get::<i64>(), Some(5));
        assert!(Value::new(Value::Nil).is_nil());
    }

    #[test]
    fn test_error_from_boxed_error() {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(std::io::Error::other("io"));
        let value = Value::error(boxed);
        assert_eq!(value.as_error().map(|e| e.to_string()).as_deref(), Some("io"));
    }
}
