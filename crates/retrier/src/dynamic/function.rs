//! Tagged function wrappers with a runtime-inspectable signature.

use super::value::Value;
use crate::error::{InvokeError, Result};
use std::any::{Any, TypeId, type_name};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// The declared type of one parameter.
#[derive(Clone, Copy)]
pub struct ParamType {
    name: &'static str,
    check: Option<fn(&Value) -> bool>,
}

impl ParamType {
    /// A parameter that only accepts values holding a `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            name: type_name::<T>(),
            check: Some(|value: &Value| value.is::<T>()),
        }
    }

    /// A parameter that accepts any value, including nil and errors.
    pub fn any() -> Self {
        Self {
            name: "any",
            check: None,
        }
    }

    /// The declared type's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `value` may be passed for this parameter.
    pub fn accepts(&self, value: &Value) -> bool {
        self.check.is_none_or(|check| check(value))
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The shape of a callable, used for validation before it is ever invoked.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<ParamType>,
    variadic: Option<ParamType>,
    outputs: usize,
    error_output: bool,
}

impl Signature {
    /// A callable taking exactly `params` and returning `outputs` values.
    ///
    /// When `error_output` is set the last of the `outputs` is the
    /// error-shaped slot.
    pub fn new(params: Vec<ParamType>, outputs: usize, error_output: bool) -> Self {
        Self {
            params,
            variadic: None,
            outputs,
            error_output: error_output && outputs > 0,
        }
    }

    /// Accept any number of trailing arguments of type `rest` after the fixed
    /// parameters.
    pub fn variadic(mut self, rest: ParamType) -> Self {
        self.variadic = Some(rest);
        self
    }

    /// The fixed parameter types.
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// The element type of the variadic tail, if any.
    pub fn rest(&self) -> Option<&ParamType> {
        self.variadic.as_ref()
    }

    /// Whether the callable accepts extra trailing arguments.
    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    /// Number of declared return values, including the error slot.
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Whether the last return value is error-shaped.
    pub fn has_error_output(&self) -> bool {
        self.error_output
    }

    /// Check an argument list against this signature.
    pub fn check_args(&self, args: &[Value]) -> Result<()> {
        let expected = self.params.len();
        let count_ok = if self.is_variadic() {
            args.len() >= expected
        } else {
            args.len() == expected
        };
        if !count_ok {
            return Err(InvokeError::ArgumentCountMismatch {
                expected,
                found: args.len(),
                variadic: self.is_variadic(),
            });
        }

        for (index, arg) in args.iter().enumerate() {
            let param = self.params.get(index).or(self.variadic.as_ref());
            if let Some(param) = param {
                if !param.accepts(arg) {
                    return Err(InvokeError::ArgumentTypeMismatch {
                        index,
                        expected: param.name(),
                        found: arg.type_name(),
                    });
                }
            }
        }

        Ok(())
    }
}

type Body = dyn Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync;

/// A callable with a runtime-inspectable [`Signature`].
///
/// This is the only kind of value the dynamic invoker will call. Build one
/// from an ordinary closure with [`Function::new`] (up to six parameters),
/// from a closure over a `Vec<T>` with [`Function::variadic`], or from a raw
/// signature and body with [`Function::from_parts`].
///
/// # Examples
///
/// ```rust
/// use retrier::{Function, values};
///
/// let add = Function::new(|a: i32, b: i32| -> Result<i32, std::io::Error> { Ok(a + b) });
/// assert_eq!(add.signature().params().len(), 2);
/// assert!(add.signature().has_error_output());
///
/// let out = add.call(&values![2, 3]).unwrap();
/// assert_eq!(out[0].get::<i32>(), Some(5));
/// assert!(out[1].is_nil());
/// ```
#[derive(Clone)]
pub struct Function {
    signature: Signature,
    body: Arc<Body>,
}

impl Function {
    /// Wrap a typed closure.
    pub fn new<F, Args>(f: F) -> Self
    where
        F: IntoFunction<Args>,
    {
        f.into_function()
    }

    /// Wrap a closure that receives every argument as one `Vec<T>`.
    ///
    /// The resulting function accepts any number of arguments, each of which
    /// must hold a `T`.
    pub fn variadic<F, T, R>(f: F) -> Self
    where
        F: Fn(Vec<T>) -> R + Send + Sync + 'static,
        T: Any + Clone + Send + Sync,
        R: IntoReturns,
    {
        let signature =
            Signature::new(Vec::new(), R::arity(), R::ERROR_SLOT).variadic(ParamType::of::<T>());
        Self::from_parts(signature, move |args: &[Value]| {
            let mut rest = Vec::with_capacity(args.len());
            for (index, arg) in args.iter().enumerate() {
                rest.push(take::<T>(index, arg)?);
            }
            Ok(f(rest).into_returns())
        })
    }

    /// Build a function from a signature and an untyped body.
    ///
    /// The body receives arguments that already passed
    /// [`Signature::check_args`] and must return exactly
    /// [`Signature::outputs`] values.
    pub fn from_parts<B>(signature: Signature, body: B) -> Self
    where
        B: Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        Self {
            signature,
            body: Arc::new(body),
        }
    }

    /// The declared shape of this function.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Validate `args` and invoke the function once.
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>> {
        self.signature.check_args(args)?;
        (self.body)(args)
    }

    pub(crate) fn call_unchecked(&self, args: &[Value]) -> Result<Vec<Value>> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::new(function)
    }
}

fn take<T: Any + Clone>(index: usize, arg: &Value) -> Result<T> {
    arg.get::<T>().ok_or_else(|| InvokeError::ArgumentTypeMismatch {
        index,
        expected: type_name::<T>(),
        found: arg.type_name(),
    })
}

/// Conversion of a closure into a [`Function`].
///
/// Implemented for `Fn(A1, .., An) -> R` with up to six parameters, where
/// every parameter is `Any + Clone + Send + Sync` and `R` is
/// [`IntoReturns`].
pub trait IntoFunction<Args> {
    /// Perform the conversion.
    fn into_function(self) -> Function;
}

macro_rules! impl_into_function {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        impl<F, R, $($ty,)*> IntoFunction<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: IntoReturns,
            $($ty: Any + Clone + Send + Sync,)*
        {
            fn into_function(self) -> Function {
                let signature = Signature::new(
                    vec![$(ParamType::of::<$ty>()),*],
                    R::arity(),
                    R::ERROR_SLOT,
                );
                Function::from_parts(signature, move |args: &[Value]| {
                    let mut index = 0;
                    $(
                        let $ty = match args.get(index) {
                            Some(arg) => take::<$ty>(index, arg)?,
                            None => {
                                return Err(InvokeError::ArgumentCountMismatch {
                                    expected: index + 1,
                                    found: args.len(),
                                    variadic: false,
                                })
                            }
                        };
                        index += 1;
                    )*
                    Ok(self($($ty),*).into_returns())
                })
            }
        }
    };
}

impl_into_function!();
impl_into_function!(A1);
impl_into_function!(A1, A2);
impl_into_function!(A1, A2, A3);
impl_into_function!(A1, A2, A3, A4);
impl_into_function!(A1, A2, A3, A4, A5);
impl_into_function!(A1, A2, A3, A4, A5, A6);

/// Values that a typed closure may return.
///
/// - `()` returns nothing (rejected by the invoker).
/// - `Result<T, E>` returns the success value followed by an error-shaped
///   slot. `T` may be any `Send + Sync + 'static` type and `Result<(), E>`
///   returns the error slot alone. `E` is anything that converts into a
///   boxed error, so `io::Error`, `Box<dyn Error + Send + Sync>`, `String`
///   and `&str` all work.
/// - plain scalars, strings, `Vec<T>` and tuples return one value with no
///   error slot.
///
/// A tuple is always a single value. Callables with several separate
/// results are built with [`Function::from_parts`].
pub trait IntoReturns {
    /// Whether the last returned value is error-shaped.
    const ERROR_SLOT: bool;

    /// Number of returned values, including the error slot.
    fn arity() -> usize;

    /// Flatten into a list of exactly [`IntoReturns::arity`] values.
    fn into_returns(self) -> Vec<Value>;
}

/// `()` carries no value; everything else is one.
fn payload_arity<T: Any>() -> usize {
    if TypeId::of::<T>() == TypeId::of::<()>() {
        0
    } else {
        1
    }
}

impl IntoReturns for () {
    const ERROR_SLOT: bool = false;

    fn arity() -> usize {
        0
    }

    fn into_returns(self) -> Vec<Value> {
        Vec::new()
    }
}

impl<T, E> IntoReturns for std::result::Result<T, E>
where
    T: Any + Send + Sync,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    const ERROR_SLOT: bool = true;

    fn arity() -> usize {
        payload_arity::<T>() + 1
    }

    fn into_returns(self) -> Vec<Value> {
        let payload = payload_arity::<T>();
        let mut out = Vec::with_capacity(payload + 1);
        match self {
            Ok(value) => {
                if payload > 0 {
                    out.push(Value::new(value));
                }
                out.push(Value::Nil);
            }
            Err(error) => {
                out.resize(payload, Value::Nil);
                out.push(Value::error(error));
            }
        }
        out
    }
}

macro_rules! impl_plain {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoReturns for $ty {
                const ERROR_SLOT: bool = false;

                fn arity() -> usize {
                    1
                }

                fn into_returns(self) -> Vec<Value> {
                    vec![Value::new(self)]
                }
            }
        )*
    };
}

impl_plain!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T> IntoReturns for Vec<T>
where
    T: Any + Send + Sync,
{
    const ERROR_SLOT: bool = false;

    fn arity() -> usize {
        1
    }

    fn into_returns(self) -> Vec<Value> {
        vec![Value::new(self)]
    }
}

macro_rules! impl_plain_tuple {
    ($($ty:ident),+) => {
        impl<$($ty,)+> IntoReturns for ($($ty,)+)
        where
            $($ty: Any + Send + Sync,)+
        {
            const ERROR_SLOT: bool = false;

            fn arity() -> usize {
                1
            }

            fn into_returns(self) -> Vec<Value> {
                vec![Value::new(self)]
            }
        }
    };
}

impl_plain_tuple!(T1);
impl_plain_tuple!(T1, T2);
impl_plain_tuple!(T1, T2, T3);
impl_plain_tuple!(T1, T2, T3, T4);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;
    use std::io;

    fn div(a: f64, b: f64) -> std::result::Result<f64, io::Error> {
        if b == 0.0 {
            Err(io::Error::other("can not divide by zero"))
        } else {
            Ok(a / b)
        }
    }

    #[test]
    fn test_typed_signature() {
        let function = Function::new(div);
        let signature = function.signature();

        assert_eq!(signature.params().len(), 2);
        assert_eq!(signature.params()[0].name(), "f64");
        assert!(!signature.is_variadic());
        assert_eq!(signature.outputs(), 2);
        assert!(signature.has_error_output());
    }

    #[test]
    fn test_typed_call_success_and_failure() {
        let function = Function::new(div);

        let out = function.call(&values![9.0_f64, 3.0_f64]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get::<f64>(), Some(3.0));
        assert!(out[1].is_nil());

        let out = function.call(&values![9.0_f64, 0.0_f64]).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].is_nil());
        assert!(out[1].as_error().is_some());
    }

    #[test]
    fn test_void_and_plain_returns() {
        let void = Function::new(|| {});
        assert_eq!(void.signature().outputs(), 0);
        assert!(!void.signature().has_error_output());

        let plain = Function::new(|| false);
        assert_eq!(plain.signature().outputs(), 1);
        assert!(!plain.signature().has_error_output());
        assert_eq!(plain.call(&[]).unwrap()[0].get::<bool>(), Some(false));

        let pair = Function::new(|x: u8| (x, x.to_string()));
        assert_eq!(pair.signature().outputs(), 1);
        let out = pair.call(&values![7_u8]).unwrap();
        assert_eq!(out[0].get::<(u8, String)>(), Some((7, String::from("7"))));
    }

    #[test]
    fn test_tuple_payload_is_one_value() {
        let split = Function::new(|s: String| -> std::result::Result<(String, usize), io::Error> {
            let len = s.len();
            Ok((s, len))
        });
        assert_eq!(split.signature().outputs(), 2);

        let out = split.call(&values![String::from("abc")]).unwrap();
        assert_eq!(out[0].get::<(String, usize)>(), Some((String::from("abc"), 3)));
        assert!(out[1].is_nil());
    }

    #[test]
    fn test_user_struct_payload() {
        #[derive(Debug, Clone, PartialEq)]
        struct Reply {
            code: u16,
        }

        let fetch = Function::new(|| -> std::result::Result<Reply, io::Error> {
            Ok(Reply { code: 200 })
        });
        assert_eq!(fetch.signature().outputs(), 2);
        assert!(fetch.signature().has_error_output());

        let out = fetch.call(&[]).unwrap();
        assert_eq!(out[0].get::<Reply>(), Some(Reply { code: 200 }));
        assert!(out[1].is_nil());
    }

    #[test]
    fn test_boxed_error_return() {
        let parse = Function::new(
            |fail: bool| -> std::result::Result<i32, Box<dyn StdError + Send + Sync>> {
                if fail { Err("boom".into()) } else { Ok(1) }
            },
        );
        assert!(parse.signature().has_error_output());

        let out = parse.call(&values![false]).unwrap();
        assert_eq!(out[0].get::<i32>(), Some(1));
        assert!(out[1].is_nil());

        let out = parse.call(&values![true]).unwrap();
        assert!(out[0].is_nil());
        assert_eq!(
            out[1].as_error().map(|e| e.to_string()).as_deref(),
            Some("boom")
        );
    }

    #[test]
    fn test_unit_payload_returns_error_slot_only() {
        let ping = Function::new(|| -> std::result::Result<(), String> { Err("refused".into()) });
        assert_eq!(ping.signature().outputs(), 1);

        let out = ping.call(&[]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].as_error().map(|e| e.to_string()).as_deref(),
            Some("refused")
        );
    }

    #[test]
    fn test_check_args_count() {
        let function = Function::new(div);
        let err = function.call(&values![12.0_f64, 3.0_f64, 4.0_f64]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::ArgumentCountMismatch {
                expected: 2,
                found: 3,
                variadic: false
            }
        ));
    }

    #[test]
    fn test_check_args_type() {
        let function = Function::new(div);
        let err = function.call(&values![12.0_f64, 3_i32]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::ArgumentTypeMismatch {
                index: 1,
                expected: "f64",
                found: "i32"
            }
        ));
    }

    #[test]
    fn test_variadic() {
        let sum = Function::variadic(|nums: Vec<i64>| -> std::result::Result<i64, io::Error> {
            Ok(nums.iter().sum())
        });
        assert!(sum.signature().is_variadic());
        assert!(sum.signature().params().is_empty());

        assert_eq!(sum.call(&[]).unwrap()[0].get::<i64>(), Some(0));
        let out = sum.call(&values![1_i64, 2_i64, 3_i64, 4_i64, 5_i64]).unwrap();
        assert_eq!(out[0].get::<i64>(), Some(15));

        let err = sum.call(&values![1_i64, 2_i32]).unwrap_err();
        assert!(matches!(err, InvokeError::ArgumentTypeMismatch { index: 1, .. }));
    }

    #[test]
    fn test_variadic_fixed_prefix() {
        let signature = Signature::new(vec![ParamType::of::<String>()], 1, true)
            .variadic(ParamType::any());
        let join = Function::from_parts(signature, |args: &[Value]| {
            Ok(vec![Value::new(args.len()), Value::Nil])
        });

        let err = join.call(&[]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::ArgumentCountMismatch {
                expected: 1,
                found: 0,
                variadic: true
            }
        ));

        let args = values![String::from("sep"), Value::Nil, 1_u8];
        assert!(join.call(&args).is_ok());
    }

    #[test]
    fn test_any_param_accepts_everything() {
        let any = ParamType::any();
        assert!(any.accepts(&Value::Nil));
        assert!(any.accepts(&Value::error(io::Error::other("x"))));
        assert!(any.accepts(&Value::new(1_u8)));

        let typed = ParamType::of::<u8>();
        assert!(typed.accepts(&Value::new(1_u8)));
        assert!(!typed.accepts(&Value::Nil));
    }

    #[test]
    fn test_error_slot_requires_outputs() {
        let signature = Signature::new(Vec::new(), 0, true);
        assert!(!signature.has_error_output());
    }

    #[test]
    fn test_function_into_value() {
        let value: Value = Function::new(|| 1_u32).into();
        assert!(value.is::<Function>());
    }
}
