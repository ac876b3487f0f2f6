//! Dynamic invocation of callables with arbitrary signatures.
//!
//! A callable is wrapped in a [`Function`], which records its [`Signature`]
//! so that argument count, argument types and return shape can be validated
//! before the first call. Arguments and results travel as [`Value`]s; the
//! last result is the success/failure signal.

mod function;
mod invoke;
mod value;

pub use function::{Function, IntoFunction, IntoReturns, ParamType, Signature};
pub use invoke::retry_dynamic;
pub use value::Value;
