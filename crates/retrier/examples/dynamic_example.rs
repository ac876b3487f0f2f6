//! Example: retrying callables of arbitrary signature
//!
//! Run with:
//! ```bash
//! RUST_LOG=retrier=debug cargo run -p retrier --example dynamic_example
//! ```

use retrier::dynamic::{ParamType, Signature};
use retrier::prelude::*;
use std::error::Error;
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Fixed arity with an error slot
    let sum = Value::from(Function::new(|a: i32, b: i32, c: i32, d: i32| {
        Ok::<_, io::Error>(a + b + c + d)
    }));
    let out = retry_dynamic(2, Duration::from_millis(1), &sum, &values![1, 2, 3, 4])?;
    println!("sum(1, 2, 3, 4) = {:?}", out[0].get::<i32>());

    // Always failing: retried until the budget is spent
    let div = Value::from(Function::new(|a: f64, b: f64| {
        if b == 0.0 {
            Err(io::Error::other("can not divide by zero"))
        } else {
            Ok(a / b)
        }
    }));
    match retry_dynamic(2, Duration::from_millis(1), &div, &values![9.0, 0.0]) {
        Ok(out) => println!("div(9, 0) = {:?}", out),
        Err(err) => println!("div(9, 0) failed: {err}"),
    }

    // Variadic
    let concat = Value::from(Function::variadic(|parts: Vec<String>| {
        Ok::<_, io::Error>(parts.concat())
    }));
    let out = retry_dynamic(
        1,
        Duration::ZERO,
        &concat,
        &values![String::from("re"), String::from("tr"), String::from("ier")],
    )?;
    println!("concat(..) = {:?}", out[0].get::<String>());

    // Raw signature: one fixed string prefix followed by anything
    let signature =
        Signature::new(vec![ParamType::of::<String>()], 2, true).variadic(ParamType::any());
    let count = Value::from(Function::from_parts(signature, |args: &[Value]| {
        Ok(vec![Value::new(args.len() - 1), Value::Nil])
    }));
    let out = retry_dynamic(1, Duration::ZERO, &count, &values![String::from("items"), Value::Nil])?;
    println!("count(items, nil) = {:?}", out[0].get::<usize>());

    // Structural errors are reported without invoking anything
    for (label, result) in [
        ("not a function", retry_dynamic(2, Duration::ZERO, &Value::new(0_i32), &[])),
        ("wrong arity", retry_dynamic(2, Duration::ZERO, &div, &values![12.0, 3.0, 4.0])),
        ("zero attempts", retry_dynamic(0, Duration::ZERO, &sum, &values![1, 2, 3, 4])),
    ] {
        if let Err(err) = result {
            println!("{label}: {err}");
        }
    }

    // Any payload type, any boxed error
    #[derive(Debug, Clone)]
    struct Reply {
        code: u16,
    }
    let fetch = Value::from(Function::new(
        |code: u16| -> Result<Reply, Box<dyn Error + Send + Sync>> {
            if code >= 500 {
                Err(format!("server error {code}").into())
            } else {
                Ok(Reply { code })
            }
        },
    ));
    let out = retry_dynamic(2, Duration::ZERO, &fetch, &values![200_u16])?;
    println!("fetch(200) = {:?}", out[0].get::<Reply>());

    // No error slot: invoked once, result returned as-is
    let flag = Value::from(Function::new(|| false));
    let out = retry_dynamic(5, Duration::from_millis(1), &flag, &[])?;
    println!("flag() = {:?}", out[0].get::<bool>());

    Ok(())
}
