//! Decorated Functions
//!
//! Run with: cargo run --example decorated_functions
//!
//! This example demonstrates:
//! - Cache outside counter: repeated calls never reach the counter
//! - Counter outside cache: every call is counted
//! - Recursion through the full stack with nested trace output
//!
//! Set `RUST_LOG=compositional_transform=debug` to see cache hits and misses.

use compositional_transform::{
    countcalls, memo, n_ary, try_fix, Function, Invocable, Result, StackConfig, Transformer, Value,
};

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("=== Cache Outside Counter ===\n");

    let foo = memo(countcalls(n_ary(Function::binary("foo", |a, b| {
        Ok(Value::Int(a.as_int()? + b.as_int()?))
    }))?));
    println!("{}", foo.call(&ints(&[4, 3]))?);
    println!("{}", foo.call(&ints(&[4, 3, 2]))?);
    println!("{}", foo.call(&ints(&[4, 3]))?);
    println!("foo was called {} times", foo.inner().calls());

    println!("\n=== Counter Outside Cache ===\n");

    let bar = countcalls(memo(n_ary(Function::binary("bar", |a, b| {
        Ok(Value::Int(a.as_int()? * b.as_int()?))
    }))?));
    println!("{}", bar.call(&ints(&[4, 3]))?);
    println!("{}", bar.call(&ints(&[4, 3, 2]))?);
    println!("{}", bar.call(&ints(&[4, 3, 2, 1]))?);
    println!("bar was called {} times", bar.calls());

    println!("\n=== Recursive Fibonacci ===\n");

    let config = StackConfig::default();
    let stack = config
        .counter()
        .over(config.tracer())
        .over(config.memoize());

    let fib = try_fix(|this| {
        let base = Function::unary("fib", move |n| {
            let n = n.as_int()?;
            if n <= 1 {
                return Ok(Value::Int(1));
            }
            let a = this.call(&[Value::Int(n - 1)])?.as_int()?;
            let b = this.call(&[Value::Int(n - 2)])?.as_int()?;
            Ok(Value::Int(a + b))
        })
        .with_description("Some doc");
        stack.apply(base)
    })?;

    println!("{}", fib.description().unwrap_or_default());
    fib.call(&[Value::Int(3)])?;

    if let Some(counter) = fib.on() {
        println!("{} calls made", counter.calls());
    }

    Ok(())
}
