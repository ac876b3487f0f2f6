//! Example: retrying fallible operations with backoff
//!
//! This example demonstrates:
//! 1. Simple retry with the default jittered exponential backoff
//! 2. A custom backoff strategy (linear growth)
//! 3. Jitter impact (run multiple times to see variance)
//!
//! Run with:
//! ```bash
//! RUST_LOG=retrier=debug cargo run -p retrier --example retry_example
//! ```

use retrier::prelude::*;
use std::cell::Cell;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// A simulated service that fails the first few times
struct UnreliableService {
    attempts: Cell<u32>,
    fail_count: u32,
}

impl UnreliableService {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Cell::new(0),
            fail_count,
        }
    }

    fn call(&self) -> Result<String, std::io::Error> {
        let attempt = self.attempts.get();
        self.attempts.set(attempt + 1);

        if attempt < self.fail_count {
            println!("  Attempt {}: FAILED (simulating transient error)", attempt + 1);
            Err(std::io::Error::other(format!(
                "Transient error on attempt {}",
                attempt + 1
            )))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("service response".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.get()
    }
}

/// Example 1: Simple retry with exponential backoff
fn example_simple_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Simple Retry with Exponential Backoff ===\n");

    let service = UnreliableService::new(2);

    println!("Calling unreliable service (will fail 2 times before succeeding)...");
    let start = Instant::now();

    let result = retry_exponential(4, Duration::from_millis(100), || service.call())?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", service.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected pauses: 100-150ms + 200-450ms");

    Ok(())
}

/// Example 2: Custom backoff strategy
fn example_custom_strategy() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Custom Strategy (Linear Growth) ===\n");

    let service = UnreliableService::new(3);
    let linear = |delay: Duration| delay + Duration::from_millis(25);

    let start = Instant::now();
    let result = retry_with_custom_backoff(5, Duration::from_millis(25), linear, || service.call())?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", service.total_attempts());
    println!("Total time: {:?} (expected ~25ms + 50ms + 75ms)", start.elapsed());

    // Exhausting the budget hands back the last error
    let service = UnreliableService::new(10);
    let err = retry_with_custom_backoff(2, Duration::from_millis(10), linear, || service.call())
        .unwrap_err();
    println!("\nGave up after {} attempts: {}", service.total_attempts(), err);

    Ok(())
}

/// Example 3: Jitter demonstration
fn example_jitter_impact() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Jitter Impact (Run 5 Times) ===\n");

    let no_jitter = ExponentialBackoff::builder().jitter(0.0).build();
    let with_jitter = ExponentialBackoff::default();

    for (label, strategy) in [("Without jitter", no_jitter), ("With 50% jitter", with_jitter)] {
        println!("{}:", label);
        for run in 0..5 {
            let service = UnreliableService::new(1);
            let mut retrier = Retrier::new(RetryConfig::new(2, Duration::from_millis(50)))
                .with_strategy(strategy.clone());

            let start = Instant::now();
            retrier.run(|| service.call())?;
            println!("  Run {}: {:?}", run + 1, start.elapsed());
        }
    }

    println!("\nAnalysis:");
    println!("  No jitter: all runs pause for ~50ms");
    println!("  With jitter: pauses vary in the 50-75ms range");

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("==============================================");
    println!("   Retrier: Retry Strategy Examples");
    println!("==============================================");

    example_simple_retry()?;
    example_custom_strategy()?;
    example_jitter_impact()?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
