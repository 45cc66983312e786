//! Measures a few regions of code and prints the resulting metrics.
//!
//! Diagnostic events from `take_measure` are printed via `tracing-subscriber`.
//!
//! Run with: `cargo run --example take_measure_basic`.

use std::collections::BTreeMap;

use futures::future::AbortHandle;
use take_measure::{BenchmarkConfig, BenchmarkMonitor, Metric, TimestampLedger, WorkloadError};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    TimestampLedger::mark_early_timestamp("example_main_entered");

    let config = BenchmarkConfig::new()
        .metrics(Metric::ALL.iter().copied())
        .tag("example", "take_measure_basic");

    println!("=== Allocating a large vector ===");
    let monitor = BenchmarkMonitor::new("allocate_vec", config.clone());
    let results = monitor.measure(|| (0..2_000_000_u64).collect::<Vec<_>>());
    print!("{results}");
    println!();

    println!("=== Building a map ===");
    let monitor = BenchmarkMonitor::new("build_map", config.clone());
    let results = monitor.measure(|| {
        (0..100_000_u32)
            .map(|i| (i, i.to_string()))
            .collect::<BTreeMap<_, _>>()
    });
    print!("{results}");
    println!();

    println!("=== Fallible workload ===");
    let monitor = BenchmarkMonitor::new("parse_numbers", config.clone());
    let outcome = monitor.try_measure(|| {
        "12 34 not_a_number"
            .split(' ')
            .map(str::parse::<u32>)
            .sum::<Result<u32, _>>()
    });
    match outcome {
        Ok(results) => print!("{results}"),
        Err(error) => println!("workload failed, no metrics recorded: {error}"),
    }
    println!();

    println!("=== Cancelled async workload ===");
    let monitor = BenchmarkMonitor::new("never_finishes", config);
    let (handle, registration) = AbortHandle::new_pair();
    handle.abort();
    match monitor.measure_cancellable(
        futures::future::pending::<Result<(), std::io::Error>>(),
        registration,
    ) {
        Ok(results) => print!("{results}"),
        Err(WorkloadError::Cancelled) => println!("workload was cancelled"),
        Err(error) => println!("workload failed: {error}"),
    }
    println!();

    TimestampLedger::global().mark_timestamp("example_finished");
    println!("{}", TimestampLedger::global().generate_report());
}
