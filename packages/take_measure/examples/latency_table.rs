//! Drives two variants of a workload with `run_iterations()`, aggregates per-call latencies and
//! prints them as plain-text and markdown tables.
//!
//! Run with: `cargo run --example latency_table`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::hint::black_box;
use std::time::Instant;

use take_measure::{
    DurationAggregator, NamedSummary, run_iterations, summary_table, summary_table_markdown,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let with_capacity = DurationAggregator::new();
    let without_capacity = DurationAggregator::new();

    let timing = run_iterations(200, None, || {
        let start = Instant::now();
        let mut map = HashMap::with_capacity(10_000);
        for i in 0..10_000_u32 {
            map.insert(i, i);
        }
        black_box(map);
        with_capacity.add_duration(start.elapsed());

        let start = Instant::now();
        let mut map = HashMap::new();
        for i in 0..10_000_u32 {
            map.insert(i, i);
        }
        black_box(map);
        without_capacity.add_duration(start.elapsed());

        Ok::<_, Infallible>(())
    })
    .unwrap_or_else(|never| match never {});

    // Pretend a few calls timed out.
    for _ in 0..3 {
        without_capacity.fail();
    }

    println!(
        "ran {} iterations in {:.2} ms ({:.3} ms each)",
        timing.iterations(),
        timing.total_ms(),
        timing.average_ms()
    );
    println!();

    println!("{}", with_capacity.summary().render());
    println!(
        "{}",
        without_capacity
            .summary()
            .render_one_line("std_hashmap", "no_capacity")
    );
    println!();

    let rows = [
        NamedSummary::new("with_capacity", with_capacity.summary()),
        NamedSummary::new("without_capacity", without_capacity.summary()),
        NamedSummary::new("never_ran", DurationAggregator::new().summary()),
    ];

    println!("{}", summary_table(&rows));
    println!("{}", summary_table_markdown(&rows));
}
