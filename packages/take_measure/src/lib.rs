#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Timing and resource usage instrumentation for applications and benchmark harnesses.
//!
//! This package answers three questions about a running process:
//!
//! * How much time and how many resources did this region of code consume? See
//!   [`BenchmarkMonitor`], which samples a [`Snapshot`] of process counters before and after a
//!   workload and reduces the pair to a [`UsageDelta`].
//! * What does the latency distribution of a repeated operation look like? See
//!   [`DurationAggregator`], which reduces samples to a [`LatencySummary`] with nearest-rank
//!   percentiles.
//! * When did named lifecycle events happen relative to process start? See
//!   [`TimestampLedger`].
//!
//! All timing is grounded in [`uptime_nanos()`], a monotonic nanosecond clock that keeps
//! counting across system suspend where the operating system allows it.
//!
//! # Measuring a region
//!
//! ```
//! use take_measure::{BenchmarkConfig, BenchmarkMonitor, Metric};
//!
//! let monitor = BenchmarkMonitor::new(
//!     "allocation",
//!     BenchmarkConfig::new().metrics([Metric::WallClock, Metric::PeakResidentMemory]),
//! );
//!
//! let results = monitor.measure(|| (0..10_000).collect::<Vec<u64>>());
//!
//! // Metrics the platform cannot measure, or that measured zero, are simply absent.
//! if let Some(wall_clock) = results.get(Metric::WallClock) {
//!     println!("took {} ns", wall_clock.value());
//! }
//! ```
//!
//! # Aggregating latencies
//!
//! ```
//! use take_measure::DurationAggregator;
//!
//! let aggregator = DurationAggregator::new();
//!
//! for ms in [10.0, 20.0, 30.0, 40.0, 50.0] {
//!     aggregator.add(ms);
//! }
//! aggregator.fail();
//!
//! let summary = aggregator.summary();
//! assert_eq!(summary.count(), 5);
//! assert_eq!(summary.failures(), 1);
//! assert_eq!(summary.p50(), Some(30.0));
//! println!("{}", summary.render());
//! ```
//!
//! # Recording lifecycle events
//!
//! ```
//! use take_measure::TimestampLedger;
//!
//! TimestampLedger::global().mark_timestamp("config_loaded");
//! TimestampLedger::global().mark_timestamp("first_request_served");
//!
//! println!("{}", TimestampLedger::global().generate_report());
//! ```
//!
//! # Diagnostics
//!
//! The package emits diagnostic events via `tracing` but never installs a subscriber. Whether
//! and where these events are written is up to the host application.

mod benchmark_config;
mod benchmark_monitor;
mod clock;
mod duration_aggregator;
mod error;
mod latency_summary;
mod ledger;
mod metric;
mod metric_result;
mod pal;
mod percentile;
mod perf_runner;
mod render;
mod snapshot;
mod usage_delta;

pub use benchmark_config::BenchmarkConfig;
pub use benchmark_monitor::BenchmarkMonitor;
pub use clock::uptime_nanos;
pub use duration_aggregator::DurationAggregator;
pub use error::WorkloadError;
pub use latency_summary::LatencySummary;
pub use ledger::{TimestampLedger, set_process_start};
pub use metric::{Metric, MetricUnits, Polarity};
pub use metric_result::{MetricResult, MetricResults, MetricStatistics};
pub use perf_runner::{RunTiming, run_for, run_iterations};
pub use render::{NamedSummary, summary_table, summary_table_markdown};
pub use snapshot::Snapshot;
pub use usage_delta::UsageDelta;

pub(crate) const NANOS_PER_SECOND: u64 = 1_000_000_000;
pub(crate) const NANOS_PER_MILLISECOND: u64 = 1_000_000;
