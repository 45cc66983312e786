use std::time::Duration;

use parking_lot::Mutex;

use crate::LatencySummary;
use crate::percentile::nearest_rank;

/// Collects latency samples from any number of threads and summarizes them on demand.
///
/// Samples are durations in milliseconds. Failed attempts are counted separately and do not
/// contribute a duration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use take_measure::DurationAggregator;
///
/// let aggregator = DurationAggregator::new();
///
/// std::thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| aggregator.add_duration(Duration::from_micros(1500)));
///     }
/// });
///
/// let summary = aggregator.summary();
/// assert_eq!(summary.count(), 4);
/// assert_eq!(summary.mean(), Some(1.5));
/// ```
#[derive(Debug, Default)]
pub struct DurationAggregator {
    samples: Mutex<Samples>,
}

#[derive(Debug, Default)]
struct Samples {
    values_ms: Vec<f64>,
    failures: u64,
}

impl DurationAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful sample, in milliseconds.
    pub fn add(&self, ms: f64) {
        self.samples.lock().values_ms.push(ms);
    }

    /// Records one successful sample.
    pub fn add_duration(&self, duration: Duration) {
        self.add(duration.as_secs_f64() * 1000.0);
    }

    /// Records one failed attempt.
    pub fn fail(&self) {
        let mut samples = self.samples.lock();
        samples.failures = samples.failures.saturating_add(1);
    }

    /// The successful samples in the order they were recorded.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.samples.lock().values_ms.clone()
    }

    /// Summarizes the samples recorded so far.
    ///
    /// Percentiles use the nearest-rank method without interpolation, so every percentile is
    /// one of the recorded samples.
    #[must_use]
    pub fn summary(&self) -> LatencySummary {
        let (mut sorted, failures) = {
            let samples = self.samples.lock();
            (samples.values_ms.clone(), samples.failures)
        };

        // Stable and total, so NaN samples sort to a deterministic position.
        sorted.sort_by(f64::total_cmp);

        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return LatencySummary::empty(failures);
        };

        #[expect(
            clippy::cast_precision_loss,
            reason = "sample counts are far below 2^52"
        )]
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

        let percentile = |p| nearest_rank(&sorted, p).unwrap_or(max);

        LatencySummary::new(
            sorted.len(),
            failures,
            min,
            max,
            mean,
            percentile(0.50),
            percentile(0.90),
            percentile(0.99),
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(DurationAggregator: Send, Sync);

    #[test]
    fn empty_summary() {
        let aggregator = DurationAggregator::new();
        aggregator.fail();
        aggregator.fail();

        let summary = aggregator.summary();

        assert_eq!(summary.count(), 0);
        assert_eq!(summary.failures(), 2);
        assert_eq!(summary.min(), None);
        assert_eq!(summary.p99(), None);
    }

    #[test]
    fn percentiles_of_five() {
        let aggregator = DurationAggregator::new();
        for ms in [50.0, 10.0, 40.0, 20.0, 30.0] {
            aggregator.add(ms);
        }

        let summary = aggregator.summary();

        assert_eq!(summary.count(), 5);
        assert_eq!(summary.min(), Some(10.0));
        assert_eq!(summary.max(), Some(50.0));
        assert_eq!(summary.mean(), Some(30.0));
        assert_eq!(summary.p50(), Some(30.0));
        assert_eq!(summary.p90(), Some(50.0));
        assert_eq!(summary.p99(), Some(50.0));
    }

    #[test]
    fn values_keep_insertion_order() {
        let aggregator = DurationAggregator::new();
        aggregator.add(3.0);
        aggregator.add(1.0);
        aggregator.add(2.0);

        assert_eq!(aggregator.values(), vec![3.0, 1.0, 2.0]);

        // Summarizing does not reorder the stored samples.
        _ = aggregator.summary();
        assert_eq!(aggregator.values(), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn add_duration_converts_to_ms() {
        let aggregator = DurationAggregator::new();
        aggregator.add_duration(Duration::from_millis(250));

        assert_eq!(aggregator.values(), vec![250.0]);
    }

    #[test]
    fn statistics_are_ordered() {
        let aggregator = DurationAggregator::new();
        for i in 0..1000_u32 {
            aggregator.add(f64::from((i * 7919) % 1000));
        }

        let summary = aggregator.summary();
        let min = summary.min().unwrap();
        let p50 = summary.p50().unwrap();
        let p90 = summary.p90().unwrap();
        let p99 = summary.p99().unwrap();
        let max = summary.max().unwrap();

        assert!(min <= p50);
        assert!(p50 <= p90);
        assert!(p90 <= p99);
        assert!(p99 <= max);
    }

    #[test]
    fn nan_samples_do_not_break_summary() {
        let aggregator = DurationAggregator::new();
        aggregator.add(1.0);
        aggregator.add(f64::NAN);
        aggregator.add(2.0);

        let summary = aggregator.summary();

        assert_eq!(summary.count(), 3);
        assert_eq!(summary.min(), Some(1.0));
        assert!(summary.max().unwrap().is_nan());
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let aggregator = DurationAggregator::new();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..500 {
                        aggregator.add(1.0);
                    }
                    aggregator.fail();
                });
            }
        });

        let summary = aggregator.summary();
        assert_eq!(summary.count(), 2000);
        assert_eq!(summary.failures(), 4);
    }
}
