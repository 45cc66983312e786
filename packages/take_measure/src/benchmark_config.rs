use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZero;

use new_zealand::nz;

use crate::Metric;

/// Configures which metrics a [`BenchmarkMonitor`](crate::BenchmarkMonitor) emits and the
/// run context attached to each result.
///
/// The iteration counts are carried into the results as-is. Looping over a workload is the
/// caller's responsibility.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use take_measure::{BenchmarkConfig, Metric};
///
/// let config = BenchmarkConfig::new()
///     .metrics([Metric::WallClock, Metric::CpuTotal])
///     .metric(Metric::PeakResidentMemory)
///     .warmup_iterations(5)
///     .scaling_factor(nz!(1000))
///     .tag("backend", "in_memory");
///
/// assert!(config.requested_metrics().contains(&Metric::CpuTotal));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BenchmarkConfig {
    metrics: BTreeSet<Metric>,
    warmup_iterations: u64,
    max_iterations: Option<NonZero<u64>>,
    scaling_factor: NonZero<u64>,
    tags: BTreeMap<String, String>,
}

impl BenchmarkConfig {
    /// Creates a configuration that requests only [`Metric::WallClock`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: BTreeSet::from([Metric::WallClock]),
            warmup_iterations: 0,
            max_iterations: None,
            scaling_factor: nz!(1),
            tags: BTreeMap::new(),
        }
    }

    /// Replaces the requested metric set.
    #[must_use]
    pub fn metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics = metrics.into_iter().collect();
        self
    }

    /// Adds one metric to the requested set.
    #[must_use]
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metrics.insert(metric);
        self
    }

    /// Sets the warmup iteration count reported with each result.
    #[must_use]
    pub fn warmup_iterations(mut self, count: u64) -> Self {
        self.warmup_iterations = count;
        self
    }

    /// Sets the maximum iteration count reported with each result.
    #[must_use]
    pub fn max_iterations(mut self, count: NonZero<u64>) -> Self {
        self.max_iterations = Some(count);
        self
    }

    /// Sets the factor by which the caller scales results, e.g. operations per measured call.
    #[must_use]
    pub fn scaling_factor(mut self, factor: NonZero<u64>) -> Self {
        self.scaling_factor = factor;
        self
    }

    /// Attaches a tag to every result. A repeated key overwrites the earlier value.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// The metrics that will be emitted when supported and non-zero.
    #[must_use]
    pub fn requested_metrics(&self) -> &BTreeSet<Metric> {
        &self.metrics
    }

    pub(crate) fn warmup_count(&self) -> u64 {
        self.warmup_iterations
    }

    pub(crate) fn max_count(&self) -> Option<NonZero<u64>> {
        self.max_iterations
    }

    pub(crate) fn scaling(&self) -> NonZero<u64> {
        self.scaling_factor
    }

    pub(crate) fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_requests_wall_clock() {
        let config = BenchmarkConfig::default();

        assert_eq!(
            config.requested_metrics().iter().copied().collect::<Vec<_>>(),
            vec![Metric::WallClock]
        );
        assert_eq!(config.warmup_count(), 0);
        assert_eq!(config.max_count(), None);
        assert_eq!(config.scaling().get(), 1);
        assert!(config.tags().is_empty());
    }

    #[test]
    fn metrics_replaces_set() {
        let config = BenchmarkConfig::new().metrics([Metric::CpuUser, Metric::CpuUser]);

        assert_eq!(config.requested_metrics().len(), 1);
        assert!(!config.requested_metrics().contains(&Metric::WallClock));
    }

    #[test]
    fn metric_extends_set() {
        let config = BenchmarkConfig::new().metric(Metric::Syscalls);

        assert!(config.requested_metrics().contains(&Metric::WallClock));
        assert!(config.requested_metrics().contains(&Metric::Syscalls));
    }

    #[test]
    fn run_context_is_stored() {
        let config = BenchmarkConfig::new()
            .warmup_iterations(3)
            .max_iterations(nz!(100))
            .scaling_factor(nz!(8))
            .tag("a", "1")
            .tag("a", "2");

        assert_eq!(config.warmup_count(), 3);
        assert_eq!(config.max_count(), Some(nz!(100)));
        assert_eq!(config.scaling().get(), 8);
        assert_eq!(config.tags().get("a").map(String::as_str), Some("2"));
    }
}
