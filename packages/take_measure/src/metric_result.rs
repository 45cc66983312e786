use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{self, Display};
use std::num::NonZero;

use crate::percentile::nearest_rank;
use crate::{Metric, MetricUnits};

/// A growable set of samples of one metric.
///
/// A freshly measured region holds exactly one sample. Callers that measure the same region
/// repeatedly can merge the results to obtain distribution statistics.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetricStatistics {
    samples: Vec<u64>,
}

impl MetricStatistics {
    pub(crate) fn single(value: u64) -> Self {
        Self {
            samples: vec![value],
        }
    }

    /// Adds one sample.
    pub fn add(&mut self, value: u64) {
        self.samples.push(value);
    }

    /// Absorbs every sample of `other`.
    pub fn merge_from(&mut self, other: &Self) {
        self.samples.extend_from_slice(&other.samples);
    }

    /// The samples in the order they were added.
    #[must_use]
    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// The smallest sample, if there are any.
    #[must_use]
    pub fn min(&self) -> Option<u64> {
        self.samples.iter().copied().min()
    }

    /// The largest sample, if there are any.
    #[must_use]
    pub fn max(&self) -> Option<u64> {
        self.samples.iter().copied().max()
    }

    /// The arithmetic mean of the samples, if there are any.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "statistics are approximate by nature"
    )]
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }

        let sum: u128 = self.samples.iter().map(|&v| u128::from(v)).sum();
        Some(sum as f64 / self.samples.len() as f64)
    }

    /// The nearest-rank percentile (`0.0..=1.0`) of the samples, if there are any.
    #[must_use]
    pub fn percentile(&self, percentile: f64) -> Option<u64> {
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();

        nearest_rank(&sorted, percentile)
    }
}

/// The value of one metric for one measured region, with the context of the run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetricResult {
    metric: Metric,
    value: u64,
    warmup_iterations: u64,
    max_iterations: Option<NonZero<u64>>,
    scaling_factor: NonZero<u64>,
    tags: BTreeMap<String, String>,
    statistics: MetricStatistics,
}

impl MetricResult {
    pub(crate) fn new(
        metric: Metric,
        value: u64,
        warmup_iterations: u64,
        max_iterations: Option<NonZero<u64>>,
        scaling_factor: NonZero<u64>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            metric,
            value,
            warmup_iterations,
            max_iterations,
            scaling_factor,
            tags,
            statistics: MetricStatistics::single(value),
        }
    }

    /// The metric this result is for.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// The measured value, in [`units()`](Self::units).
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The unit of [`value()`](Self::value).
    #[must_use]
    pub fn units(&self) -> MetricUnits {
        self.metric.units()
    }

    /// Warmup iteration count from the run configuration.
    #[must_use]
    pub fn warmup_iterations(&self) -> u64 {
        self.warmup_iterations
    }

    /// Maximum iteration count from the run configuration, if one was set.
    #[must_use]
    pub fn max_iterations(&self) -> Option<NonZero<u64>> {
        self.max_iterations
    }

    /// Scaling factor from the run configuration.
    #[must_use]
    pub fn scaling_factor(&self) -> NonZero<u64> {
        self.scaling_factor
    }

    /// Tags from the run configuration.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// The samples of this metric.
    #[must_use]
    pub fn statistics(&self) -> &MetricStatistics {
        &self.statistics
    }

    /// The samples of this metric, for merging in results of repeated runs.
    #[must_use]
    pub fn statistics_mut(&mut self) -> &mut MetricStatistics {
        &mut self.statistics
    }
}

impl Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.metric, self.value)?;

        match self.units().suffix() {
            "" => Ok(()),
            suffix => write!(f, " {suffix}"),
        }
    }
}

/// The metrics emitted for one measured region, keyed by metric.
///
/// Only metrics that were requested, are supported on the current platform and had a
/// non-zero value are present.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetricResults {
    by_metric: BTreeMap<Metric, MetricResult>,
}

impl MetricResults {
    pub(crate) fn insert(&mut self, result: MetricResult) {
        self.by_metric.insert(result.metric(), result);
    }

    /// The result for `metric`, if it was emitted.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<&MetricResult> {
        self.by_metric.get(&metric)
    }

    /// Whether a result for `metric` was emitted.
    #[must_use]
    pub fn contains(&self, metric: Metric) -> bool {
        self.by_metric.contains_key(&metric)
    }

    /// Number of emitted metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_metric.len()
    }

    /// Whether no metrics were emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_metric.is_empty()
    }

    /// Iterates over the emitted results in metric order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricResult> {
        self.by_metric.values()
    }

    /// Merges the samples of `other` into the matching results of `self`.
    ///
    /// Metrics present only in `other` are added as they are.
    pub fn merge_from(&mut self, other: &Self) {
        for (metric, result) in &other.by_metric {
            match self.by_metric.entry(*metric) {
                btree_map::Entry::Occupied(mut existing) => existing
                    .get_mut()
                    .statistics_mut()
                    .merge_from(result.statistics()),
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(result.clone());
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a MetricResults {
    type Item = &'a MetricResult;
    type IntoIter = btree_map::Values<'a, Metric, MetricResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_metric.values()
    }
}

impl Display for MetricResults {
    #[cfg_attr(test, mutants::skip)] // Formatting only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in self {
            writeln!(f, "{result}")?;
        }

        Ok(())
    }
}
