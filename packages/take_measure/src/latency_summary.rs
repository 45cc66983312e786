use std::fmt::{self, Display};

/// Summary statistics over a set of latency samples, in milliseconds.
///
/// Every statistic is `None` when there are no samples. Otherwise
/// `min <= p50 <= p90 <= p99 <= max` holds.
///
/// Obtained from [`DurationAggregator::summary()`](crate::DurationAggregator::summary).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatencySummary {
    count: usize,
    failures: u64,
    min: Option<f64>,
    max: Option<f64>,
    mean: Option<f64>,
    p50: Option<f64>,
    p90: Option<f64>,
    p99: Option<f64>,
}

impl LatencySummary {
    pub(crate) fn empty(failures: u64) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    #[expect(
        clippy::too_many_arguments,
        reason = "crate-internal constructor mirroring the public fields"
    )]
    pub(crate) fn new(
        count: usize,
        failures: u64,
        min: f64,
        max: f64,
        mean: f64,
        p50: f64,
        p90: f64,
        p99: f64,
    ) -> Self {
        Self {
            count,
            failures,
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
            p50: Some(p50),
            p90: Some(p90),
            p99: Some(p99),
        }
    }

    /// Number of successful samples.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of recorded failures. Failures carry no duration.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// The smallest sample.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// The largest sample.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// The arithmetic mean of the samples.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    /// The median (nearest rank).
    #[must_use]
    pub fn p50(&self) -> Option<f64> {
        self.p50
    }

    /// The 90th percentile (nearest rank).
    #[must_use]
    pub fn p90(&self) -> Option<f64> {
        self.p90
    }

    /// The 99th percentile (nearest rank).
    #[must_use]
    pub fn p99(&self) -> Option<f64> {
        self.p99
    }

    /// Renders the summary as a short multi-line block.
    ///
    /// ```text
    /// latency (ms): count=5 fail=1
    ///   min=10.00 mean=30.00 max=50.00
    ///   p50=30.00 p90=50.00 p99=50.00
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "latency (ms): count={} fail={}\n  min={} mean={} max={}\n  p50={} p90={} p99={}",
            self.count,
            self.failures,
            format_ms(self.min),
            format_ms(self.mean),
            format_ms(self.max),
            format_ms(self.p50),
            format_ms(self.p90),
            format_ms(self.p99),
        )
    }

    /// Renders the summary as a single line labeled with the system under test, suitable for
    /// grepping out of a log.
    ///
    /// ```text
    /// summary backend=sqlite wrapper=pool n=5 fail=0 mean=30.00 p90=50.00 p99=50.00 min=10.00 max=50.00 ms
    /// ```
    #[must_use]
    pub fn render_one_line(&self, backend: &str, wrapper: &str) -> String {
        format!(
            "summary backend={backend} wrapper={wrapper} n={} fail={} mean={} p90={} p99={} min={} max={} ms",
            self.count,
            self.failures,
            format_ms(self.mean),
            format_ms(self.p90),
            format_ms(self.p99),
            format_ms(self.min),
            format_ms(self.max),
        )
    }
}

impl Display for LatencySummary {
    #[cfg_attr(test, mutants::skip)] // Delegates to render().
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Formats a millisecond value with two decimals, or `-` if absent.
pub(crate) fn format_ms(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
