use std::hint::black_box;

use futures::executor::block_on;
use futures::future::{AbortRegistration, Abortable};
use tracing::{debug, trace};

use crate::metric::RegionReading;
use crate::metric_result::MetricResult;
use crate::pal::{Platform, PlatformFacade};
use crate::{BenchmarkConfig, MetricResults, Snapshot, UsageDelta, WorkloadError};

/// Measures the time and resources consumed by a single execution of a workload.
///
/// Each call to one of the `measure` methods samples the clock and the process resource
/// counters before and after running the workload exactly once, then emits the metrics
/// requested in the [`BenchmarkConfig`] that the platform supports and that measured a
/// non-zero value.
///
/// The counters are process-wide, so anything else the process does concurrently is
/// attributed to the workload as well.
///
/// # Examples
///
/// ```
/// use take_measure::{BenchmarkConfig, BenchmarkMonitor, Metric};
///
/// let monitor = BenchmarkMonitor::new(
///     "parse_config",
///     BenchmarkConfig::new().metrics([Metric::WallClock, Metric::CpuTotal]),
/// );
///
/// let results = monitor.measure(|| "key = value".split(" = ").count());
///
/// for result in &results {
///     println!("{result}");
/// }
/// ```
#[derive(Debug)]
pub struct BenchmarkMonitor {
    name: String,
    config: BenchmarkConfig,
    platform: PlatformFacade,
}

#[derive(Clone, Copy, Debug)]
struct RegionStart {
    snapshot: Snapshot,
    uptime_nanos: u64,
}

impl BenchmarkMonitor {
    /// Creates a monitor for the region called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, config: BenchmarkConfig) -> Self {
        Self::with_platform(name, config, PlatformFacade::real())
    }

    pub(crate) fn with_platform(
        name: impl Into<String>,
        config: BenchmarkConfig,
        platform: PlatformFacade,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            platform,
        }
    }

    /// The name of the measured region.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration this monitor was created with.
    #[must_use]
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Runs `workload` once and returns the metrics of that run.
    ///
    /// The return value of the workload is kept alive until after the end sample is taken, so
    /// that the work that produced it cannot be optimized away.
    ///
    /// A panic in the workload propagates to the caller.
    pub fn measure<R>(&self, workload: impl FnOnce() -> R) -> MetricResults {
        let start = self.begin();
        let output = workload();
        let results = self.finish(start);

        black_box(output);
        results
    }

    /// Runs a fallible `workload` once and returns the metrics of that run.
    ///
    /// # Errors
    ///
    /// If the workload fails, its error is returned unchanged and no metrics are produced.
    pub fn try_measure<R, E>(
        &self,
        workload: impl FnOnce() -> Result<R, E>,
    ) -> Result<MetricResults, E> {
        let start = self.begin();
        let output = workload()?;
        let results = self.finish(start);

        black_box(output);
        Ok(results)
    }

    /// Drives `future` to completion on the calling thread and returns the metrics of that run.
    ///
    /// The calling thread is blocked until the future completes.
    ///
    /// # Errors
    ///
    /// If the future resolves to an error, that error is returned unchanged and no metrics are
    /// produced.
    pub fn measure_async<T, E>(
        &self,
        future: impl Future<Output = Result<T, E>>,
    ) -> Result<MetricResults, E> {
        self.try_measure(|| block_on(future))
    }

    /// Drives `future` to completion on the calling thread unless it is aborted via the
    /// [`AbortHandle`](futures::future::AbortHandle) paired with `registration`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadError::Cancelled`] if the future was aborted and
    /// [`WorkloadError::Failed`] with the future's own error if it resolved to one. No metrics
    /// are produced in either case.
    pub fn measure_cancellable<T, E>(
        &self,
        future: impl Future<Output = Result<T, E>>,
        registration: AbortRegistration,
    ) -> Result<MetricResults, WorkloadError<E>> {
        let abortable = Abortable::new(future, registration);

        self.try_measure(|| match block_on(abortable) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(error)) => Err(WorkloadError::Failed(error)),
            Err(_aborted) => Err(WorkloadError::Cancelled),
        })
        .inspect_err(|error| {
            if error.is_cancelled() {
                debug!(region = %self.name, "measured workload was cancelled");
            }
        })
    }

    // The snapshot is taken first so that its cost is not attributed to the wall clock.
    fn begin(&self) -> RegionStart {
        let snapshot = self.platform.snapshot();
        let uptime_nanos = self.platform.uptime_nanos();

        RegionStart {
            snapshot,
            uptime_nanos,
        }
    }

    fn finish(&self, start: RegionStart) -> MetricResults {
        let end_uptime_nanos = self.platform.uptime_nanos();
        let end_snapshot = self.platform.snapshot();

        let reading = RegionReading {
            wall_clock_nanos: end_uptime_nanos.saturating_sub(start.uptime_nanos),
            usage: UsageDelta::between(&start.snapshot, &end_snapshot),
        };

        let mut results = MetricResults::default();

        for &metric in self.config.requested_metrics() {
            match metric.value_in(&reading) {
                Some(value) if value > 0 => results.insert(MetricResult::new(
                    metric,
                    value,
                    self.config.warmup_count(),
                    self.config.max_count(),
                    self.config.scaling(),
                    self.config.tags().clone(),
                )),
                Some(_) => trace!(region = %self.name, %metric, "omitting zero-valued metric"),
                None => trace!(region = %self.name, %metric, "metric not supported on this platform"),
            }
        }

        debug!(
            region = %self.name,
            wall_clock_nanos = reading.wall_clock_nanos,
            emitted = results.len(),
            "measured region"
        );

        results
    }
}
