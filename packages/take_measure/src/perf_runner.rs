//! Simple loops for driving a workload repeatedly and timing the whole run.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::NANOS_PER_MILLISECOND;
use crate::pal::{Platform, PlatformFacade};

/// Timing of a complete [`run_iterations()`] or [`run_for()`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunTiming {
    iterations: u64,
    total_ms: f64,
    average_ms: f64,
}

impl RunTiming {
    /// Number of times the body was executed.
    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Wall-clock time of the whole run in milliseconds, including any pacing delays.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// `total_ms` divided by the number of iterations, or `total_ms` if there were none.
    #[must_use]
    pub fn average_ms(&self) -> f64 {
        self.average_ms
    }
}

/// Executes `body` exactly `count` times and reports the timing of the run.
///
/// If `target_hz` is a positive frequency, the loop sleeps for one period (`1 / target_hz`
/// seconds) after each iteration. The sleep is included in the reported timing.
///
/// A `count` of zero returns a zero timing without calling `body`.
///
/// # Errors
///
/// The first error returned by `body` stops the run and is returned unchanged.
///
/// # Examples
///
/// ```
/// use take_measure::run_iterations;
///
/// let mut total = 0_u64;
/// let timing = run_iterations(100, None, || {
///     total += 1;
///     Ok::<_, std::convert::Infallible>(())
/// })
/// .unwrap();
///
/// assert_eq!(timing.iterations(), 100);
/// assert_eq!(total, 100);
/// ```
pub fn run_iterations<E>(
    count: u64,
    target_hz: Option<f64>,
    mut body: impl FnMut() -> Result<(), E>,
) -> Result<RunTiming, E> {
    if count == 0 {
        return Ok(RunTiming::default());
    }

    let platform = PlatformFacade::real();
    let period = target_hz.and_then(pacing_period);
    let start = platform.uptime_nanos();

    for _ in 0..count {
        body()?;
        pace(period);
    }

    let timing = timing(count, platform.uptime_nanos().saturating_sub(start));
    debug!(
        iterations = timing.iterations,
        total_ms = timing.total_ms,
        "fixed-iteration run completed"
    );

    Ok(timing)
}

/// Executes `body` repeatedly until `duration` has elapsed and reports the timing of the run.
///
/// The budget is checked before each iteration, so the last iteration may end after the budget
/// has run out. A zero `duration` executes `body` zero times. Pacing via `target_hz` works as
/// in [`run_iterations()`].
///
/// # Errors
///
/// The first error returned by `body` stops the run and is returned unchanged.
pub fn run_for<E>(
    duration: Duration,
    target_hz: Option<f64>,
    mut body: impl FnMut() -> Result<(), E>,
) -> Result<RunTiming, E> {
    let platform = PlatformFacade::real();
    let budget_nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    let period = target_hz.and_then(pacing_period);
    let start = platform.uptime_nanos();

    let mut iterations = 0_u64;

    while platform.uptime_nanos().saturating_sub(start) < budget_nanos {
        body()?;
        iterations = iterations.saturating_add(1);
        pace(period);
    }

    let timing = timing(iterations, platform.uptime_nanos().saturating_sub(start));
    debug!(
        iterations = timing.iterations,
        total_ms = timing.total_ms,
        "fixed-duration run completed"
    );

    Ok(timing)
}

/// The delay between iterations for a target frequency, or `None` if no pacing applies.
fn pacing_period(target_hz: f64) -> Option<Duration> {
    if target_hz > 0.0 {
        Duration::try_from_secs_f64(target_hz.recip()).ok()
    } else {
        None
    }
}

fn pace(period: Option<Duration>) {
    if let Some(period) = period {
        thread::sleep(period);
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "timings are approximate by nature"
)]
fn timing(iterations: u64, elapsed_nanos: u64) -> RunTiming {
    let total_ms = elapsed_nanos as f64 / NANOS_PER_MILLISECOND as f64;

    let average_ms = if iterations == 0 {
        total_ms
    } else {
        total_ms / iterations as f64
    };

    RunTiming {
        iterations,
        total_ms,
        average_ms,
    }
}
