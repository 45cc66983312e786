use crate::pal::{Platform, PlatformFacade};

/// Returns the current reading of the most precise monotonic clock available, in nanoseconds.
///
/// The origin is arbitrary (typically system boot), so only differences between readings are
/// meaningful. Readings never decrease within a process.
///
/// Where the operating system offers a clock that keeps counting while the system is
/// suspended, that clock is used:
///
/// * Linux: `CLOCK_BOOTTIME`, falling back to `CLOCK_MONOTONIC_RAW`.
/// * macOS: `CLOCK_MONOTONIC_RAW`, falling back to `CLOCK_UPTIME_RAW`.
/// * Windows: the performance counter.
/// * Elsewhere: [`std::time::Instant`].
///
/// This function never fails. If the operating system refuses to read a clock, the next best
/// source is used instead.
///
/// # Examples
///
/// ```
/// use take_measure::uptime_nanos;
///
/// let start = uptime_nanos();
/// std::thread::sleep(std::time::Duration::from_millis(1));
/// let elapsed = uptime_nanos() - start;
///
/// assert!(elapsed >= 1_000_000);
/// ```
#[inline]
#[must_use]
pub fn uptime_nanos() -> u64 {
    PlatformFacade::real().uptime_nanos()
}
