use std::sync::LazyLock;
use std::time::Instant;

static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Nanoseconds since the first call, measured by the Rust standard library's monotonic clock.
///
/// This is the clock of last resort, for targets without a better source and for the
/// (theoretical) case of the operating system refusing to read its own clocks.
pub(crate) fn std_uptime_nanos() -> u64 {
    // u64 nanoseconds cover 584 years of process uptime.
    u64::try_from(EPOCH.elapsed().as_nanos()).unwrap_or(u64::MAX)
}
