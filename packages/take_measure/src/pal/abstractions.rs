//! Platform abstraction trait definitions.

use std::fmt::Debug;

use crate::Snapshot;

/// Provides the clock and resource counters that all measurements are built from.
///
/// Implementations must never fail. If the operating system refuses a request, the
/// implementation degrades to a less precise source or reports the affected counters as
/// unavailable instead.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Nanoseconds on a monotonic clock with an arbitrary, process-independent origin.
    ///
    /// Consecutive calls never return a smaller value.
    fn uptime_nanos(&self) -> u64;

    /// Captures the resource counters of the current process.
    fn snapshot(&self) -> Snapshot;
}
