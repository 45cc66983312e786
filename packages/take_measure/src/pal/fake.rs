//! Fake platform implementation for testing.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::Snapshot;
use crate::pal::Platform;

#[derive(Debug, Default)]
struct FakePlatformState {
    uptime_nanos: u64,
    snapshot: Snapshot,
}

/// Fake implementation of the platform abstraction for testing.
///
/// Clones share the same state, so a test can keep one clone and move time or counters
/// forward while the code under test holds the other (e.g. from inside a measured workload).
#[derive(Clone, Debug, Default)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_uptime_nanos(&self, nanos: u64) {
        self.state.lock().uptime_nanos = nanos;
    }

    pub(crate) fn set_snapshot(&self, snapshot: Snapshot) {
        self.state.lock().snapshot = snapshot;
    }
}

impl Platform for FakePlatform {
    fn uptime_nanos(&self) -> u64 {
        self.state.lock().uptime_nanos
    }

    fn snapshot(&self) -> Snapshot {
        self.state.lock().snapshot
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_readings() {
        let platform = FakePlatform::new();

        assert_eq!(platform.uptime_nanos(), 0);
        assert_eq!(platform.snapshot(), Snapshot::default());
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_uptime_nanos(100);
        assert_eq!(platform2.uptime_nanos(), 100);

        platform2.set_snapshot(Snapshot {
            threads: Some(4),
            ..Snapshot::default()
        });
        assert_eq!(platform1.snapshot().threads(), Some(4));
    }
}
