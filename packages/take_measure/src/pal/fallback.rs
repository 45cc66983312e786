//! Targets without a dedicated implementation: the standard library clock and, where the
//! target is Unix-like, `getrusage()`.

use crate::Snapshot;
use crate::pal::Platform;
use crate::pal::std_clock::std_uptime_nanos;
#[cfg(unix)]
use crate::pal::unix;

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    #[inline]
    fn uptime_nanos(&self) -> u64 {
        std_uptime_nanos()
    }

    #[cfg(unix)]
    fn snapshot(&self) -> Snapshot {
        let usage = unix::resource_usage();

        Snapshot {
            user_time_nanos: usage.map_or(0, |u| u.user_time_nanos),
            system_time_nanos: usage.map_or(0, |u| u.system_time_nanos),
            peak_resident_bytes: usage.map_or(0, |u| u.peak_resident_bytes),
            context_switches: usage.map(|u| u.context_switches),
            ..Snapshot::default()
        }
    }

    #[cfg(not(unix))]
    fn snapshot(&self) -> Snapshot {
        Snapshot::default()
    }
}
