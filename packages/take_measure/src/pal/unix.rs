//! `getrusage()` access shared by all Unix-like targets.

use std::mem;

use crate::NANOS_PER_SECOND;

const NANOS_PER_MICROSECOND: u64 = 1_000;

/// The subset of `struct rusage` that snapshots are built from, in normalized units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct ResourceUsage {
    pub(crate) user_time_nanos: u64,
    pub(crate) system_time_nanos: u64,
    pub(crate) peak_resident_bytes: u64,
    pub(crate) context_switches: u64,
}

/// Reads the resource usage of the calling process.
///
/// Returns `None` if the operating system rejects the request.
pub(crate) fn resource_usage() -> Option<ResourceUsage> {
    // SAFETY: All-zero is a valid initial value for this type.
    let mut usage: libc::rusage = unsafe { mem::zeroed() };

    // SAFETY: We are passing a valid pointer to a buffer of the expected type,
    // no other safety requirements.
    let result = unsafe { libc::getrusage(libc::RUSAGE_SELF, &raw mut usage) };

    if result != 0 {
        return None;
    }

    Some(ResourceUsage {
        user_time_nanos: timeval_nanos(usage.ru_utime),
        system_time_nanos: timeval_nanos(usage.ru_stime),
        peak_resident_bytes: max_rss_bytes(i64::from(usage.ru_maxrss)),
        context_switches: non_negative(i64::from(usage.ru_nvcsw))
            .saturating_add(non_negative(i64::from(usage.ru_nivcsw))),
    })
}

fn timeval_nanos(value: libc::timeval) -> u64 {
    non_negative(i64::from(value.tv_sec))
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(non_negative(i64::from(value.tv_usec)).saturating_mul(NANOS_PER_MICROSECOND))
}

// Apple platforms report the peak resident set size in bytes, everyone else in kibibytes.
#[cfg(any(target_os = "macos", target_os = "ios"))]
fn max_rss_bytes(raw: i64) -> u64 {
    non_negative(raw)
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
fn max_rss_bytes(raw: i64) -> u64 {
    non_negative(raw).saturating_mul(1024)
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn reads_own_usage() {
        let usage = resource_usage().unwrap();

        // Every running process has touched at least some memory.
        assert!(usage.peak_resident_bytes > 0);
    }

    #[test]
    fn cpu_time_does_not_go_backwards() {
        let before = resource_usage().unwrap();

        let mut sum = 0_u64;
        for i in 0..1_000_000_u64 {
            sum = sum.wrapping_add(std::hint::black_box(i));
        }
        std::hint::black_box(sum);

        let after = resource_usage().unwrap();

        assert!(after.user_time_nanos >= before.user_time_nanos);
        assert!(after.system_time_nanos >= before.system_time_nanos);
    }

    #[test]
    fn timeval_conversion() {
        let value = libc::timeval {
            tv_sec: 2,
            tv_usec: 500_000,
        };

        assert_eq!(timeval_nanos(value), 2_500_000_000);
    }

    #[test]
    fn negative_fields_are_treated_as_zero() {
        assert_eq!(non_negative(-5), 0);
        assert_eq!(non_negative(5), 5);
    }
}
