//! macOS: continuous clocks via `clock_gettime_nsec_np()`, counters via `getrusage()`,
//! `proc_pidinfo()` and `proc_pid_rusage()`.

use std::ffi::c_int;
use std::mem;
use std::sync::LazyLock;

use tracing::trace;

use crate::Snapshot;
use crate::pal::high_water::HighWaterMark;
use crate::pal::std_clock::std_uptime_nanos;
use crate::pal::{Platform, unix};

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// The clock selected by probing on first use. It never changes afterwards.
static CLOCK_SOURCE: LazyLock<ClockSource> = LazyLock::new(ClockSource::probe);

static LATEST_READING: HighWaterMark = HighWaterMark::new();

#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    #[inline]
    fn uptime_nanos(&self) -> u64 {
        match *CLOCK_SOURCE {
            ClockSource::Kernel(clock_id) => LATEST_READING.observe(read_clock(clock_id)),
            ClockSource::Std => std_uptime_nanos(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        let usage = unix::resource_usage();
        let task = task_info();
        let extended = extended_usage();

        Snapshot {
            user_time_nanos: usage.map_or(0, |u| u.user_time_nanos),
            system_time_nanos: usage.map_or(0, |u| u.system_time_nanos),
            resident_bytes: task.map_or(0, |t| t.pti_resident_size),
            virtual_bytes: task.map_or(0, |t| t.pti_virtual_size),
            peak_resident_bytes: usage.map_or(0, |u| u.peak_resident_bytes),
            physical_footprint_bytes: extended.map(|e| e.ri_phys_footprint),
            syscalls: task.map(|t| {
                counter(t.pti_syscalls_mach).saturating_add(counter(t.pti_syscalls_unix))
            }),
            context_switches: task.map(|t| counter(t.pti_csw)),
            threads: task.map(|t| counter(t.pti_threadnum)),
            running_threads: task.map(|t| counter(t.pti_numrunning)),
            instructions: extended.map(|e| e.ri_instructions),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ClockSource {
    Kernel(libc::clockid_t),
    Std,
}

impl ClockSource {
    fn probe() -> Self {
        // CLOCK_MONOTONIC_RAW keeps counting while the system sleeps. CLOCK_UPTIME_RAW does not.
        select_clock(read_clock)
    }
}

fn select_clock(read: impl Fn(libc::clockid_t) -> Option<u64>) -> ClockSource {
    [libc::CLOCK_MONOTONIC_RAW, libc::CLOCK_UPTIME_RAW]
        .into_iter()
        .find(|clock_id| read(*clock_id).is_some())
        .map_or_else(
            || {
                trace!("no kernel clock is readable, using the standard library clock");
                ClockSource::Std
            },
            ClockSource::Kernel,
        )
}

/// `clock_gettime_nsec_np()` signals failure by returning zero.
fn read_clock(clock_id: libc::clockid_t) -> Option<u64> {
    // SAFETY: No safety requirements.
    let nanos = unsafe { libc::clock_gettime_nsec_np(clock_id) };

    (nanos != 0).then_some(nanos)
}

fn task_info() -> Option<libc::proc_taskinfo> {
    // SAFETY: All-zero is a valid initial value for this type.
    let mut info: libc::proc_taskinfo = unsafe { mem::zeroed() };
    let expected_size = c_int::try_from(mem::size_of::<libc::proc_taskinfo>())
        .expect("proc_taskinfo is a few hundred bytes, always fits in c_int");

    // SAFETY: The buffer is valid for writes of `expected_size` bytes.
    let written = unsafe {
        libc::proc_pidinfo(
            libc::getpid(),
            libc::PROC_PIDTASKINFO,
            0,
            (&raw mut info).cast(),
            expected_size,
        )
    };

    (written == expected_size).then_some(info)
}

fn extended_usage() -> Option<libc::rusage_info_v4> {
    // SAFETY: All-zero is a valid initial value for this type.
    let mut info: libc::rusage_info_v4 = unsafe { mem::zeroed() };

    // SAFETY: The buffer is a valid `rusage_info_v4`, matching the requested flavor. The
    // binding declares the parameter as a pointer to `rusage_info_t` but the kernel writes
    // the structure itself into the pointed-to memory.
    let result = unsafe {
        libc::proc_pid_rusage(
            libc::getpid(),
            libc::RUSAGE_INFO_V4,
            (&raw mut info).cast::<libc::rusage_info_t>(),
        )
    };

    (result == 0).then_some(info)
}

// Mach counters are signed 32-bit in the ABI but never legitimately negative.
fn counter(value: i32) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
