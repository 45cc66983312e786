//! Windows: the performance counter as the clock, counters via `GetProcessTimes()` and
//! `GetProcessMemoryInfo()`.

use std::mem;
use std::sync::LazyLock;

use windows::Win32::Foundation::FILETIME;
use windows::Win32::System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency};
use windows::Win32::System::ProcessStatus::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use windows::Win32::System::Threading::{GetCurrentProcess, GetProcessTimes};

use crate::{NANOS_PER_SECOND, Snapshot};
use crate::pal::Platform;

// FILETIME durations are expressed in 100-nanosecond ticks.
const NANOS_PER_FILETIME_TICK: u64 = 100;

pub(crate) static BUILD_TARGET_PLATFORM: LazyLock<BuildTargetPlatform> =
    LazyLock::new(BuildTargetPlatform::new);

#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    // Ticks per second of the performance counter, fixed at boot.
    counter_frequency: u64,
}

impl BuildTargetPlatform {
    fn new() -> Self {
        let mut raw_frequency = 0_i64;

        // SAFETY: We are passing a valid pointer, no other safety requirements.
        let frequency = unsafe { QueryPerformanceFrequency(&raw mut raw_frequency) }
            .map_or(0, |()| u64::try_from(raw_frequency).unwrap_or(0));

        Self {
            counter_frequency: frequency.max(1),
        }
    }
}

impl Platform for BuildTargetPlatform {
    #[inline]
    fn uptime_nanos(&self) -> u64 {
        let mut raw_counter = 0_i64;

        // SAFETY: We are passing a valid pointer, no other safety requirements.
        // The call cannot fail on any Windows version that Rust supports.
        let counter = unsafe { QueryPerformanceCounter(&raw mut raw_counter) }
            .map_or(0, |()| u64::try_from(raw_counter).unwrap_or(0));

        let ticks = u128::from(counter);
        let nanos = ticks
            .saturating_mul(u128::from(NANOS_PER_SECOND))
            .checked_div(u128::from(self.counter_frequency))
            .expect("frequency is clamped to at least 1");

        u64::try_from(nanos).unwrap_or(u64::MAX)
    }

    fn snapshot(&self) -> Snapshot {
        let (user_time_nanos, system_time_nanos) = process_times().unwrap_or_default();
        let memory = memory_counters();

        Snapshot {
            user_time_nanos,
            system_time_nanos,
            resident_bytes: memory.map_or(0, |m| widen(m.WorkingSetSize)),
            virtual_bytes: memory.map_or(0, |m| widen(m.PagefileUsage)),
            peak_resident_bytes: memory.map_or(0, |m| widen(m.PeakWorkingSetSize)),
            physical_footprint_bytes: None,
            syscalls: None,
            context_switches: None,
            threads: None,
            running_threads: None,
            instructions: None,
        }
    }
}

/// Returns (user, kernel) processor time of the current process.
fn process_times() -> Option<(u64, u64)> {
    let mut creation = FILETIME::default();
    let mut exit = FILETIME::default();
    let mut kernel = FILETIME::default();
    let mut user = FILETIME::default();

    // SAFETY: The pseudo-handle of the current process is always valid and all
    // out-pointers point to valid FILETIME values.
    unsafe {
        GetProcessTimes(
            GetCurrentProcess(),
            &raw mut creation,
            &raw mut exit,
            &raw mut kernel,
            &raw mut user,
        )
    }
    .ok()?;

    Some((filetime_nanos(user), filetime_nanos(kernel)))
}

fn memory_counters() -> Option<PROCESS_MEMORY_COUNTERS> {
    let size = u32::try_from(mem::size_of::<PROCESS_MEMORY_COUNTERS>())
        .expect("the structure is a few dozen bytes, always fits in u32");

    let mut counters = PROCESS_MEMORY_COUNTERS {
        cb: size,
        ..Default::default()
    };

    // SAFETY: The pseudo-handle of the current process is always valid and the buffer is
    // a valid PROCESS_MEMORY_COUNTERS of the declared size.
    unsafe { GetProcessMemoryInfo(GetCurrentProcess(), &raw mut counters, size) }.ok()?;

    Some(counters)
}

fn filetime_nanos(value: FILETIME) -> u64 {
    let ticks = (u64::from(value.dwHighDateTime) << 32) | u64::from(value.dwLowDateTime);
    ticks.saturating_mul(NANOS_PER_FILETIME_TICK)
}

fn widen(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
