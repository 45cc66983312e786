//! Linux: kernel clocks via `clock_gettime()`, counters via `getrusage()` and procfs.

mod bindings;
mod clock;
mod procfs;

use std::sync::LazyLock;

pub(crate) use bindings::*;
pub(crate) use clock::*;

use crate::Snapshot;
use crate::pal::{Platform, unix};

pub(crate) static BUILD_TARGET_PLATFORM: LazyLock<BuildTargetPlatform> =
    LazyLock::new(BuildTargetPlatform::new);

#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    clock: KernelClock,
}

impl BuildTargetPlatform {
    fn new() -> Self {
        Self {
            clock: KernelClock::probe(BindingsFacade::real()),
        }
    }
}

impl Platform for BuildTargetPlatform {
    #[inline]
    fn uptime_nanos(&self) -> u64 {
        self.clock.now_nanos()
    }

    fn snapshot(&self) -> Snapshot {
        let usage = unix::resource_usage();
        let memory = procfs::memory_usage();

        Snapshot {
            user_time_nanos: usage.map_or(0, |u| u.user_time_nanos),
            system_time_nanos: usage.map_or(0, |u| u.system_time_nanos),
            resident_bytes: memory.map_or(0, |m| m.resident_bytes),
            virtual_bytes: memory.map_or(0, |m| m.virtual_bytes),
            peak_resident_bytes: usage.map_or(0, |u| u.peak_resident_bytes),
            // Linux exposes no per-process footprint, syscall, running thread or
            // instruction counters without elevated privileges.
            physical_footprint_bytes: None,
            syscalls: None,
            context_switches: usage.map(|u| u.context_switches),
            threads: procfs::thread_count(),
            running_threads: None,
            instructions: None,
        }
    }
}
