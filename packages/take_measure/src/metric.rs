use std::fmt::{self, Display};

use crate::UsageDelta;

/// Identifies a quantity that [`BenchmarkMonitor`](crate::BenchmarkMonitor) can report about a
/// measured region.
///
/// Not every metric is available on every platform. Requesting an unavailable metric is not an
/// error - it is simply absent from the results.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum Metric {
    /// Elapsed time on the monotonic clock.
    WallClock,

    /// Processor time spent in user mode.
    CpuUser,

    /// Processor time spent in kernel mode.
    CpuSystem,

    /// Processor time spent in user and kernel mode combined.
    CpuTotal,

    /// The highest resident memory the process reached, as of the end of the region.
    PeakResidentMemory,

    /// Growth in resident memory over the region.
    ResidentMemoryDelta,

    /// Virtual memory at the end of the region.
    VirtualMemory,

    /// Physical footprint at the end of the region (macOS only).
    PhysicalFootprint,

    /// System calls made during the region (macOS only).
    Syscalls,

    /// Context switches during the region.
    ContextSwitches,

    /// Growth in thread count over the region.
    Threads,

    /// Growth in runnable thread count over the region (macOS only).
    RunningThreads,

    /// Instructions retired during the region (macOS only).
    Instructions,
}

/// Whether a larger value of a metric is an improvement or a regression.
///
/// Informational only, for use by whoever formats or compares the results.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Polarity {
    /// Smaller values are better (time, memory, syscalls).
    LowerIsBetter,
}

/// The unit in which a metric value is expressed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum MetricUnits {
    /// Nanoseconds.
    Nanoseconds,

    /// Bytes.
    Bytes,

    /// A plain count of occurrences or items.
    Count,
}

/// The raw material a metric value is extracted from.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RegionReading {
    pub(crate) wall_clock_nanos: u64,
    pub(crate) usage: UsageDelta,
}

type Extractor = fn(&RegionReading) -> Option<u64>;

impl Metric {
    /// Every metric, in declaration order.
    pub const ALL: &[Self] = &[
        Self::WallClock,
        Self::CpuUser,
        Self::CpuSystem,
        Self::CpuTotal,
        Self::PeakResidentMemory,
        Self::ResidentMemoryDelta,
        Self::VirtualMemory,
        Self::PhysicalFootprint,
        Self::Syscalls,
        Self::ContextSwitches,
        Self::Threads,
        Self::RunningThreads,
        Self::Instructions,
    ];

    /// A short machine-friendly name, e.g. `cpu_total`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::WallClock => "wall_clock",
            Self::CpuUser => "cpu_user",
            Self::CpuSystem => "cpu_system",
            Self::CpuTotal => "cpu_total",
            Self::PeakResidentMemory => "peak_resident_memory",
            Self::ResidentMemoryDelta => "resident_memory_delta",
            Self::VirtualMemory => "virtual_memory",
            Self::PhysicalFootprint => "physical_footprint",
            Self::Syscalls => "syscalls",
            Self::ContextSwitches => "context_switches",
            Self::Threads => "threads",
            Self::RunningThreads => "running_threads",
            Self::Instructions => "instructions",
        }
    }

    /// The unit in which values of this metric are expressed.
    #[must_use]
    pub fn units(self) -> MetricUnits {
        match self {
            Self::WallClock | Self::CpuUser | Self::CpuSystem | Self::CpuTotal => {
                MetricUnits::Nanoseconds
            }
            Self::PeakResidentMemory
            | Self::ResidentMemoryDelta
            | Self::VirtualMemory
            | Self::PhysicalFootprint => MetricUnits::Bytes,
            Self::Syscalls
            | Self::ContextSwitches
            | Self::Threads
            | Self::RunningThreads
            | Self::Instructions => MetricUnits::Count,
        }
    }

    /// Whether larger values of this metric are better or worse.
    #[must_use]
    pub fn polarity(self) -> Polarity {
        match self {
            Self::WallClock
            | Self::CpuUser
            | Self::CpuSystem
            | Self::CpuTotal
            | Self::PeakResidentMemory
            | Self::ResidentMemoryDelta
            | Self::VirtualMemory
            | Self::PhysicalFootprint
            | Self::Syscalls
            | Self::ContextSwitches
            | Self::Threads
            | Self::RunningThreads
            | Self::Instructions => Polarity::LowerIsBetter,
        }
    }

    /// Extracts the value of this metric from a reading, if the platform supports it.
    pub(crate) fn value_in(self, reading: &RegionReading) -> Option<u64> {
        (self.extractor())(reading)
    }

    fn extractor(self) -> Extractor {
        match self {
            Self::WallClock => |r| Some(r.wall_clock_nanos),
            Self::CpuUser => |r| Some(r.usage.user_time_nanos()),
            Self::CpuSystem => |r| Some(r.usage.system_time_nanos()),
            Self::CpuTotal => |r| Some(r.usage.total_time_nanos()),
            Self::PeakResidentMemory => |r| Some(r.usage.peak_resident_bytes()),
            Self::ResidentMemoryDelta => |r| Some(r.usage.resident_bytes()),
            Self::VirtualMemory => |r| Some(r.usage.virtual_bytes()),
            Self::PhysicalFootprint => |r| r.usage.physical_footprint_bytes(),
            Self::Syscalls => |r| r.usage.syscalls(),
            Self::ContextSwitches => |r| r.usage.context_switches(),
            Self::Threads => |r| r.usage.threads(),
            Self::RunningThreads => |r| r.usage.running_threads(),
            Self::Instructions => |r| r.usage.instructions(),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl MetricUnits {
    /// A short suffix for display purposes, e.g. `ns`.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Bytes => "B",
            Self::Count => "",
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::Snapshot;

    fn reading_without_optional_counters() -> RegionReading {
        let end = Snapshot {
            user_time_nanos: 30,
            system_time_nanos: 12,
            resident_bytes: 4096,
            virtual_bytes: 65536,
            peak_resident_bytes: 8192,
            ..Snapshot::default()
        };

        RegionReading {
            wall_clock_nanos: 1_000,
            usage: UsageDelta::between(&Snapshot::default(), &end),
        }
    }

    #[test]
    fn extracts_always_available_metrics() {
        let reading = reading_without_optional_counters();

        assert_eq!(Metric::WallClock.value_in(&reading), Some(1_000));
        assert_eq!(Metric::CpuUser.value_in(&reading), Some(30));
        assert_eq!(Metric::CpuSystem.value_in(&reading), Some(12));
        assert_eq!(Metric::CpuTotal.value_in(&reading), Some(42));
        assert_eq!(Metric::PeakResidentMemory.value_in(&reading), Some(8192));
        assert_eq!(Metric::ResidentMemoryDelta.value_in(&reading), Some(4096));
        assert_eq!(Metric::VirtualMemory.value_in(&reading), Some(65536));
    }

    #[test]
    fn optional_metrics_absent_without_counters() {
        let reading = reading_without_optional_counters();

        for metric in [
            Metric::PhysicalFootprint,
            Metric::Syscalls,
            Metric::ContextSwitches,
            Metric::Threads,
            Metric::RunningThreads,
            Metric::Instructions,
        ] {
            assert_eq!(metric.value_in(&reading), None, "{metric}");
        }
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = Metric::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names.len(), Metric::ALL.len());
    }

    #[test]
    fn units_match_metric_kind() {
        assert_eq!(Metric::WallClock.units(), MetricUnits::Nanoseconds);
        assert_eq!(Metric::PeakResidentMemory.units(), MetricUnits::Bytes);
        assert_eq!(Metric::Instructions.units(), MetricUnits::Count);
        assert_eq!(MetricUnits::Nanoseconds.suffix(), "ns");
    }

    #[test]
    fn all_metrics_are_costs() {
        assert!(
            Metric::ALL
                .iter()
                .all(|m| m.polarity() == Polarity::LowerIsBetter)
        );
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Metric::CpuTotal.to_string(), "cpu_total");
    }
}
