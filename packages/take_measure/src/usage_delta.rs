use crate::Snapshot;

/// Resource consumption between two [`Snapshot`]s.
///
/// Counters (processor time, resident memory, syscalls, context switches, threads,
/// instructions) are reported as `end - start`. A counter that went backwards, for example
/// because the operating system reset it, is reported as zero rather than as a negative or
/// wrapped-around value.
///
/// Gauges (virtual memory, physical footprint, peak resident memory) are reported as their
/// value at the end of the interval, not as a difference.
///
/// An optional counter that is absent from either snapshot is absent from the delta.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct UsageDelta {
    user_time_nanos: u64,
    system_time_nanos: u64,
    resident_bytes: u64,
    virtual_bytes: u64,
    peak_resident_bytes: u64,
    physical_footprint_bytes: Option<u64>,
    syscalls: Option<u64>,
    context_switches: Option<u64>,
    threads: Option<u64>,
    running_threads: Option<u64>,
    instructions: Option<u64>,
}

impl UsageDelta {
    /// Calculates the resource consumption between `start` and `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use take_measure::{Snapshot, UsageDelta};
    ///
    /// let start = Snapshot::capture();
    /// let end = Snapshot::capture();
    ///
    /// // Swapping the arguments never produces a negative or wrapped-around value.
    /// let backwards = UsageDelta::between(&end, &start);
    /// assert!(backwards.user_time_nanos() <= end.user_time_nanos());
    /// ```
    #[must_use]
    pub fn between(start: &Snapshot, end: &Snapshot) -> Self {
        Self {
            user_time_nanos: counter_delta(start.user_time_nanos, end.user_time_nanos),
            system_time_nanos: counter_delta(start.system_time_nanos, end.system_time_nanos),
            resident_bytes: counter_delta(start.resident_bytes, end.resident_bytes),
            virtual_bytes: end.virtual_bytes,
            peak_resident_bytes: end.peak_resident_bytes,
            physical_footprint_bytes: gauge_at_end(
                start.physical_footprint_bytes,
                end.physical_footprint_bytes,
            ),
            syscalls: optional_counter_delta(start.syscalls, end.syscalls),
            context_switches: optional_counter_delta(start.context_switches, end.context_switches),
            threads: optional_counter_delta(start.threads, end.threads),
            running_threads: optional_counter_delta(start.running_threads, end.running_threads),
            instructions: optional_counter_delta(start.instructions, end.instructions),
        }
    }

    /// Processor time spent in user mode during the interval, in nanoseconds.
    #[must_use]
    pub fn user_time_nanos(&self) -> u64 {
        self.user_time_nanos
    }

    /// Processor time spent in kernel mode during the interval, in nanoseconds.
    #[must_use]
    pub fn system_time_nanos(&self) -> u64 {
        self.system_time_nanos
    }

    /// User and kernel processor time combined, in nanoseconds.
    #[must_use]
    pub fn total_time_nanos(&self) -> u64 {
        self.user_time_nanos.saturating_add(self.system_time_nanos)
    }

    /// Growth of resident memory during the interval, in bytes.
    #[must_use]
    pub fn resident_bytes(&self) -> u64 {
        self.resident_bytes
    }

    /// Virtual memory at the end of the interval, in bytes.
    #[must_use]
    pub fn virtual_bytes(&self) -> u64 {
        self.virtual_bytes
    }

    /// Peak resident memory of the process as of the end of the interval, in bytes.
    #[must_use]
    pub fn peak_resident_bytes(&self) -> u64 {
        self.peak_resident_bytes
    }

    /// Physical footprint at the end of the interval, in bytes.
    #[must_use]
    pub fn physical_footprint_bytes(&self) -> Option<u64> {
        self.physical_footprint_bytes
    }

    /// System calls made during the interval.
    #[must_use]
    pub fn syscalls(&self) -> Option<u64> {
        self.syscalls
    }

    /// Context switches during the interval.
    #[must_use]
    pub fn context_switches(&self) -> Option<u64> {
        self.context_switches
    }

    /// Growth in thread count during the interval.
    #[must_use]
    pub fn threads(&self) -> Option<u64> {
        self.threads
    }

    /// Growth in runnable thread count during the interval.
    #[must_use]
    pub fn running_threads(&self) -> Option<u64> {
        self.running_threads
    }

    /// Instructions retired during the interval.
    #[must_use]
    pub fn instructions(&self) -> Option<u64> {
        self.instructions
    }
}

#[inline]
fn counter_delta(start: u64, end: u64) -> u64 {
    end.saturating_sub(start)
}

#[inline]
fn optional_counter_delta(start: Option<u64>, end: Option<u64>) -> Option<u64> {
    start.zip(end).map(|(start, end)| counter_delta(start, end))
}

#[inline]
fn gauge_at_end(start: Option<u64>, end: Option<u64>) -> Option<u64> {
    start.and(end)
}
