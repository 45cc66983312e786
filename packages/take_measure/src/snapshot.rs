use crate::pal::{Platform, PlatformFacade};

/// A point-in-time capture of the resource counters of the current process.
///
/// The always-present fields are available on every supported platform. The optional fields
/// are `None` where the platform does not expose the underlying counter. `None` means "not
/// available here", never "zero" - zero is a legitimate measured value.
///
/// | Counter              | Linux | macOS | Windows |
/// |----------------------|-------|-------|---------|
/// | physical footprint   |       | yes   |         |
/// | syscalls             |       | yes   |         |
/// | context switches     | yes   | yes   |         |
/// | threads              | yes   | yes   |         |
/// | running threads      |       | yes   |         |
/// | instructions retired |       | yes   |         |
///
/// Compare two snapshots via [`UsageDelta::between()`](crate::UsageDelta::between).
///
/// # Examples
///
/// ```
/// use take_measure::{Snapshot, UsageDelta};
///
/// let start = Snapshot::capture();
/// let data: Vec<u64> = (0..100_000).collect();
/// let end = Snapshot::capture();
///
/// let delta = UsageDelta::between(&start, &end);
/// println!("user time: {} ns", delta.user_time_nanos());
/// # std::hint::black_box(data);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Snapshot {
    pub(crate) user_time_nanos: u64,
    pub(crate) system_time_nanos: u64,
    pub(crate) resident_bytes: u64,
    pub(crate) virtual_bytes: u64,
    pub(crate) peak_resident_bytes: u64,
    pub(crate) physical_footprint_bytes: Option<u64>,
    pub(crate) syscalls: Option<u64>,
    pub(crate) context_switches: Option<u64>,
    pub(crate) threads: Option<u64>,
    pub(crate) running_threads: Option<u64>,
    pub(crate) instructions: Option<u64>,
}

impl Snapshot {
    /// Captures the current resource counters of this process.
    ///
    /// This is a pure read that does not allocate, so taking a snapshot does not
    /// meaningfully disturb the counters of the region being measured.
    #[must_use]
    pub fn capture() -> Self {
        PlatformFacade::real().snapshot()
    }

    /// Processor time spent executing in user mode, in nanoseconds.
    #[must_use]
    pub fn user_time_nanos(&self) -> u64 {
        self.user_time_nanos
    }

    /// Processor time spent executing in kernel mode, in nanoseconds.
    #[must_use]
    pub fn system_time_nanos(&self) -> u64 {
        self.system_time_nanos
    }

    /// Memory currently resident in physical memory, in bytes.
    #[must_use]
    pub fn resident_bytes(&self) -> u64 {
        self.resident_bytes
    }

    /// Virtual memory currently reserved by the process, in bytes.
    ///
    /// On Windows this is the committed (pagefile-backed) memory.
    #[must_use]
    pub fn virtual_bytes(&self) -> u64 {
        self.virtual_bytes
    }

    /// The highest resident memory the process has reached so far, in bytes.
    #[must_use]
    pub fn peak_resident_bytes(&self) -> u64 {
        self.peak_resident_bytes
    }

    /// The physical footprint as accounted by the operating system memory pressure logic.
    #[must_use]
    pub fn physical_footprint_bytes(&self) -> Option<u64> {
        self.physical_footprint_bytes
    }

    /// Number of system calls made by the process.
    #[must_use]
    pub fn syscalls(&self) -> Option<u64> {
        self.syscalls
    }

    /// Number of context switches, voluntary and involuntary combined.
    #[must_use]
    pub fn context_switches(&self) -> Option<u64> {
        self.context_switches
    }

    /// Number of threads in the process.
    #[must_use]
    pub fn threads(&self) -> Option<u64> {
        self.threads
    }

    /// Number of threads in the process that are currently runnable.
    #[must_use]
    pub fn running_threads(&self) -> Option<u64> {
        self.running_threads
    }

    /// Number of instructions retired by the process.
    #[must_use]
    pub fn instructions(&self) -> Option<u64> {
        self.instructions
    }
}
