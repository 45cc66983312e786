use tracing::trace;

use crate::pal::high_water::HighWaterMark;
use crate::pal::linux::{Bindings, BindingsFacade};
use crate::pal::std_clock::std_uptime_nanos;

/// Clocks we are willing to use, most preferred first.
///
/// `CLOCK_BOOTTIME` keeps counting while the system is suspended. `CLOCK_MONOTONIC_RAW` does
/// not, but it is immune to NTP slewing.
const CANDIDATE_CLOCKS: [libc::clockid_t; 2] = [libc::CLOCK_BOOTTIME, libc::CLOCK_MONOTONIC_RAW];

/// A kernel clock selected once, at startup, by probing which candidate clocks are readable.
///
/// The selection never changes afterwards, so all timestamps come from the same clock. If no
/// candidate is readable, the Rust standard library clock is used instead. A later failure to
/// read the selected clock repeats the latest reading rather than switching clocks.
#[derive(Debug)]
pub(crate) struct KernelClock {
    clock_id: Option<libc::clockid_t>,
    bindings: BindingsFacade,
    latest: HighWaterMark,
}

impl KernelClock {
    pub(crate) fn probe(bindings: BindingsFacade) -> Self {
        let clock_id = CANDIDATE_CLOCKS
            .into_iter()
            .find(|clock_id| bindings.clock_gettime_nanos(*clock_id).is_some());

        if clock_id.is_none() {
            trace!("no kernel clock is readable, using the standard library clock");
        }

        Self {
            clock_id,
            bindings,
            latest: HighWaterMark::new(),
        }
    }

    #[inline]
    pub(crate) fn now_nanos(&self) -> u64 {
        let Some(clock_id) = self.clock_id else {
            return std_uptime_nanos();
        };

        self.latest.observe(self.bindings.clock_gettime_nanos(clock_id))
    }
}
