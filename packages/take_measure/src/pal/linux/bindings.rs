use std::fmt::Debug;
use std::mem;
#[cfg(test)]
use std::sync::Arc;

use crate::NANOS_PER_SECOND;

/// Bindings for FFI calls into the operating system.
///
/// All Linux clock FFI calls go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    /// Reads the given clock, returning `None` if the kernel rejects the clock ID.
    fn clock_gettime_nanos(&self, clock_id: libc::clockid_t) -> Option<u64>;
}

/// FFI bindings that target the real operating system that the build is targeting.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    #[expect(
        clippy::cast_sign_loss,
        reason = "the kernel never returns negative timestamps for monotonic clocks"
    )]
    fn clock_gettime_nanos(&self, clock_id: libc::clockid_t) -> Option<u64> {
        // SAFETY: All-zero is a valid initial value for this type.
        let mut ts: libc::timespec = unsafe { mem::zeroed() };

        // SAFETY: We are passing valid arguments, no other safety requirements.
        let result = unsafe { libc::clock_gettime(clock_id, &raw mut ts) };

        if result != 0 {
            return None;
        }

        Some(
            (ts.tv_sec as u64)
                .saturating_mul(NANOS_PER_SECOND)
                .saturating_add(ts.tv_nsec as u64),
        )
    }
}

#[derive(Clone)]
pub(crate) enum BindingsFacade {
    Real(&'static BuildTargetBindings),

    #[cfg(test)]
    Mock(Arc<MockBindings>),
}

impl BindingsFacade {
    pub(crate) const fn real() -> Self {
        Self::Real(&BuildTargetBindings)
    }
}

impl Bindings for BindingsFacade {
    #[inline]
    fn clock_gettime_nanos(&self, clock_id: libc::clockid_t) -> Option<u64> {
        match self {
            Self::Real(bindings) => bindings.clock_gettime_nanos(clock_id),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.clock_gettime_nanos(clock_id),
        }
    }
}

#[cfg(test)]
impl From<MockBindings> for BindingsFacade {
    fn from(bindings: MockBindings) -> Self {
        Self::Mock(Arc::new(bindings))
    }
}

impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(bindings) => bindings.fmt(f),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.fmt(f),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn real_bindings_read_monotonic_clock() {
        let bindings = BindingsFacade::real();

        let first = bindings.clock_gettime_nanos(libc::CLOCK_MONOTONIC).unwrap();
        let second = bindings.clock_gettime_nanos(libc::CLOCK_MONOTONIC).unwrap();

        assert!(second >= first);
    }

    #[test]
    fn real_bindings_reject_invalid_clock() {
        let bindings = BindingsFacade::real();

        assert_eq!(bindings.clock_gettime_nanos(-12345), None);
    }
}
