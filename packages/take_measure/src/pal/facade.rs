//! Platform facade for switching between real and fake implementations.

use crate::Snapshot;
#[cfg(test)]
use crate::pal::FakePlatform;
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform};

/// Dispatches to either the platform the build targets or, in tests, a fake platform.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(&'static BuildTargetPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn fake(fake_platform: FakePlatform) -> Self {
        Self::Fake(fake_platform)
    }
}

impl Platform for PlatformFacade {
    #[inline]
    fn uptime_nanos(&self) -> u64 {
        match self {
            Self::Real(platform) => platform.uptime_nanos(),
            #[cfg(test)]
            Self::Fake(platform) => platform.uptime_nanos(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        match self {
            Self::Real(platform) => platform.snapshot(),
            #[cfg(test)]
            Self::Fake(platform) => platform.snapshot(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn fake_facade_forwards_clock() {
        let fake_platform = FakePlatform::new();
        fake_platform.set_uptime_nanos(1_234);

        let facade = PlatformFacade::fake(fake_platform);
        assert_eq!(facade.uptime_nanos(), 1_234);
    }

    #[test]
    fn fake_facade_forwards_snapshot() {
        let fake_platform = FakePlatform::new();
        fake_platform.set_snapshot(Snapshot {
            user_time_nanos: 77,
            ..Snapshot::default()
        });

        let facade = PlatformFacade::fake(fake_platform);
        assert_eq!(facade.snapshot().user_time_nanos(), 77);
    }

    #[test]
    fn real_facade_clock_does_not_go_backwards() {
        let facade = PlatformFacade::real();

        let first = facade.uptime_nanos();
        let second = facade.uptime_nanos();

        assert!(second >= first);
    }
}
