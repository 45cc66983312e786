//! Platform abstraction layer for clocks and process resource counters.
//!
//! Every operating system call the package makes goes through the [`Platform`] trait, so that
//! the measurement logic can be exercised in tests against a [`FakePlatform`] with scripted
//! readings instead of whatever the machine running the tests happens to report.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
#[cfg(any(target_os = "linux", target_os = "macos"))]
mod high_water;
#[cfg(not(windows))]
mod std_clock;

#[cfg(unix)]
mod unix;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub(crate) use linux::*;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub(crate) use macos::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::*;

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
mod fallback;
#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
pub(crate) use fallback::*;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
