//! Named timestamps relative to process start.

use std::collections::HashMap;
use std::fmt::Write;
use std::num::NonZero;
use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::NANOS_PER_SECOND;
use crate::pal::{Platform, PlatformFacade};

const REPORT_HEADER: &str = "Detailed Boot Time Report:";
const INIT_EVENT: &str = "monitor_init";

static PROCESS_START: OnceLock<u64> = OnceLock::new();

static GLOBAL: LazyLock<TimestampLedger> = LazyLock::new(TimestampLedger::new);

/// Supplies the process start reference used by ledgers created with [`TimestampLedger::new()`]
/// and by [`TimestampLedger::global()`].
///
/// `nanos` must be a reading of [`uptime_nanos()`](crate::uptime_nanos), typically taken by the
/// host as early as possible during process startup.
///
/// Returns `false` if the reference was already established, either by an earlier call or
/// because a ledger has already been created with the default reference. In that case the
/// existing reference is kept.
pub fn set_process_start(nanos: u64) -> bool {
    PROCESS_START.set(nanos).is_ok()
}

fn process_start(platform: &PlatformFacade) -> u64 {
    *PROCESS_START.get_or_init(|| platform.uptime_nanos())
}

/// A concurrency-safe record of when named events happened.
///
/// Each event name maps to the [`uptime_nanos()`](crate::uptime_nanos) reading at which it was
/// last marked. Marking an event again overwrites the earlier timestamp. Elapsed times are
/// reported relative to a start reference fixed when the ledger is created.
///
/// All operations are serialized through one lock. Callers that must never wait on that lock
/// can use [`mark_timestamp_nonblocking()`](Self::mark_timestamp_nonblocking), which queues the
/// mark when the lock is busy. Queued marks become visible before the next operation that takes
/// the lock.
///
/// # Examples
///
/// ```
/// use take_measure::TimestampLedger;
///
/// let ledger = TimestampLedger::with_start_time(take_measure::uptime_nanos());
///
/// ledger.mark_timestamp("database_connected");
/// ledger.mark_timestamp("cache_warmed");
///
/// assert!(ledger.timestamp("database_connected").is_some());
/// println!("{}", ledger.generate_report());
/// ```
#[derive(Debug)]
pub struct TimestampLedger {
    start_nanos: u64,
    state: Mutex<LedgerState>,
    backlog_tx: Sender<PendingMark>,
    platform: PlatformFacade,
}

#[derive(Debug)]
struct LedgerState {
    events: HashMap<String, u64>,
    backlog: Receiver<PendingMark>,
}

#[derive(Debug)]
struct PendingMark {
    event: String,
    nanos: u64,
}

impl LedgerState {
    fn apply_backlog(&mut self) {
        while let Ok(mark) = self.backlog.try_recv() {
            self.events.insert(mark.event, mark.nanos);
        }
    }
}

impl TimestampLedger {
    /// Creates a ledger whose start reference is the process start.
    ///
    /// The process start is the value given to [`set_process_start()`] if the host called it
    /// before the first ledger was created, otherwise the clock reading at that moment.
    #[must_use]
    pub fn new() -> Self {
        let platform = PlatformFacade::real();
        let start_nanos = process_start(&platform);

        Self::with_platform(start_nanos, platform)
    }

    /// Creates a ledger with an explicit start reference, in
    /// [`uptime_nanos()`](crate::uptime_nanos) units.
    #[must_use]
    pub fn with_start_time(start_nanos: u64) -> Self {
        Self::with_platform(start_nanos, PlatformFacade::real())
    }

    pub(crate) fn with_platform(start_nanos: u64, platform: PlatformFacade) -> Self {
        let (backlog_tx, backlog) = mpsc::channel();

        let ledger = Self {
            start_nanos,
            state: Mutex::new(LedgerState {
                events: HashMap::new(),
                backlog,
            }),
            backlog_tx,
            platform,
        };

        ledger.mark_timestamp(INIT_EVENT);
        debug!(start_nanos, "timestamp ledger enabled");

        ledger
    }

    /// The process-wide ledger, created on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Marks `event` on the [process-wide ledger](Self::global) without waiting for its lock.
    ///
    /// Intended for very early startup code.
    pub fn mark_early_timestamp(event: impl Into<String>) {
        Self::global().mark_timestamp_nonblocking(event);
    }

    /// The start reference elapsed times are relative to.
    #[must_use]
    pub fn start_nanos(&self) -> u64 {
        self.start_nanos
    }

    /// Records that `event` happened now.
    pub fn mark_timestamp(&self, event: impl Into<String>) {
        let nanos = self.platform.uptime_nanos();
        self.mark_timestamp_at(event, nanos);
    }

    /// Records that `event` happened at `nanos`, in [`uptime_nanos()`](crate::uptime_nanos)
    /// units.
    pub fn mark_timestamp_at(&self, event: impl Into<String>, nanos: u64) {
        let event = event.into();
        self.log_mark(&event, nanos);

        self.lock_state().events.insert(event, nanos);
    }

    /// Records that `event` happened now, without waiting if another thread holds the lock.
    ///
    /// The timestamp is taken immediately. If the lock is busy, the mark is queued and applied
    /// before the next operation that takes the lock. A queued mark is never lost.
    pub fn mark_timestamp_nonblocking(&self, event: impl Into<String>) {
        let nanos = self.platform.uptime_nanos();
        let event = event.into();
        self.log_mark(&event, nanos);

        if let Some(mut state) = self.state.try_lock() {
            state.apply_backlog();
            state.events.insert(event, nanos);
            return;
        }

        // `self` owns the receiver, so sending only fails if that invariant is ever broken.
        if let Err(SendError(mark)) = self.backlog_tx.send(PendingMark { event, nanos }) {
            self.lock_state().events.insert(mark.event, mark.nanos);
        }
    }

    /// The timestamp at which `event` was last marked.
    #[must_use]
    pub fn timestamp(&self, event: &str) -> Option<u64> {
        self.lock_state().events.get(event).copied()
    }

    /// Time elapsed between the start reference and the last mark of `event`.
    #[must_use]
    pub fn elapsed_since_start(&self, event: &str) -> Option<Duration> {
        self.timestamp(event)
            .map(|nanos| Duration::from_nanos(nanos.saturating_sub(self.start_nanos)))
    }

    /// Number of distinct events recorded, including the initial `monitor_init`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().events.len()
    }

    /// Whether no events are recorded. Always `false` in practice due to `monitor_init`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().events.is_empty()
    }

    /// Renders every event with its time since the start reference, in chronological order.
    ///
    /// ```text
    /// Detailed Boot Time Report:
    /// [monitor_init] +0.000012s
    /// [config_loaded] +0.153201s
    /// ```
    ///
    /// Events marked at the same instant are ordered by name. Events marked before the start
    /// reference are shown as `+0.000000s`.
    #[must_use]
    pub fn generate_report(&self) -> String {
        let mut events: Vec<(String, u64)> = self
            .lock_state()
            .events
            .iter()
            .map(|(event, &nanos)| (event.clone(), nanos))
            .collect();

        events.sort_by(|(a_event, a_nanos), (b_event, b_nanos)| {
            a_nanos.cmp(b_nanos).then_with(|| a_event.cmp(b_event))
        });

        let mut report = String::from(REPORT_HEADER);
        report.push('\n');

        for (event, nanos) in events {
            let elapsed = nanos_as_seconds(nanos.saturating_sub(self.start_nanos));

            // Writing to a String cannot fail.
            _ = writeln!(report, "[{event}] +{elapsed:.6}s");
        }

        report
    }

    /// Marks `application_did_finish_launching`.
    pub fn application_did_finish_launching(&self) {
        self.mark_timestamp("application_did_finish_launching");
    }

    /// Marks `application_did_become_active`.
    pub fn application_did_become_active(&self) {
        self.mark_timestamp("application_did_become_active");
    }

    /// Logs the duration of a measurement taken by the caller and returns it.
    ///
    /// `start` and `end` are [`uptime_nanos()`](crate::uptime_nanos) readings. If `end` is
    /// `None`, the current time is used. A negative duration is clamped to zero.
    ///
    /// If `track_since_startup` is set, the completion is also marked as `"{name}.startup"`.
    pub fn record_precise_measurement(
        &self,
        name: &str,
        start: u64,
        end: Option<u64>,
        track_since_startup: bool,
    ) -> Duration {
        let end = end.unwrap_or_else(|| self.platform.uptime_nanos());
        let duration = Duration::from_nanos(end.saturating_sub(start));

        debug!(
            measurement = name,
            seconds = format_args!("{:.9}", duration.as_secs_f64()),
            "precise measurement"
        );

        if track_since_startup {
            self.mark_timestamp_at(format!("{name}.startup"), end);
        }

        duration
    }

    /// Logs the time elapsed since `start`, an [`uptime_nanos()`](crate::uptime_nanos) reading,
    /// and returns it.
    pub fn record_metric(&self, name: &str, start: u64) -> Duration {
        let duration = Duration::from_nanos(self.platform.uptime_nanos().saturating_sub(start));

        debug!(
            metric = name,
            seconds = format_args!("{:.6}", duration.as_secs_f64()),
            "recorded metric"
        );

        duration
    }

    /// Runs `body` `iterations` times and returns the mean time per run.
    pub fn measure_average_execution_time(
        &self,
        name: &str,
        iterations: NonZero<u32>,
        mut body: impl FnMut(),
    ) -> Duration {
        let start = self.platform.uptime_nanos();

        for _ in 0..iterations.get() {
            body();
        }

        let total = Duration::from_nanos(self.platform.uptime_nanos().saturating_sub(start));
        let average = total.checked_div(iterations.get()).unwrap_or(total);

        debug!(
            measurement = name,
            iterations = iterations.get(),
            average_seconds = format_args!("{:.9}", average.as_secs_f64()),
            "average execution time"
        );

        average
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        let mut state = self.state.lock();
        state.apply_backlog();
        state
    }

    fn log_mark(&self, event: &str, nanos: u64) {
        debug!(
            event,
            since_start = format_args!(
                "+{:.6}s",
                nanos_as_seconds(nanos.saturating_sub(self.start_nanos))
            ),
            "timestamp marked"
        );
    }
}

impl Default for TimestampLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "sub-microsecond precision loss after 104 days of uptime is acceptable"
)]
fn nanos_as_seconds(nanos: u64) -> f64 {
    nanos as f64 / NANOS_PER_SECOND as f64
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::pal::FakePlatform;

    assert_impl_all!(TimestampLedger: Send, Sync);

    fn fake_ledger(start_nanos: u64) -> (TimestampLedger, FakePlatform) {
        let platform = FakePlatform::new();
        platform.set_uptime_nanos(start_nanos);

        let ledger =
            TimestampLedger::with_platform(start_nanos, PlatformFacade::fake(platform.clone()));

        (ledger, platform)
    }

    #[test]
    fn records_init_event() {
        let (ledger, _platform) = fake_ledger(1_000);

        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_empty());
        assert_eq!(ledger.timestamp("monitor_init"), Some(1_000));
    }

    #[test]
    fn later_mark_overwrites() {
        let (ledger, platform) = fake_ledger(0);

        platform.set_uptime_nanos(10);
        ledger.mark_timestamp("a");
        platform.set_uptime_nanos(20);
        ledger.mark_timestamp("a");

        assert_eq!(ledger.timestamp("a"), Some(20));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn unknown_event_has_no_timestamp() {
        let (ledger, _platform) = fake_ledger(0);

        assert_eq!(ledger.timestamp("never"), None);
        assert_eq!(ledger.elapsed_since_start("never"), None);
    }

    #[test]
    fn report_is_chronological() {
        let (ledger, _platform) = fake_ledger(1_000_000_000);

        ledger.mark_timestamp_at("third", 4_000_000_000);
        ledger.mark_timestamp_at("first", 1_500_000_000);
        ledger.mark_timestamp_at("second", 2_250_000_000);

        assert_eq!(
            ledger.generate_report(),
            "Detailed Boot Time Report:\n\
             [monitor_init] +0.000000s\n\
             [first] +0.500000s\n\
             [second] +1.250000s\n\
             [third] +3.000000s\n"
        );
    }

    #[test]
    fn report_breaks_ties_by_name() {
        let (ledger, _platform) = fake_ledger(0);

        ledger.mark_timestamp_at("b", 5);
        ledger.mark_timestamp_at("a", 5);

        let report = ledger.generate_report();
        assert!(report.find("[a]").unwrap() < report.find("[b]").unwrap());
    }

    #[test]
    fn events_before_start_report_zero() {
        let (ledger, _platform) = fake_ledger(1_000);

        ledger.mark_timestamp_at("early", 10);

        assert!(ledger.generate_report().contains("[early] +0.000000s"));
        assert_eq!(ledger.elapsed_since_start("early"), Some(Duration::ZERO));
    }

    #[test]
    fn nonblocking_mark_applies_immediately_when_uncontended() {
        let (ledger, platform) = fake_ledger(0);
        platform.set_uptime_nanos(77);

        ledger.mark_timestamp_nonblocking("fast");

        assert_eq!(ledger.timestamp("fast"), Some(77));
    }

    #[test]
    fn nonblocking_mark_is_queued_when_contended() {
        let (ledger, platform) = fake_ledger(0);
        platform.set_uptime_nanos(88);

        {
            let _held = ledger.state.lock();
            ledger.mark_timestamp_nonblocking("queued");
        }

        // Applied by the next operation that takes the lock.
        assert_eq!(ledger.timestamp("queued"), Some(88));
    }

    #[test]
    fn precise_measurement_marks_startup() {
        let (ledger, _platform) = fake_ledger(0);

        let duration = ledger.record_precise_measurement("load", 100, Some(2_100), true);

        assert_eq!(duration, Duration::from_nanos(2_000));
        assert_eq!(ledger.timestamp("load.startup"), Some(2_100));
    }

    #[test]
    fn precise_measurement_without_tracking() {
        let (ledger, platform) = fake_ledger(0);
        platform.set_uptime_nanos(500);

        let duration = ledger.record_precise_measurement("load", 200, None, false);

        assert_eq!(duration, Duration::from_nanos(300));
        assert_eq!(ledger.timestamp("load.startup"), None);
    }

    #[test]
    fn precise_measurement_clamps_negative() {
        let (ledger, _platform) = fake_ledger(0);

        let duration = ledger.record_precise_measurement("backwards", 500, Some(100), false);

        assert_eq!(duration, Duration::ZERO);
    }

    #[test]
    fn record_metric_measures_from_start() {
        let (ledger, platform) = fake_ledger(0);
        platform.set_uptime_nanos(3_000);

        assert_eq!(ledger.record_metric("init", 1_000), Duration::from_nanos(2_000));
    }

    #[test]
    fn average_execution_time() {
        let (ledger, platform) = fake_ledger(0);
        let mut calls = 0_u64;

        let average = ledger.measure_average_execution_time("step", nz!(4), || {
            calls += 1;
            platform.set_uptime_nanos(calls * 250);
        });

        assert_eq!(calls, 4);
        assert_eq!(average, Duration::from_nanos(250));
    }

    #[test]
    fn lifecycle_marks() {
        let (ledger, platform) = fake_ledger(0);

        platform.set_uptime_nanos(10);
        ledger.application_did_finish_launching();
        platform.set_uptime_nanos(20);
        ledger.application_did_become_active();

        assert_eq!(ledger.timestamp("application_did_finish_launching"), Some(10));
        assert_eq!(ledger.timestamp("application_did_become_active"), Some(20));
    }

    #[test]
    fn concurrent_marks_are_all_recorded() {
        let ledger = Arc::new(TimestampLedger::with_start_time(0));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..100 {
                        if i % 2 == 0 {
                            ledger.mark_timestamp(format!("t{t}_{i}"));
                        } else {
                            ledger.mark_timestamp_nonblocking(format!("t{t}_{i}"));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len(), 401);
    }

    #[test]
    fn global_ledger_has_init_event() {
        TimestampLedger::mark_early_timestamp("global_test_event");

        let global = TimestampLedger::global();
        assert!(global.timestamp("monitor_init").is_some());
        assert!(global.timestamp("global_test_event").is_some());
    }

    #[test]
    fn process_start_is_set_once() {
        let platform = PlatformFacade::real();
        let start = process_start(&platform);

        assert!(!set_process_start(start + 1));
        assert_eq!(process_start(&platform), start);
    }
}
