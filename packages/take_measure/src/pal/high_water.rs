use std::sync::atomic::{AtomicU64, Ordering};

/// The latest reading handed out by a clock, used to keep the clock non-decreasing.
///
/// A failed or regressed reading of the underlying clock is answered with the latest good
/// reading instead.
#[derive(Debug)]
pub(crate) struct HighWaterMark {
    latest: AtomicU64,
}

impl HighWaterMark {
    pub(crate) const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn observe(&self, reading: Option<u64>) -> u64 {
        match reading {
            Some(reading) => self.latest.fetch_max(reading, Ordering::Relaxed).max(reading),
            None => self.latest.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn passes_through_increasing_readings() {
        let mark = HighWaterMark::new();

        assert_eq!(mark.observe(Some(10)), 10);
        assert_eq!(mark.observe(Some(20)), 20);
    }

    #[test]
    fn failed_reading_repeats_latest() {
        let mark = HighWaterMark::new();

        mark.observe(Some(3_600_000_000_000));

        assert_eq!(mark.observe(None), 3_600_000_000_000);
    }

    #[test]
    fn regressed_reading_repeats_latest() {
        let mark = HighWaterMark::new();

        mark.observe(Some(500));

        assert_eq!(mark.observe(Some(295)), 500);
        assert_eq!(mark.observe(Some(501)), 501);
    }

    #[test]
    fn failure_before_any_reading_is_zero() {
        assert_eq!(HighWaterMark::new().observe(None), 0);
    }

    #[test]
    fn never_decreases_per_thread_under_contention() {
        let mark = Arc::new(HighWaterMark::new());

        let handles: Vec<_> = (0..4_u64)
            .map(|offset| {
                let mark = Arc::clone(&mark);

                thread::spawn(move || {
                    let mut previous = 0;

                    for i in 0..1000_u64 {
                        let reading = i.wrapping_mul(4).wrapping_add(offset);
                        let current = mark.observe((i % 7 == 0).then_some(reading));
                        assert!(current >= previous);
                        previous = current;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
