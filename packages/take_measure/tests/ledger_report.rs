//! Integration tests for the timestamp ledger report.

use take_measure::TimestampLedger;

#[test]
fn remarked_event_keeps_single_latest_entry() {
    let ledger = TimestampLedger::with_start_time(0);

    ledger.mark_timestamp_at("a", 100);
    ledger.mark_timestamp_at("a", 300);

    assert_eq!(ledger.timestamp("a"), Some(300));
    assert_eq!(ledger.generate_report().matches("[a]").count(), 1);
}

#[test]
fn report_lists_events_in_timestamp_order_regardless_of_call_order() {
    let start = take_measure::uptime_nanos();
    let ledger = TimestampLedger::with_start_time(start);

    ledger.mark_timestamp_at("render", start + 3_000_000);
    ledger.mark_timestamp_at("parse", start + 1_000_000);
    ledger.mark_timestamp_at("layout", start + 2_000_000);

    let report = ledger.generate_report();
    let mut lines = report.lines();

    assert_eq!(lines.next(), Some("Detailed Boot Time Report:"));

    let events: Vec<&str> = lines
        .map(|line| {
            line.trim_start_matches('[')
                .split(']')
                .next()
                .unwrap_or_default()
        })
        .filter(|event| *event != "monitor_init")
        .collect();

    assert_eq!(events, vec!["parse", "layout", "render"]);
    assert!(report.contains("[parse] +0.001000s"));
    assert!(report.contains("[render] +0.003000s"));
}

#[test]
fn startup_measurement_appears_in_report() {
    let ledger = TimestampLedger::with_start_time(1_000);

    let duration = ledger.record_precise_measurement("warm_cache", 2_000, Some(501_000), true);

    assert_eq!(duration.as_nanos(), 499_000);
    assert!(ledger.generate_report().contains("[warm_cache.startup] +0.000500s"));
}
