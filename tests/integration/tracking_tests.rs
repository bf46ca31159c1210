//! Tracking operation lifecycle through the public API.

use std::time::Duration;

use dbcensus::TrackingOperation;
use dbcensus::stats::AggregationData;
use dbcensus::trace::SpanStatus;

use crate::common::Harness;

#[test]
fn test_close_without_error_records_one_latency_sample() {
    let h = Harness::new().unwrap();

    let mut op = TrackingOperation::create(&h.instrumenter, "X.op", "op");
    op.close();

    let latency = h.latency();
    assert_eq!(latency.len(), 1);
    assert!(latency[0].value >= 0.0);
    assert_eq!(latency[0].tag("method"), Some("op"));
    assert!(h.errors().is_empty());
}

#[test]
fn test_recorded_exception_tags_reason_and_method() {
    let h = Harness::new().unwrap();

    let mut op = TrackingOperation::create(&h.instrumenter, "X.op", "op");
    op.record_exception("RuntimeException: boom");
    op.close();

    let errors = h.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].tag("reason"), Some("RuntimeException: boom"));
    assert_eq!(errors[0].tag("method"), Some("op"));

    let span = h.tracer.span("X.op").unwrap();
    assert_eq!(span.status, SpanStatus::Error("RuntimeException: boom".to_string()));
    assert_eq!(h.latency().len(), 1);
}

#[test]
fn test_repeated_close_has_single_effect() {
    let h = Harness::new().unwrap();

    let mut op = h.instrumenter.start("X.op", "op");
    op.close();
    op.close();
    op.close();
    drop(op);

    assert_eq!(h.latency().len(), 1);
    assert_eq!(h.calls().len(), 1);
    assert_eq!(h.tracer.span("X.op").unwrap().end_count, 1);
}

#[test]
fn test_latency_equals_clock_delta_in_milliseconds() {
    let h = Harness::new().unwrap();

    let mut op = h.instrumenter.start("X.op", "op");
    h.clock.advance(Duration::from_nanos(1_234_567));
    op.close();

    let latency = h.latency();
    assert!((latency[0].value - 1.234567).abs() < 1e-12);
}

#[test]
fn test_latency_lands_in_millisecond_buckets() {
    let h = Harness::new().unwrap();

    for micros in [500u64, 1_200, 30_000] {
        let mut op = h.instrumenter.start("X.op", "op");
        h.clock.advance(Duration::from_micros(micros));
        op.close();
    }

    let snapshot = h.stats.snapshot();
    let view = &snapshot.views["sql/client/latency"];
    assert_eq!(view.rows.len(), 1);
    let AggregationData::Distribution { count, bucket_counts, .. } = &view.rows[0].data else {
        unreachable!("latency view aggregates a distribution");
    };
    assert_eq!(*count, 3);
    // 0.5ms falls in [0.5, 1), 1.2ms in [1, 1.5), 30ms in [25, 50).
    assert_eq!(bucket_counts[7], 1);
    assert_eq!(bucket_counts[8], 1);
    assert_eq!(bucket_counts[14], 1);
}

#[test]
fn test_operations_on_many_threads() {
    let h = Harness::new().unwrap();

    std::thread::scope(|scope| {
        for t in 0..8 {
            let instrumenter = h.instrumenter.clone();
            scope.spawn(move || {
                for i in 0..25 {
                    let mut op = instrumenter.start("X.op", "op");
                    if (t + i) % 5 == 0 {
                        op.record_exception("transient");
                    }
                    op.close();
                }
            });
        }
    });

    assert_eq!(h.latency().len(), 200);
    assert_eq!(h.calls().len(), 200);
    assert_eq!(h.errors().len(), 40);
    assert_eq!(h.tracer.ended_count(), 200);
}
