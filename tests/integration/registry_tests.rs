//! View registration and the fixed vocabulary.

use std::collections::HashSet;

use dbcensus::stats::{
    Aggregation, BYTES_BOUNDARIES, BucketKind, InMemoryStats, MILLISECONDS_BOUNDARIES, Registry,
    View, define_tag_keys, distribution_boundaries, register_all_views,
};
use dbcensus::testing::FailingRecorder;
use dbcensus::{ErrorKind, InstrumentationConfig};

#[test]
fn test_registers_five_distinct_views_over_all_tag_keys() {
    let registry = Registry::new(&InstrumentationConfig::default()).unwrap();
    let stats = InMemoryStats::new();
    registry.register_all_views(&stats).unwrap();

    let views = stats.registered_views();
    assert_eq!(views.len(), 5);

    let names: HashSet<&str> = views.iter().map(|v| v.name()).collect();
    assert_eq!(names.len(), 5);

    let all_keys = define_tag_keys().all();
    for view in &views {
        assert_eq!(view.columns(), all_keys.as_slice());
        assert_eq!(view.name(), view.measure().name());
    }

    let measures = registry.measures();
    let by_measure = |name: &str| views.iter().find(|v| v.measure().name() == name).unwrap();
    assert_eq!(
        by_measure(measures.latency_ms.name()).aggregation(),
        &Aggregation::distribution(BucketKind::Milliseconds)
    );
    assert_eq!(by_measure(measures.calls.name()).aggregation(), &Aggregation::Count);
    assert_eq!(by_measure(measures.errors.name()).aggregation(), &Aggregation::Count);
    assert_eq!(
        by_measure(measures.key_length.name()).aggregation(),
        &Aggregation::distribution(BucketKind::Bytes)
    );
    assert_eq!(
        by_measure(measures.value_length.name()).aggregation(),
        &Aggregation::distribution(BucketKind::Bytes)
    );
}

#[test]
fn test_identical_reregistration_is_tolerated() {
    let registry = Registry::default();
    let stats = InMemoryStats::new();
    registry.register_all_views(&stats).unwrap();
    registry.register_all_views(&stats).unwrap();
    assert_eq!(stats.registered_views().len(), 5);
}

#[test]
fn test_conflicting_registry_is_rejected_as_fatal() {
    let stats = InMemoryStats::new();
    Registry::default().register_all_views(&stats).unwrap();

    let registry = Registry::default();
    let original = &registry.views()[0];
    let other = View::new(
        original.name().to_string(),
        "a different description",
        original.measure().clone(),
        original.aggregation().clone(),
        original.columns().to_vec(),
    );

    let err = register_all_views(&stats, &[other]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateView);
    assert!(err.is_fatal());
}

#[test]
fn test_backend_rejection_surfaces_at_registration() {
    let err = Registry::default().register_all_views(&FailingRecorder::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
}

#[test]
fn test_bucket_boundaries_are_the_published_constants() {
    assert_eq!(BYTES_BOUNDARIES, [
        0.0,
        1024.0,
        2048.0,
        4096.0,
        16384.0,
        65536.0,
        262144.0,
        1048576.0,
        4194304.0,
        16777216.0,
        67108864.0,
        268435456.0,
        1073741824.0,
        2147483648.0,
        4294967296.0,
    ]);
    assert_eq!(MILLISECONDS_BOUNDARIES, [
        0.0, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 1.5, 2.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0,
        200.0, 400.0, 600.0, 800.0, 1000.0, 1500.0, 2000.0, 2500.0, 5000.0, 10000.0, 20000.0,
        40000.0, 100000.0, 200000.0, 500000.0,
    ]);
    assert_eq!(distribution_boundaries(BucketKind::Bytes), &BYTES_BOUNDARIES[..]);
    assert_eq!(distribution_boundaries(BucketKind::Milliseconds), &MILLISECONDS_BOUNDARIES[..]);
}

#[test]
fn test_custom_prefix_names_every_view() {
    let config = InstrumentationConfig::builder().metric_prefix("jdbc").build();
    let registry = Registry::new(&config).unwrap();
    assert!(registry.views().iter().all(|v| v.name().starts_with("jdbc/client/")));
}
