use millrace::{AggregationKind, Aggregator, CounterFactory, CounterValue};
use std::sync::Arc;
use std::thread;

#[test]
fn get_counter_is_idempotent() {
    let factory = CounterFactory::new();
    let a = factory.get_counter("step-out-ElementCount", AggregationKind::Sum);
    let b = factory.get_counter("step-out-ElementCount", AggregationKind::Sum);
    assert!(Arc::ptr_eq(&a, &b));

    a.update(3);
    b.update(4);
    assert_eq!(a.value(), CounterValue::Int(7));
    assert_eq!(a.elements(), 2);
}

#[test]
#[should_panic(expected = "already registered with kind")]
fn conflicting_kind_is_a_programming_error() {
    let factory = CounterFactory::new();
    factory.get_counter("totals", AggregationKind::Sum);
    factory.get_counter("totals", AggregationKind::Mean);
}

#[test]
#[should_panic(expected = "is not implemented")]
fn reserved_kinds_are_rejected_at_construction() {
    let factory = CounterFactory::new();
    factory.get_counter("maxes", AggregationKind::Max);
}

#[test]
fn mean_counter_divides_total_by_elements() {
    let factory = CounterFactory::new();
    let mean = factory.get_counter("latency", AggregationKind::Mean);
    mean.update(2);
    mean.update(4);
    mean.update(6);
    assert_eq!(mean.value(), CounterValue::Float(4.0));
}

#[test]
#[should_panic(expected = "has no updates")]
fn mean_counter_with_no_updates_has_no_value() {
    let factory = CounterFactory::new();
    factory.get_counter("empty-mean", AggregationKind::Mean).value();
}

#[test]
fn overflow_never_loses_the_triggering_delta() {
    let factory = CounterFactory::new();
    let sum = factory.get_counter("big", AggregationKind::Sum);

    sum.update(i64::MAX);
    // This delta cannot land on the fast path; it must not be dropped.
    sum.update(1);
    sum.update(5);
    assert_eq!(sum.value(), CounterValue::Int(i128::from(i64::MAX) + 6));
    assert_eq!(sum.elements(), 3);

    // Deltas that fit keep using the fast path afterwards.
    sum.update(-6);
    assert_eq!(sum.value(), CounterValue::Int(i128::from(i64::MAX)));
}

#[test]
fn aggregator_counters_are_namespaced_per_step() {
    let factory = CounterFactory::new();
    let emitted = Aggregator::new("emitted", AggregationKind::Sum);

    let counter = factory.get_aggregator_counter("tokenize", &emitted);
    assert_eq!(counter.name(), "user-tokenize-emitted");
    assert!(counter.is_user_counter());
    assert!(Arc::ptr_eq(
        &counter,
        &factory.get_aggregator_counter("tokenize", &emitted)
    ));
}

#[test]
fn aggregator_values_map_step_to_value() {
    let factory = CounterFactory::new();
    let emitted = Aggregator::new("emitted", AggregationKind::Sum);
    let other = Aggregator::new("dropped", AggregationKind::Sum);

    factory.get_aggregator_counter("tokenize", &emitted).update(10);
    factory.get_aggregator_counter("format", &emitted).update(3);
    factory.get_aggregator_counter("tokenize", &other).update(99);
    // Non-user counters with a matching suffix must not leak in.
    factory
        .get_counter("tokenize-out-emitted", AggregationKind::Sum)
        .update(7);

    let values = factory.get_aggregator_values("emitted");
    assert_eq!(values.len(), 2);
    assert_eq!(values["tokenize"], CounterValue::Int(10));
    assert_eq!(values["format"], CounterValue::Int(3));
}

#[test]
fn get_counters_returns_a_snapshot() {
    let factory = CounterFactory::new();
    factory.get_counter("a", AggregationKind::Sum);
    let snapshot = factory.get_counters();
    factory.get_counter("b", AggregationKind::Sum);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(factory.get_counters().len(), 2);
}

#[test]
fn concurrent_updates_are_not_lost() {
    let factory = Arc::new(CounterFactory::new());
    let mut handles = Vec::new();
    for _ in 0..4 {
        let factory = Arc::clone(&factory);
        handles.push(thread::spawn(move || {
            let counter = factory.get_counter("hits", AggregationKind::Sum);
            for _ in 0..1000 {
                counter.update(1);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    let counter = factory.get_counter("hits", AggregationKind::Sum);
    assert_eq!(counter.value(), CounterValue::Int(4000));
    assert_eq!(counter.elements(), 4000);
}
