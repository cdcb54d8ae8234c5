//! Counters collect the progress of a run for reporting.
//!
//! A [`Counter`] aggregates a series of numeric updates under a fixed
//! [`AggregationKind`]. Counters are created lazily and uniquely by name
//! through a [`CounterFactory`]; the factory is the one component of this
//! core built for concurrent access, because a parallelized executor updates
//! counters from many per-element contexts at once. The single-threaded
//! reference runner pays the same locking cost for forward compatibility.
//!
//! Counter updates themselves take no lock: the running total is an atomic
//! with a compare-exchange fast path, falling back to a wide overflow cell
//! when the bounded total would wrap. The fallback never drops or
//! double-counts the triggering delta.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Counters that represent user aggregators have names starting with this.
pub const USER_COUNTER_PREFIX: &str = "user-";

/// How a counter folds its updates together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregationKind {
    Sum,
    /// Arithmetic mean of all updates.
    Mean,
    // Reserved kinds. Declared for wire parity; no counter implements them.
    Max,
    Min,
    And,
    Or,
}

impl AggregationKind {
    fn is_supported(self) -> bool {
        matches!(self, AggregationKind::Sum | AggregationKind::Mean)
    }

    pub fn name(self) -> &'static str {
        match self {
            AggregationKind::Sum => "SUM",
            AggregationKind::Mean => "MEAN",
            AggregationKind::Max => "MAX",
            AggregationKind::Min => "MIN",
            AggregationKind::And => "AND",
            AggregationKind::Or => "OR",
        }
    }
}

/// The reported value of a counter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CounterValue {
    Int(i128),
    Float(f64),
}

impl CounterValue {
    pub fn as_i128(self) -> Option<i128> {
        match self {
            CounterValue::Int(n) => Some(n),
            CounterValue::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            CounterValue::Int(n) => n as f64,
            CounterValue::Float(x) => x,
        }
    }
}

/// A named running aggregation.
///
/// Do not create directly for reporting; call
/// [`CounterFactory::get_counter`] so names stay unique.
#[derive(Debug)]
pub struct Counter {
    name: String,
    kind: AggregationKind,
    user: bool,
    fast_total: AtomicI64,
    overflow_total: Mutex<i128>,
    elements: AtomicU64,
}

impl Counter {
    fn new(name: String, kind: AggregationKind, user: bool) -> Self {
        // The optimized update path does not handle the reserved kinds.
        assert!(
            kind.is_supported(),
            "aggregation kind {} is not implemented",
            kind.name()
        );
        Self {
            name,
            kind,
            user,
            fast_total: AtomicI64::new(0),
            overflow_total: Mutex::new(0),
            elements: AtomicU64::new(0),
        }
    }

    /// An unregistered scratch counter that sums. Its name only matters for
    /// diagnostics, so one is generated from the hint.
    pub fn internal(name_hint: &str) -> Self {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        Self::new(
            format!("internal-{name_hint}-{seq:x}"),
            AggregationKind::Sum,
            false,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AggregationKind {
        self.kind
    }

    /// Whether this counter reports a user aggregator.
    pub fn is_user_counter(&self) -> bool {
        self.user
    }

    /// Add `delta` to the running total and bump the element count.
    ///
    /// The fast path is a lock-free checked add on the bounded total; if that
    /// would overflow, the delta lands in the wide overflow cell instead.
    pub fn update(&self, delta: i64) {
        let mut current = self.fast_total.load(Ordering::Relaxed);
        loop {
            match current.checked_add(delta) {
                Some(next) => {
                    match self.fast_total.compare_exchange_weak(
                        current,
                        next,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => break,
                        Err(seen) => current = seen,
                    }
                }
                None => {
                    *self.overflow_total.lock().unwrap() += i128::from(delta);
                    break;
                }
            }
        }
        self.elements.fetch_add(1, Ordering::Relaxed);
    }

    /// The exact total across both accumulation paths.
    pub fn total(&self) -> i128 {
        i128::from(self.fast_total.load(Ordering::Relaxed)) + *self.overflow_total.lock().unwrap()
    }

    /// The number of updates applied.
    pub fn elements(&self) -> u64 {
        self.elements.load(Ordering::Relaxed)
    }

    /// The aggregated value: the total for SUM, total divided by element
    /// count for MEAN.
    ///
    /// # Panics
    ///
    /// A MEAN counter with no updates has no value; callers must guard.
    pub fn value(&self) -> CounterValue {
        match self.kind {
            AggregationKind::Sum => CounterValue::Int(self.total()),
            AggregationKind::Mean => {
                let elements = self.elements();
                assert!(elements > 0, "mean counter {} has no updates", self.name);
                CounterValue::Float(self.total() as f64 / elements as f64)
            }
            // Ruled out at construction.
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {} {}/{}>",
            self.name,
            self.kind.name(),
            self.total(),
            self.elements()
        )
    }
}

/// A user-declared named aggregation, reported per pipeline step through the
/// counter subsystem.
#[derive(Clone, Debug)]
pub struct Aggregator {
    pub name: String,
    pub kind: AggregationKind,
}

impl Aggregator {
    pub fn new(name: impl Into<String>, kind: AggregationKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Keeps track of unique counters.
#[derive(Default, Debug)]
pub struct CounterFactory {
    counters: Mutex<HashMap<String, Arc<Counter>>>,
}

impl CounterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the counter with the requested name, creating it on first call.
    ///
    /// # Panics
    ///
    /// Requesting an existing name with a different kind is a programming
    /// error.
    pub fn get_counter(&self, name: &str, kind: AggregationKind) -> Arc<Counter> {
        let mut counters = self.counters.lock().unwrap();
        if let Some(counter) = counters.get(name) {
            assert_eq!(
                counter.kind(),
                kind,
                "counter {name} already registered with kind {}",
                counter.kind().name()
            );
            return Arc::clone(counter);
        }
        let counter = Arc::new(Counter::new(name.to_string(), kind, false));
        counters.insert(name.to_string(), Arc::clone(&counter));
        counter
    }

    /// Return the counter for this step's aggregator, named
    /// `user-<step>-<aggregator>`. Idempotent like [`get_counter`](Self::get_counter).
    pub fn get_aggregator_counter(&self, step_name: &str, aggregator: &Aggregator) -> Arc<Counter> {
        let name = format!("{USER_COUNTER_PREFIX}{step_name}-{}", aggregator.name);
        let mut counters = self.counters.lock().unwrap();
        if let Some(counter) = counters.get(&name) {
            assert!(
                counter.is_user_counter(),
                "counter {name} already registered as a non-aggregator counter"
            );
            assert_eq!(
                counter.kind(),
                aggregator.kind,
                "aggregator counter {name} already registered with kind {}",
                counter.kind().name()
            );
            return Arc::clone(counter);
        }
        let counter = Arc::new(Counter::new(name.clone(), aggregator.kind, true));
        counters.insert(name, Arc::clone(&counter));
        counter
    }

    /// Snapshot of all registered counters. Registration that happens after
    /// this returns is not reflected, so iteration never races creation.
    pub fn get_counters(&self) -> Vec<Arc<Counter>> {
        self.counters.lock().unwrap().values().cloned().collect()
    }

    /// Map of step name to value for every counter reporting the named
    /// aggregator, i.e. every counter named `user-<step>-<aggregator>`.
    pub fn get_aggregator_values(&self, aggregator_name: &str) -> HashMap<String, CounterValue> {
        let counters = self.counters.lock().unwrap();
        let suffix = format!("-{aggregator_name}");
        counters
            .iter()
            .filter(|(name, _)| name.starts_with(USER_COUNTER_PREFIX) && name.ends_with(&suffix))
            .map(|(name, counter)| {
                let step = &name[USER_COUNTER_PREFIX.len()..name.len() - suffix.len()];
                (step.to_string(), counter.value())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_counters_get_unique_names() {
        let a = Counter::internal("scratch");
        let b = Counter::internal("scratch");
        assert_ne!(a.name(), b.name());
        a.update(3);
        a.update(4);
        assert_eq!(a.value(), CounterValue::Int(7));
    }

    #[test]
    fn display_shows_total_and_elements() {
        let c = Counter::internal("fmt");
        c.update(5);
        let s = format!("{c}");
        assert!(s.contains("SUM"));
        assert!(s.ends_with("5/1>"));
    }
}
