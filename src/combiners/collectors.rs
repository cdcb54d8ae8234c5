//! Combiners that condense a stream into a single collection.

use super::CombineFn;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

/// Condense the input into one list.
///
/// - Accumulator: `Vec<T>`, in arrival order.
/// - Output: `Vec<T>`. Order across merged partials is merge order, not a
///   global input order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToListCombineFn<T>(PhantomData<T>);

impl<T> ToListCombineFn<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Send + Sync> CombineFn<T, Vec<T>, Vec<T>> for ToListCombineFn<T> {
    fn create_accumulator(&self) -> Vec<T> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<T>, value: T) {
        acc.push(value);
    }

    fn merge_accumulators(&self, accumulators: Vec<Vec<T>>) -> Vec<T> {
        let mut merged = Vec::new();
        for acc in accumulators {
            merged.extend(acc);
        }
        merged
    }

    fn extract_output(&self, acc: Vec<T>) -> Vec<T> {
        acc
    }
}

/// Condense key/value pairs into one map.
///
/// Duplicate keys are lossy by design, not an error: within a partial the
/// last write wins, and across merged partials the later partial wins.
///
/// - Accumulator: `HashMap<K, V>`
/// - Output: `HashMap<K, V>`
#[derive(Clone, Copy, Debug, Default)]
pub struct ToDictCombineFn<K, V>(PhantomData<(K, V)>);

impl<K, V> ToDictCombineFn<K, V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K, V> CombineFn<(K, V), HashMap<K, V>, HashMap<K, V>> for ToDictCombineFn<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn create_accumulator(&self) -> HashMap<K, V> {
        HashMap::new()
    }

    fn add_input(&self, acc: &mut HashMap<K, V>, (key, value): (K, V)) {
        acc.insert(key, value);
    }

    fn merge_accumulators(&self, accumulators: Vec<HashMap<K, V>>) -> HashMap<K, V> {
        let mut merged = HashMap::new();
        for acc in accumulators {
            merged.extend(acc);
        }
        merged
    }

    fn extract_output(&self, acc: HashMap<K, V>) -> HashMap<K, V> {
        acc
    }
}
