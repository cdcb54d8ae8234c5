//! Mean and count combiners.

use super::CombineFn;
use std::marker::PhantomData;

/// Arithmetic mean of numeric inputs.
///
/// - Accumulator: `(sum, count)`
/// - Output: `f64`; NaN when no values were added. Never errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanCombineFn;

impl CombineFn<f64, (f64, u64), f64> for MeanCombineFn {
    fn create_accumulator(&self) -> (f64, u64) {
        (0.0, 0)
    }

    fn add_input(&self, acc: &mut (f64, u64), value: f64) {
        acc.0 += value;
        acc.1 += 1;
    }

    fn merge_accumulators(&self, accumulators: Vec<(f64, u64)>) -> (f64, u64) {
        let mut merged = (0.0, 0);
        for (sum, count) in accumulators {
            merged.0 += sum;
            merged.1 += count;
        }
        merged
    }

    fn extract_output(&self, (sum, count): (f64, u64)) -> f64 {
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }
}

/// Size of the input, whatever its element type.
///
/// - Accumulator: `u64`
/// - Output: `u64`
///
/// `add_inputs` folds a whole batch in constant time.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountCombineFn<V>(PhantomData<V>);

impl<V> CountCombineFn<V> {
    /// Convenience constructor (same as `Default`).
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V: Send + Sync> CombineFn<V, u64, u64> for CountCombineFn<V> {
    fn create_accumulator(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _value: V) {
        *acc += 1;
    }

    fn add_inputs(&self, acc: &mut u64, values: Vec<V>) {
        *acc += values.len() as u64;
    }

    fn merge_accumulators(&self, accumulators: Vec<u64>) -> u64 {
        accumulators.into_iter().sum()
    }

    fn extract_output(&self, acc: u64) -> u64 {
        acc
    }
}
