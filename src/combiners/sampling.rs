//! Fixed-size uniform sampling without replacement.

use super::topk::TopCombineFn;
use super::CombineFn;
use ordered_float::OrderedFloat;

/// A uniform random sample of up to n elements.
///
/// Each element is paired with an independent uniform key, and the n elements
/// with the largest keys survive; extraction strips the keys again. Because
/// the keys are drawn independently per element, the selection is
/// (approximately) uniform and independent of input order, and merging
/// partial reservoirs is just merging their keyed top-n sets. Most of the
/// work is delegated to a [`TopCombineFn`] over the keyed pairs; sampling is
/// not really a kind of Top operation, so the helper is an internal field
/// rather than a supertype.
pub struct SampleCombineFn<T> {
    top: TopCombineFn<(OrderedFloat<f64>, T)>,
}

impl<T> SampleCombineFn<T> {
    pub fn new(n: usize) -> Self {
        Self {
            top: TopCombineFn::new(n, |a: &(OrderedFloat<f64>, T), b| a.0 < b.0),
        }
    }
}

impl<T> Clone for SampleCombineFn<T> {
    fn clone(&self) -> Self {
        Self {
            top: self.top.clone(),
        }
    }
}

impl<T: Send + Sync> CombineFn<T, Vec<(OrderedFloat<f64>, T)>, Vec<T>> for SampleCombineFn<T> {
    fn create_accumulator(&self) -> Vec<(OrderedFloat<f64>, T)> {
        self.top.create_accumulator()
    }

    fn add_input(&self, acc: &mut Vec<(OrderedFloat<f64>, T)>, value: T) {
        self.top
            .add_input(acc, (OrderedFloat(rand::random::<f64>()), value));
    }

    fn merge_accumulators(
        &self,
        accumulators: Vec<Vec<(OrderedFloat<f64>, T)>>,
    ) -> Vec<(OrderedFloat<f64>, T)> {
        self.top.merge_accumulators(accumulators)
    }

    fn extract_output(&self, acc: Vec<(OrderedFloat<f64>, T)>) -> Vec<T> {
        self.top
            .extract_output(acc)
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }
}
