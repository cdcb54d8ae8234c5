//! Top-K combiner with a caller-supplied ordering.

use super::CombineFn;
use std::cmp::Ordering;
use std::sync::Arc;

type Compare<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// The n compare-most elements of the input.
///
/// `compare` is a strict "a < b"; the combiner keeps the n greatest elements
/// under it. Extra fixed arguments to the comparison are bound by closure
/// capture at construction. The comparator must be a strict weak ordering;
/// tie order among equal elements is arbitrary insertion order, but the size
/// bound holds regardless.
///
/// - Accumulator: a `Vec<T>` maintained as a bounded min-heap of size <= n,
///   ordered by `compare`, so memory is bounded by n.
/// - Output: `Vec<T>` sorted descending under `compare` (greatest first).
pub struct TopCombineFn<T> {
    n: usize,
    compare: Compare<T>,
}

impl<T> TopCombineFn<T> {
    pub fn new(n: usize, compare: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            n,
            compare: Arc::new(compare),
        }
    }

    /// The n greatest elements under the natural order.
    pub fn largest(n: usize) -> Self
    where
        T: Ord,
    {
        Self::new(n, |a, b| a < b)
    }

    /// The n least elements under the natural order.
    pub fn smallest(n: usize) -> Self
    where
        T: Ord,
    {
        Self::new(n, |a, b| b < a)
    }

    /// Push with the bounded-heap discipline: grow while under n, otherwise
    /// replace the minimum only when the new item beats it. Filtering a
    /// stream through a min-heap this way keeps the n greatest elements.
    fn push(&self, heap: &mut Vec<T>, item: T) {
        if self.n == 0 {
            return;
        }
        if heap.len() < self.n {
            heap.push(item);
            let last = heap.len() - 1;
            self.sift_up(heap, last);
        } else if (self.compare)(&heap[0], &item) {
            heap[0] = item;
            self.sift_down(heap, 0);
        }
    }

    fn sift_up(&self, heap: &mut [T], mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if (self.compare)(&heap[idx], &heap[parent]) {
                heap.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&self, heap: &mut [T], mut idx: usize) {
        loop {
            let mut least = idx;
            for child in [2 * idx + 1, 2 * idx + 2] {
                if child < heap.len() && (self.compare)(&heap[child], &heap[least]) {
                    least = child;
                }
            }
            if least == idx {
                break;
            }
            heap.swap(idx, least);
            idx = least;
        }
    }

    /// Greatest-first ordering derived from the strict comparator.
    fn descending(&self, a: &T, b: &T) -> Ordering {
        if (self.compare)(a, b) {
            Ordering::Greater
        } else if (self.compare)(b, a) {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

impl<T> Clone for TopCombineFn<T> {
    fn clone(&self) -> Self {
        Self {
            n: self.n,
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<T: Send + Sync> CombineFn<T, Vec<T>, Vec<T>> for TopCombineFn<T> {
    fn create_accumulator(&self) -> Vec<T> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<T>, value: T) {
        self.push(acc, value);
    }

    fn merge_accumulators(&self, accumulators: Vec<Vec<T>>) -> Vec<T> {
        // Concatenate and replay the same push discipline to re-bound to n.
        let mut merged = Vec::new();
        for heap in accumulators {
            for item in heap {
                self.push(&mut merged, item);
            }
        }
        merged
    }

    fn extract_output(&self, mut acc: Vec<T>) -> Vec<T> {
        acc.sort_by(|a, b| self.descending(a, b));
        acc
    }
}
