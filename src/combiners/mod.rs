//! The four-phase combiner abstraction and its built-in implementations.
//!
//! A [`CombineFn`] reduces a stream of values through an accumulator it
//! defines itself: create an empty accumulator, add inputs into it, merge
//! sibling accumulators from partial computations, and extract the final
//! output once. That shape is what lets a combine be split: partial combines
//! run near the data, partials merge pairwise or tree-wise, and the output is
//! derived at the end. [`PhasedCombineFnExecutor`] exposes the phases
//! individually for exactly that purpose.
//!
//! Built-ins:
//!
//! - [`MeanCombineFn`] -- arithmetic mean, NaN on empty input.
//! - [`CountCombineFn`] -- input size, O(1) per batch.
//! - [`TopCombineFn`] -- the n compare-most elements under a supplied
//!   strict ordering, via a bounded min-heap.
//! - [`SampleCombineFn`] -- fixed-size uniform random sample without
//!   replacement.
//! - [`ToListCombineFn`] / [`ToDictCombineFn`] -- condense a stream into a
//!   single list or map.
//! - [`TupleCombineFn`] / [`SingleInputTupleCombineFn`] -- run several
//!   combiners componentwise over parallel streams or one shared stream.
//! - [`CurriedCombineFn`] -- bind a fixed parameter value onto a
//!   [`ParamCombineFn`], yielding a plain `CombineFn`.

mod basic;
mod collectors;
mod phased;
mod sampling;
mod topk;
mod tuple;

pub use basic::{CountCombineFn, MeanCombineFn};
pub use collectors::{ToDictCombineFn, ToListCombineFn};
pub use phased::{
    curry_combine_fn, CombinePhase, CurriedCombineFn, ParamCombineFn, PhaseInput, PhaseOutput,
    PhasedCombineFnExecutor,
};
pub use sampling::SampleCombineFn;
pub use topk::TopCombineFn;
pub use tuple::{SingleInputTupleCombineFn, TupleCombineFn};

/// An associative reduction over values of type `V`, through accumulators of
/// type `A`, producing an output of type `O`.
pub trait CombineFn<V, A, O>: Send + Sync {
    /// A fresh, empty accumulator.
    fn create_accumulator(&self) -> A;

    /// Fold one value into the accumulator.
    fn add_input(&self, acc: &mut A, value: V);

    /// Fold a batch of values in. Override when a batch folds cheaper than
    /// element-by-element.
    fn add_inputs(&self, acc: &mut A, values: Vec<V>) {
        for value in values {
            self.add_input(acc, value);
        }
    }

    /// Combine accumulators built from disjoint parts of the input into one.
    fn merge_accumulators(&self, accumulators: Vec<A>) -> A;

    /// Derive the final output. Consumes the accumulator; called once.
    fn extract_output(&self, acc: A) -> O;

    /// Run all four phases over one batch of values.
    fn apply(&self, values: Vec<V>) -> O {
        let mut acc = self.create_accumulator();
        self.add_inputs(&mut acc, values);
        self.extract_output(acc)
    }
}
