//! Currying and phase-split execution of combiners.
//!
//! A distributed plan wants to run the add phase near the data, lift merges
//! earlier in the pipeline, and extract once at the end, without re-deriving
//! the add logic. [`PhasedCombineFnExecutor`] exposes exactly those phases
//! over any [`CombineFn`]. [`CurriedCombineFn`] covers the companion need:
//! one parameterized combiner definition specialized per call site by binding
//! its parameters at construction rather than by subclassing.

use super::CombineFn;
use crate::error::RunError;
use anyhow::Result;
use std::marker::PhantomData;
use std::str::FromStr;

/// A combiner whose phases all take one extra bound parameter value.
///
/// This is the fixed-signature form of a combiner with trailing call-site
/// arguments: the parameter is typed and threaded explicitly instead of
/// forwarded dynamically. Bind it with [`curry_combine_fn`] to obtain a plain
/// [`CombineFn`].
pub trait ParamCombineFn<P, V, A, O>: Send + Sync {
    fn create_accumulator(&self, params: &P) -> A;

    fn add_input(&self, acc: &mut A, value: V, params: &P);

    fn add_inputs(&self, acc: &mut A, values: Vec<V>, params: &P) {
        for value in values {
            self.add_input(acc, value, params);
        }
    }

    fn merge_accumulators(&self, accumulators: Vec<A>, params: &P) -> A;

    fn extract_output(&self, acc: A, params: &P) -> O;
}

/// A [`ParamCombineFn`] with its parameter value bound at construction,
/// usable anywhere a zero-parameter combiner is expected.
pub struct CurriedCombineFn<F, P> {
    combine_fn: F,
    params: P,
}

impl<F, P> CurriedCombineFn<F, P> {
    pub fn new(combine_fn: F, params: P) -> Self {
        Self { combine_fn, params }
    }
}

/// Bind `params` onto a parameterized combiner.
pub fn curry_combine_fn<F, P>(combine_fn: F, params: P) -> CurriedCombineFn<F, P> {
    CurriedCombineFn::new(combine_fn, params)
}

impl<F, P, V, A, O> CombineFn<V, A, O> for CurriedCombineFn<F, P>
where
    F: ParamCombineFn<P, V, A, O>,
    P: Send + Sync,
{
    fn create_accumulator(&self) -> A {
        self.combine_fn.create_accumulator(&self.params)
    }

    fn add_input(&self, acc: &mut A, value: V) {
        self.combine_fn.add_input(acc, value, &self.params);
    }

    fn add_inputs(&self, acc: &mut A, values: Vec<V>) {
        self.combine_fn.add_inputs(acc, values, &self.params);
    }

    fn merge_accumulators(&self, accumulators: Vec<A>) -> A {
        self.combine_fn.merge_accumulators(accumulators, &self.params)
    }

    fn extract_output(&self, acc: A) -> O {
        self.combine_fn.extract_output(acc, &self.params)
    }
}

/// Which part of a combine a [`PhasedCombineFnExecutor`] runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombinePhase {
    /// All four phases over one input batch.
    All,
    /// Create an accumulator and fold the batch in.
    Add,
    /// Merge sibling accumulators.
    Merge,
    /// Derive the final output from one accumulator.
    Extract,
}

impl FromStr for CombinePhase {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CombinePhase::All),
            "add" => Ok(CombinePhase::Add),
            "merge" => Ok(CombinePhase::Merge),
            "extract" => Ok(CombinePhase::Extract),
            other => Err(RunError::Value(format!("unexpected phase: {other}"))),
        }
    }
}

/// Input to a phase dispatch: a batch of elements, sibling accumulators, or a
/// single final accumulator, depending on the phase.
pub enum PhaseInput<V, A> {
    Elements(Vec<V>),
    Accumulators(Vec<A>),
    Accumulator(A),
}

/// What a phase produced: an intermediate accumulator or the final output.
#[derive(Debug, PartialEq)]
pub enum PhaseOutput<A, O> {
    Accumulator(A),
    Output(O),
}

/// Executor for phases of combine operations.
pub struct PhasedCombineFnExecutor<C, V, A, O> {
    phase: CombinePhase,
    combine_fn: C,
    _types: PhantomData<fn(V) -> (A, O)>,
}

impl<C, V, A, O> PhasedCombineFnExecutor<C, V, A, O>
where
    C: CombineFn<V, A, O>,
{
    pub fn new(phase: CombinePhase, combine_fn: C) -> Self {
        Self {
            phase,
            combine_fn,
            _types: PhantomData,
        }
    }

    /// Run the configured phase over a matching input. A mismatched input
    /// shape is a fatal value error.
    pub fn apply(&self, input: PhaseInput<V, A>) -> Result<PhaseOutput<A, O>> {
        match (self.phase, input) {
            (CombinePhase::All, PhaseInput::Elements(values)) => {
                Ok(PhaseOutput::Output(self.full_combine(values)))
            }
            (CombinePhase::Add, PhaseInput::Elements(values)) => {
                Ok(PhaseOutput::Accumulator(self.add_only(values)))
            }
            (CombinePhase::Merge, PhaseInput::Accumulators(accumulators)) => {
                Ok(PhaseOutput::Accumulator(self.merge_only(accumulators)))
            }
            (CombinePhase::Extract, PhaseInput::Accumulator(acc)) => {
                Ok(PhaseOutput::Output(self.extract_only(acc)))
            }
            (phase, _) => {
                Err(RunError::Value(format!("input does not match phase {phase:?}")).into())
            }
        }
    }

    pub fn full_combine(&self, values: Vec<V>) -> O {
        self.combine_fn.apply(values)
    }

    pub fn add_only(&self, values: Vec<V>) -> A {
        let mut acc = self.combine_fn.create_accumulator();
        self.combine_fn.add_inputs(&mut acc, values);
        acc
    }

    pub fn merge_only(&self, accumulators: Vec<A>) -> A {
        self.combine_fn.merge_accumulators(accumulators)
    }

    pub fn extract_only(&self, acc: A) -> O {
        self.combine_fn.extract_output(acc)
    }
}

impl<F, P, V, A, O> PhasedCombineFnExecutor<CurriedCombineFn<F, P>, V, A, O>
where
    F: ParamCombineFn<P, V, A, O>,
    P: Send + Sync,
{
    /// Bind parameters onto a parameterized combiner, then run phases of it.
    pub fn with_params(phase: CombinePhase, combine_fn: F, params: P) -> Self {
        Self::new(phase, curry_combine_fn(combine_fn, params))
    }
}
