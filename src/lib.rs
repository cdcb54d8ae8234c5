//! # Millrace
//!
//! The **local execution core** of a batch data-processing SDK, inspired by
//! Google Cloud Dataflow. Millrace evaluates a directed acyclic graph of
//! declarative transforms over immutable, windowed collections: it walks the
//! nodes in dependency order, materializes and caches every intermediate
//! result, groups by key, merges side-input views, reduces values through an
//! associative combiner abstraction, and reports progress through
//! thread-safe counters.
//!
//! ## Core Concepts
//!
//! ### Pipeline and nodes
//!
//! A [`Pipeline`] is a tiny arena of [`TransformNode`]s whose insertion
//! order is a valid topological evaluation order. Each node carries a closed
//! [`Transform`] variant (create, read, flatten, group-by-key, per-element
//! ParDo, side-input view, write); the runner dispatches on it with a fixed
//! match. Collections are referenced by [`PValue`], a `(producer, tag)`
//! pair.
//!
//! ### The direct runner
//!
//! [`DirectRunner::run`] evaluates every node and returns a
//! [`DirectPipelineResult`] exposing the terminal state and user aggregator
//! values. Every evaluation rule is wrapped by a cache check, so a node's
//! output is computed at most once per run, and re-running over overlapping
//! sub-graphs is safe. Runs are single-threaded and synchronous; a fatal
//! error (malformed grouping input, an over-full singleton view) aborts the
//! run immediately, with no retries.
//!
//! ```
//! use millrace::{
//!     DirectRunner, Element, FnDoFn, JsonCoder, Pipeline, ProcessContext, WindowedValue,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut p = Pipeline::new();
//! let words = p.create("words", vec!["a".into(), "b".into(), "a".into()]);
//! let paired = p.par_do(
//!     "pair-with-one",
//!     Arc::new(FnDoFn::new(
//!         |ctx: &mut ProcessContext, wv: &WindowedValue| {
//!             ctx.output(Element::pair(wv.value.clone(), 1));
//!             Ok(())
//!         },
//!     )),
//!     words,
//! );
//! let grouped = p.group_by_key_only("group", paired, Arc::new(JsonCoder));
//!
//! let mut runner = DirectRunner::new();
//! let result = runner.run(&p)?;
//! # let _ = (grouped, result);
//! # Ok(())
//! # }
//! ```
//!
//! ### Combiners
//!
//! A [`CombineFn`] reduces values through a four-phase accumulator
//! lifecycle: `create_accumulator`, `add_input`/`add_inputs`,
//! `merge_accumulators`, `extract_output`. The split is what lets a combine
//! run as distributed partials; [`PhasedCombineFnExecutor`] exposes the
//! phases individually. Built-ins cover mean, count, bounded top-K under a
//! supplied ordering, uniform sampling, list/dict collection, componentwise
//! tuple composition, and parameter currying.
//!
//! ### Counters
//!
//! A [`CounterFactory`] hands out unique named [`Counter`]s (SUM or MEAN)
//! with an overflow-safe lock-free update path. The runner reports element
//! volumes through it, and user [`Aggregator`]s are reported per step under
//! `user-<step>-<name>` and read back in bulk via
//! [`DirectPipelineResult::aggregated_values`].
//!
//! ## Module Overview
//!
//! - [`pipeline`] / [`node`] / [`node_id`] - graph container and vertices
//! - [`runner`] - the direct runner and its per-kind evaluation rules
//! - [`cache`] - the per-run output cache
//! - [`combiners`] - the combiner framework and built-ins
//! - [`counters`] - counter registry and aggregator reporting
//! - [`element`] / [`window`] - the dynamic value and windowed-value model
//! - [`sideinput`] - materialized side-input views
//! - [`coder`] - key coders used by grouping
//! - [`io`] - source/sink collaborator interfaces
//! - [`dofn`] - per-element functions and their invocation context
//! - [`testing`] - in-memory sources and sinks for tests

pub mod cache;
pub mod coder;
pub mod combiners;
pub mod counters;
pub mod dofn;
pub mod element;
pub mod error;
pub mod io;
pub mod node;
pub mod node_id;
pub mod pipeline;
pub mod runner;
pub mod sideinput;
pub mod testing;
pub mod window;

pub use cache::{CachedValue, PValueCache};
pub use coder::{Coder, JsonCoder};
pub use combiners::{
    CombineFn, CombinePhase, CountCombineFn, CurriedCombineFn, MeanCombineFn, ParamCombineFn,
    PhasedCombineFnExecutor, SampleCombineFn, SingleInputTupleCombineFn, ToDictCombineFn,
    ToListCombineFn, TopCombineFn, TupleCombineFn,
};
pub use counters::{
    AggregationKind, Aggregator, Counter, CounterFactory, CounterValue, USER_COUNTER_PREFIX,
};
pub use dofn::{DoFn, FnDoFn, ProcessContext};
pub use element::Element;
pub use error::RunError;
pub use io::{Reader, Sink, Source, Writer};
pub use node::{PValue, Transform, TransformNode, ViewKind};
pub use node_id::NodeId;
pub use pipeline::Pipeline;
pub use runner::{DirectPipelineResult, DirectRunner, PipelineState};
pub use sideinput::SideInputValue;
pub use window::{GlobalWindow, WindowedValue};
