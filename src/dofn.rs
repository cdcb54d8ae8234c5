//! Per-element transform functions and their invocation context.
//!
//! A [`DoFn`] is the payload of a ParDo node. The runner brackets the
//! per-element [`process`](DoFn::process) calls with
//! [`start_bundle`](DoFn::start_bundle) and [`finish_bundle`](DoFn::finish_bundle)
//! for setup and teardown, and hands every call a [`ProcessContext`] carrying
//! the resolved side inputs, the per-tag output buffers, and the live counter
//! registry for aggregator updates.

use crate::counters::{Aggregator, CounterFactory};
use crate::element::Element;
use crate::sideinput::SideInputValue;
use crate::window::WindowedValue;
use anyhow::Result;
use indexmap::IndexMap;
use std::sync::Arc;

/// A per-element processing function.
pub trait DoFn: Send + Sync {
    /// Called once before the first element.
    fn start_bundle(&self, _ctx: &mut ProcessContext) -> Result<()> {
        Ok(())
    }

    /// Called once per input windowed value. Emit through the context.
    fn process(&self, ctx: &mut ProcessContext, element: &WindowedValue) -> Result<()>;

    /// Called once after the last element.
    fn finish_bundle(&self, _ctx: &mut ProcessContext) -> Result<()> {
        Ok(())
    }
}

/// Context for one ParDo invocation.
pub struct ProcessContext {
    step_name: String,
    counter_factory: Arc<CounterFactory>,
    side_inputs: Vec<SideInputValue>,
    // The default output buffer is seeded first, declared side tags after it,
    // so the primary output is always cached even when nothing is emitted.
    outputs: IndexMap<Option<String>, Vec<WindowedValue>>,
}

impl ProcessContext {
    pub(crate) fn new(
        step_name: &str,
        counter_factory: Arc<CounterFactory>,
        side_inputs: Vec<SideInputValue>,
        side_output_tags: &[String],
    ) -> Self {
        let mut outputs: IndexMap<Option<String>, Vec<WindowedValue>> = IndexMap::new();
        outputs.insert(None, Vec::new());
        for tag in side_output_tags {
            outputs.insert(Some(tag.clone()), Vec::new());
        }
        Self {
            step_name: step_name.to_string(),
            counter_factory,
            side_inputs,
            outputs,
        }
    }

    pub fn step_name(&self) -> &str {
        &self.step_name
    }

    /// Emit a value on the default output, wrapped in the global window.
    pub fn output(&mut self, value: impl Into<Element>) {
        self.outputs
            .get_mut(&None)
            .expect("default output buffer always exists")
            .push(WindowedValue::in_global_window(value));
    }

    /// Emit a value on a tagged side output.
    pub fn output_tagged(&mut self, tag: &str, value: impl Into<Element>) {
        self.outputs
            .entry(Some(tag.to_string()))
            .or_default()
            .push(WindowedValue::in_global_window(value));
    }

    /// The materialized side input at `index`, in the node's declaration
    /// order.
    ///
    /// # Panics
    ///
    /// Indexing past the declared side inputs is a programming error.
    pub fn side_input(&self, index: usize) -> &SideInputValue {
        &self.side_inputs[index]
    }

    /// Fold `delta` into this step's counter for the given aggregator.
    pub fn update_aggregator(&self, aggregator: &Aggregator, delta: i64) {
        self.counter_factory
            .get_aggregator_counter(&self.step_name, aggregator)
            .update(delta);
    }

    pub(crate) fn take_outputs(self) -> IndexMap<Option<String>, Vec<WindowedValue>> {
        self.outputs
    }
}

/// Adapter turning a closure into a [`DoFn`].
pub struct FnDoFn<F>(F);

impl<F> FnDoFn<F>
where
    F: Fn(&mut ProcessContext, &WindowedValue) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> DoFn for FnDoFn<F>
where
    F: Fn(&mut ProcessContext, &WindowedValue) -> Result<()> + Send + Sync,
{
    fn process(&self, ctx: &mut ProcessContext, element: &WindowedValue) -> Result<()> {
        (self.0)(ctx, element)
    }
}
