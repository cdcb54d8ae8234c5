//! The direct runner: local, synchronous evaluation of a pipeline graph.
//!
//! The runner computes everything on the local machine and makes no attempt
//! to optimize for time or space. It walks the nodes in the topological order
//! the pipeline supplies, dispatches on each node's transform kind, and
//! materializes every output into the per-run cache. Each evaluation rule is
//! wrapped by a cache check, so re-running over an overlapping sub-graph
//! (materializing a side input before the ParDo that consumes it, say) is a
//! no-op for the already-computed nodes. A single run is single-threaded;
//! the cache-check-then-evaluate pattern is what bounds evaluation to once
//! per node, not a lock.

use crate::cache::{CachedValue, PValueCache};
use crate::counters::{AggregationKind, CounterFactory, CounterValue};
use crate::dofn::ProcessContext;
use crate::element::Element;
use crate::error::RunError;
use crate::io::{Sink, Source};
use crate::node::{PValue, Transform, TransformNode, ViewKind};
use crate::node_id::NodeId;
use crate::pipeline::Pipeline;
use crate::sideinput::SideInputValue;
use crate::window::WindowedValue;
use anyhow::{bail, Result};
use indexmap::IndexMap;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// Terminal state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    Done,
    Failed,
    Stopped,
}

/// A local pipeline runner.
pub struct DirectRunner {
    cache: PValueCache,
    counter_factory: Arc<CounterFactory>,
    // Element counts used only for debugging footprint issues; they are
    // logged and exposed read-only, and take no part in control decisions.
    // Keyed by (node label, output tag).
    debug_counters: HashMap<(String, Option<String>), u64>,
}

impl Default for DirectRunner {
    fn default() -> Self {
        Self::with_cache(PValueCache::new())
    }
}

impl DirectRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a runner around an existing cache, e.g. to resume over values
    /// computed by an earlier run.
    pub fn with_cache(cache: PValueCache) -> Self {
        Self {
            cache,
            counter_factory: Arc::new(CounterFactory::new()),
            debug_counters: HashMap::new(),
        }
    }

    pub fn counter_factory(&self) -> &Arc<CounterFactory> {
        &self.counter_factory
    }

    /// Per-(label, tag) element counts accumulated across cache writes.
    pub fn debug_counters(&self) -> &HashMap<(String, Option<String>), u64> {
        &self.debug_counters
    }

    /// Look up a node output computed by an earlier run.
    pub fn get_pvalue(&self, pvalue: &PValue) -> Result<&CachedValue> {
        self.cache.get(pvalue)
    }

    /// Drop a node's cached outputs so the next run re-evaluates it.
    pub fn clear_pvalue(&mut self, node: NodeId) {
        self.cache.clear_node(node);
    }

    /// Evaluate every node of the pipeline, in the supplied order.
    pub fn run(&mut self, pipeline: &Pipeline) -> Result<DirectPipelineResult> {
        for node in pipeline.nodes() {
            self.evaluate_node(node)?;
        }
        info!("final debug counters: {:?}", self.debug_counters);
        Ok(DirectPipelineResult::new(
            PipelineState::Done,
            Arc::clone(&self.counter_factory),
        ))
    }

    fn evaluate_node(&mut self, node: &TransformNode) -> Result<()> {
        if self.cache.is_cached(&PValue::primary(node.id)) {
            debug!("skipping {}: output already cached", node.label);
            return Ok(());
        }
        debug!("evaluating {}", node.label);
        match &node.transform {
            Transform::Create { values } => self.eval_create(node, values),
            Transform::Read { source } => self.eval_read(node, Arc::clone(source)),
            Transform::Flatten => self.eval_flatten(node),
            Transform::GroupByKeyOnly { key_coder } => {
                self.eval_group_by_key_only(node, Arc::clone(key_coder))
            }
            Transform::ParDo { dofn } => self.eval_par_do(node, Arc::clone(dofn)),
            Transform::CreateView { kind } => self.eval_create_view(node, kind.clone()),
            Transform::Write { sink } => self.eval_write(node, Arc::clone(sink)),
        }
    }

    /// Store one collection output, with debug accounting and the
    /// element-flow counter every cache write reports.
    fn cache_collection(
        &mut self,
        node: &TransformNode,
        tag: Option<String>,
        values: Vec<WindowedValue>,
    ) {
        *self
            .debug_counters
            .entry((node.label.clone(), tag.clone()))
            .or_insert(0) += values.len() as u64;
        self.counter_factory
            .get_counter(
                &format!("{}-out-ElementCount", node.label),
                AggregationKind::Sum,
            )
            .update(values.len() as i64);
        self.cache
            .cache_output(node.id, tag, CachedValue::Collection(values));
    }

    fn input_collection(&self, pvalue: &PValue) -> Result<&[WindowedValue]> {
        match self.cache.get(pvalue)? {
            CachedValue::Collection(values) => Ok(values),
            CachedValue::View(_) => {
                bail!("{pvalue:?} is a materialized view, not a collection")
            }
        }
    }

    fn eval_create(&mut self, node: &TransformNode, values: &[Element]) -> Result<()> {
        let result: Vec<WindowedValue> = values
            .iter()
            .cloned()
            .map(WindowedValue::in_global_window)
            .collect();
        self.cache_collection(node, None, result);
        Ok(())
    }

    fn eval_read(&mut self, node: &TransformNode, source: Arc<dyn Source>) -> Result<()> {
        let mut reader = source.reader()?;
        let mut result = Vec::new();
        loop {
            match reader.read_next() {
                Ok(Some(element)) => result.push(WindowedValue::in_global_window(element)),
                Ok(None) => break,
                Err(err) => {
                    // Release the handle before surfacing the failure.
                    let _ = reader.close();
                    return Err(err);
                }
            }
        }
        reader.close()?;
        self.cache_collection(node, None, result);
        Ok(())
    }

    fn eval_flatten(&mut self, node: &TransformNode) -> Result<()> {
        let result = {
            let mut result = Vec::new();
            for input in &node.inputs {
                result.extend_from_slice(self.input_collection(input)?);
            }
            result
        };
        self.cache_collection(node, None, result);
        Ok(())
    }

    fn eval_group_by_key_only(
        &mut self,
        node: &TransformNode,
        key_coder: Arc<dyn crate::coder::Coder>,
    ) -> Result<()> {
        let result = {
            let input = self.input_collection(&node.inputs[0])?;
            // Accumulate per encoded key so structurally-equal custom keys
            // coalesce, the same way a shuffle encodes keys before grouping.
            // Insertion order of keys is preserved; arrival order of values
            // within a key is preserved.
            let mut groups: IndexMap<String, Vec<Element>> = IndexMap::new();
            for wv in input {
                match wv.value.as_pair() {
                    Some((key, value)) => {
                        groups
                            .entry(key_coder.encode(key)?)
                            .or_default()
                            .push(value.clone());
                    }
                    None => {
                        return Err(RunError::TypeCheck(format!(
                            "input to GroupByKeyOnly must be windowed key/value pairs, \
                             received: {:?}",
                            wv.value
                        ))
                        .into());
                    }
                }
            }
            let mut result = Vec::with_capacity(groups.len());
            for (encoded, values) in groups {
                let key = key_coder.decode(&encoded)?;
                result.push(WindowedValue::in_global_window(Element::pair(
                    key,
                    Element::List(values),
                )));
            }
            result
        };
        self.cache_collection(node, None, result);
        Ok(())
    }

    fn eval_par_do(&mut self, node: &TransformNode, dofn: Arc<dyn crate::dofn::DoFn>) -> Result<()> {
        let side_inputs: Vec<SideInputValue> = node
            .side_inputs
            .iter()
            .map(|pv| match self.cache.get(pv)? {
                CachedValue::View(view) => Ok(view.clone()),
                CachedValue::Collection(_) => Err(RunError::TypeCheck(format!(
                    "side input {pv:?} is not a materialized view"
                ))
                .into()),
            })
            .collect::<Result<_>>()?;
        let input: Vec<WindowedValue> = self.input_collection(&node.inputs[0])?.to_vec();

        let mut ctx = ProcessContext::new(
            &node.label,
            Arc::clone(&self.counter_factory),
            side_inputs,
            &node.output_tags,
        );
        dofn.start_bundle(&mut ctx)?;
        for wv in &input {
            dofn.process(&mut ctx, wv)?;
        }
        dofn.finish_bundle(&mut ctx)?;

        // The default buffer was seeded first, so the primary output lands in
        // the cache (possibly empty) before any side tag does.
        for (tag, buffer) in ctx.take_outputs() {
            self.cache_collection(node, tag, buffer);
        }
        Ok(())
    }

    fn eval_create_view(&mut self, node: &TransformNode, kind: ViewKind) -> Result<()> {
        let view = {
            let values = self.input_collection(&node.inputs[0])?;
            match kind {
                ViewKind::Singleton { default } => match values {
                    [] => match default {
                        Some(value) => SideInputValue::Singleton(value),
                        None => SideInputValue::EmptySideInput,
                    },
                    [only] => SideInputValue::Singleton(only.value.clone()),
                    _ => {
                        return Err(RunError::Value(format!(
                            "PCollection with more than one element accessed as a \
                             singleton view: {}",
                            node.label
                        ))
                        .into());
                    }
                },
                ViewKind::Iterable => {
                    SideInputValue::Iterable(values.iter().map(|wv| wv.value.clone()).collect())
                }
                ViewKind::List => {
                    SideInputValue::List(values.iter().map(|wv| wv.value.clone()).collect())
                }
                ViewKind::Dict => {
                    return Err(
                        RunError::NotImplemented("dict side-input views".to_string()).into(),
                    );
                }
            }
        };
        self.cache
            .cache_output(node.id, None, CachedValue::View(view));
        Ok(())
    }

    fn eval_write(&mut self, node: &TransformNode, sink: Arc<dyn Sink>) -> Result<()> {
        let input: Vec<WindowedValue> = self.input_collection(&node.inputs[0])?.to_vec();
        let mut writer = sink.writer()?;
        for wv in input {
            *self
                .debug_counters
                .entry((node.label.clone(), None))
                .or_insert(0) += 1;
            if let Err(err) = writer.write(wv.value) {
                let _ = writer.close();
                return Err(err);
            }
        }
        writer.close()?;
        Ok(())
    }
}

/// Access to information about a finished run.
#[derive(Debug)]
pub struct DirectPipelineResult {
    state: PipelineState,
    counter_factory: Arc<CounterFactory>,
}

impl DirectPipelineResult {
    fn new(state: PipelineState, counter_factory: Arc<CounterFactory>) -> Self {
        Self {
            state,
            counter_factory,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Step name to value, for every counter reporting the named aggregator.
    pub fn aggregated_values(&self, aggregator_name: &str) -> HashMap<String, CounterValue> {
        self.counter_factory.get_aggregator_values(aggregator_name)
    }
}
