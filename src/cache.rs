//! The per-run output cache.
//!
//! Every node's output is computed at most once per run: evaluation rules are
//! wrapped by a cache check, and a second request for an already-cached node
//! is a no-op. Slots are indexed by the node's arena id, so lookups never
//! hash or compare nodes.

use crate::node::PValue;
use crate::node_id::NodeId;
use crate::sideinput::SideInputValue;
use crate::window::WindowedValue;
use anyhow::{bail, Result};
use std::collections::HashMap;

/// One materialized node output.
#[derive(Clone, Debug)]
pub enum CachedValue {
    /// An ordered sequence of windowed values (the common case).
    Collection(Vec<WindowedValue>),
    /// A materialized side-input view.
    View(SideInputValue),
}

impl CachedValue {
    pub fn as_collection(&self) -> Option<&[WindowedValue]> {
        match self {
            CachedValue::Collection(values) => Some(values),
            CachedValue::View(_) => None,
        }
    }

    pub fn as_view(&self) -> Option<&SideInputValue> {
        match self {
            CachedValue::View(view) => Some(view),
            CachedValue::Collection(_) => None,
        }
    }
}

/// Cache of values computed while the runner executes a pipeline.
///
/// Entries live for the lifetime of one runner; [`clear_node`](Self::clear_node)
/// invalidates a single node for re-evaluation.
#[derive(Default)]
pub struct PValueCache {
    slots: Vec<HashMap<Option<String>, CachedValue>>,
}

impl PValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, node: NodeId) -> &mut HashMap<Option<String>, CachedValue> {
        if node.index() >= self.slots.len() {
            self.slots.resize_with(node.index() + 1, HashMap::new);
        }
        &mut self.slots[node.index()]
    }

    pub fn is_cached(&self, pvalue: &PValue) -> bool {
        self.slots
            .get(pvalue.producer.index())
            .is_some_and(|slot| slot.contains_key(&pvalue.tag))
    }

    /// Look up a computed output; fails if it has not been evaluated yet.
    pub fn get(&self, pvalue: &PValue) -> Result<&CachedValue> {
        match self
            .slots
            .get(pvalue.producer.index())
            .and_then(|slot| slot.get(&pvalue.tag))
        {
            Some(value) => Ok(value),
            None => bail!("PValue {pvalue:?} is not computed"),
        }
    }

    /// Store one node output. Atomic at node-output granularity: the value is
    /// fully built before it lands here.
    pub fn cache_output(&mut self, node: NodeId, tag: Option<String>, value: CachedValue) {
        self.slot_mut(node).insert(tag, value);
    }

    /// Drop all outputs of a node so it is re-evaluated on the next run.
    pub fn clear_node(&mut self, node: NodeId) {
        if let Some(slot) = self.slots.get_mut(node.index()) {
            slot.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_round_trip_and_clear() {
        let mut cache = PValueCache::new();
        let node = NodeId::new(3);
        let pv = PValue::primary(node);
        assert!(!cache.is_cached(&pv));
        assert!(cache.get(&pv).is_err());

        cache.cache_output(node, None, CachedValue::Collection(vec![]));
        assert!(cache.is_cached(&pv));
        assert!(cache.get(&pv).unwrap().as_collection().is_some());

        // Tagged outputs are separate entries.
        let tagged = PValue::tagged(node, "errors");
        assert!(!cache.is_cached(&tagged));

        cache.clear_node(node);
        assert!(!cache.is_cached(&pv));
    }
}
