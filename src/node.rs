//! Transform nodes: the vertices of a pipeline graph.
//!
//! A node's behavior is a closed tagged variant ([`Transform`]); the runner
//! dispatches on it with a fixed match. Adding a transform kind means adding
//! a variant and an evaluation rule, nothing else.

use crate::coder::Coder;
use crate::dofn::DoFn;
use crate::element::Element;
use crate::io::{Sink, Source};
use crate::node_id::NodeId;
use std::sync::Arc;

/// A reference to one output of a transform node.
///
/// Most transforms have a single, untagged output (`tag == None`). A ParDo
/// with side outputs additionally produces one collection per declared tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PValue {
    pub producer: NodeId,
    pub tag: Option<String>,
}

impl PValue {
    /// The default (untagged) output of a node.
    pub fn primary(producer: NodeId) -> Self {
        Self { producer, tag: None }
    }

    /// A tagged side output of a node.
    pub fn tagged(producer: NodeId, tag: impl Into<String>) -> Self {
        Self {
            producer,
            tag: Some(tag.into()),
        }
    }
}

/// How a collection is exposed to consumers as a side input.
#[derive(Clone, Debug)]
pub enum ViewKind {
    /// Unwrap a zero-or-one element collection. An empty input yields the
    /// declared default if present, otherwise the empty-side-input marker;
    /// more than one element is a fatal value error.
    Singleton { default: Option<Element> },
    /// Forward traversal over every payload.
    Iterable,
    /// Random access over every payload.
    List,
    /// Declared by the construction API; this runner has no materialization
    /// rule for it and fails with a not-implemented error.
    Dict,
}

/// The transform payload of a node, dispatched on by the runner.
#[derive(Clone)]
pub enum Transform {
    /// Wrap literal values as a collection in the global window.
    Create { values: Vec<Element> },
    /// Drain a bounded source through a scoped reader.
    Read { source: Arc<dyn Source> },
    /// Concatenate the input collections in declaration order.
    Flatten,
    /// Group key/value pairs by coder-encoded key.
    GroupByKeyOnly { key_coder: Arc<dyn Coder> },
    /// Invoke a per-element function over the input collection.
    ParDo { dofn: Arc<dyn DoFn> },
    /// Materialize the input collection as a side-input view.
    CreateView { kind: ViewKind },
    /// Push every input payload through a scoped sink writer.
    Write { sink: Arc<dyn Sink> },
}

/// A vertex in the pipeline DAG. Built once by the construction layer;
/// read-only during execution.
#[derive(Clone)]
pub struct TransformNode {
    pub id: NodeId,
    /// Unique display label; keys the debug element counts.
    pub label: String,
    pub transform: Transform,
    /// Main input collections, in declaration order.
    pub inputs: Vec<PValue>,
    /// Materialized view nodes this node consumes as side inputs.
    pub side_inputs: Vec<PValue>,
    /// Side output tags a ParDo may emit on, beyond the default output.
    pub output_tags: Vec<String>,
}
