//! Pipeline graph container.
//!
//! We keep a tiny arena so the runner never has to infer ordering: appending
//! a node requires its inputs to already exist, which makes insertion order a
//! valid topological evaluation order. The richer declarative construction
//! API lives outside this core; these builder methods are the hand-off
//! surface it targets.

use crate::coder::Coder;
use crate::dofn::DoFn;
use crate::element::Element;
use crate::io::{Sink, Source};
use crate::node::{PValue, Transform, TransformNode, ViewKind};
use crate::node_id::NodeId;
use std::sync::Arc;

#[derive(Default)]
pub struct Pipeline {
    nodes: Vec<TransformNode>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        label: impl Into<String>,
        transform: Transform,
        inputs: Vec<PValue>,
        side_inputs: Vec<PValue>,
        output_tags: Vec<String>,
    ) -> NodeId {
        for pv in inputs.iter().chain(side_inputs.iter()) {
            assert!(
                pv.producer.index() < self.nodes.len(),
                "input {pv:?} references a node that is not in the graph yet"
            );
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(TransformNode {
            id,
            label: label.into(),
            transform,
            inputs,
            side_inputs,
            output_tags,
        });
        id
    }

    /// A collection of literal values.
    pub fn create(&mut self, label: impl Into<String>, values: Vec<Element>) -> PValue {
        PValue::primary(self.push(label, Transform::Create { values }, vec![], vec![], vec![]))
    }

    /// A collection drained from a bounded source.
    pub fn read(&mut self, label: impl Into<String>, source: Arc<dyn Source>) -> PValue {
        PValue::primary(self.push(label, Transform::Read { source }, vec![], vec![], vec![]))
    }

    /// The concatenation of `inputs`, in the given order.
    pub fn flatten(&mut self, label: impl Into<String>, inputs: Vec<PValue>) -> PValue {
        PValue::primary(self.push(label, Transform::Flatten, inputs, vec![], vec![]))
    }

    /// Group key/value pairs by key, normalizing key identity through `coder`.
    pub fn group_by_key_only(
        &mut self,
        label: impl Into<String>,
        input: PValue,
        key_coder: Arc<dyn Coder>,
    ) -> PValue {
        PValue::primary(self.push(
            label,
            Transform::GroupByKeyOnly { key_coder },
            vec![input],
            vec![],
            vec![],
        ))
    }

    /// Apply `dofn` to every element of `input`.
    pub fn par_do(
        &mut self,
        label: impl Into<String>,
        dofn: Arc<dyn DoFn>,
        input: PValue,
    ) -> PValue {
        self.par_do_with(label, dofn, input, vec![], vec![])
    }

    /// Apply `dofn` with side inputs and declared side output tags. Returns
    /// the default output; address side outputs with [`PValue::tagged`].
    pub fn par_do_with(
        &mut self,
        label: impl Into<String>,
        dofn: Arc<dyn DoFn>,
        input: PValue,
        side_inputs: Vec<PValue>,
        output_tags: Vec<String>,
    ) -> PValue {
        PValue::primary(self.push(
            label,
            Transform::ParDo { dofn },
            vec![input],
            side_inputs,
            output_tags,
        ))
    }

    /// Materialize `input` as a side-input view of the given kind.
    pub fn view(&mut self, label: impl Into<String>, input: PValue, kind: ViewKind) -> PValue {
        PValue::primary(self.push(
            label,
            Transform::CreateView { kind },
            vec![input],
            vec![],
            vec![],
        ))
    }

    /// Push every payload of `input` into a sink. Produces no collection.
    pub fn write(&mut self, label: impl Into<String>, input: PValue, sink: Arc<dyn Sink>) -> NodeId {
        self.push(label, Transform::Write { sink }, vec![input], vec![], vec![])
    }

    /// All nodes, in topological evaluation order.
    pub fn nodes(&self) -> &[TransformNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &TransformNode {
        &self.nodes[id.index()]
    }

    pub fn node_by_label(&self, label: &str) -> Option<&TransformNode> {
        self.nodes.iter().find(|n| n.label == label)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
