use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use anyhow::{bail, ensure};

use graft_data::prelude::*;

use crate::analyser::Analyser;
use crate::analyser::types::InferenceFact;
use crate::ops::InferenceOp;

/// Attribute value attached to a node, copied over from the serialized
/// operation description by the frontend.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Int(i64),
    Ints(TVec<i64>),
    Float(f32),
    Str(String),
    DatumType(DatumType),
    Tensor(Arc<Tensor>),
}

/// Identifier for a node output in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, new)]
pub struct OutletId {
    /// node identifier in the graph
    pub node: usize,
    /// output index of the node
    pub slot: usize,
}

/// Identifier for a node input in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, new)]
pub struct InletId {
    /// node identifier in the graph
    pub node: usize,
    /// input index of the node
    pub slot: usize,
}

/// One output slot of a node: the fact the analyser maintains for the edge,
/// and the input slots it feeds.
#[derive(Debug, Clone, Default)]
pub struct Outlet {
    pub fact: InferenceFact,
    pub successors: TVec<InletId>,
}

/// A node of the graph: one operation instance.
#[derive(Debug)]
pub struct Node {
    pub id: usize,
    pub name: String,
    /// Canonical internal tag for the operation kind.
    pub op_type: String,
    /// The inference strategy invoked once by the propagation pass.
    pub op: Box<dyn InferenceOp>,
    pub attrs: HashMap<String, Attr>,
    pub inputs: TVec<OutletId>,
    pub outputs: TVec<Outlet>,
}

impl fmt::Display for Node {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "#{} \"{}\" {}", self.id, self.name, self.op_type)
    }
}

/// A graph under analysis.
#[derive(Debug, Default)]
pub struct InferenceModel {
    nodes: Vec<Node>,
    nodes_by_name: HashMap<String, usize>,
}

impl InferenceModel {
    pub fn add_node(
        &mut self,
        name: String,
        op_type: String,
        op: Box<dyn InferenceOp>,
        attrs: HashMap<String, Attr>,
        output_arity: usize,
    ) -> GraftResult<usize> {
        ensure!(!self.nodes_by_name.contains_key(&name), "Duplicate node name \"{}\"", name);
        let id = self.nodes.len();
        self.nodes_by_name.insert(name.clone(), id);
        let outputs = (0..output_arity).map(|_| Outlet::default()).collect();
        self.nodes.push(Node { id, name, op_type, op, attrs, inputs: tvec!(), outputs });
        Ok(id)
    }

    pub fn add_edge(&mut self, outlet: OutletId, inlet: InletId) -> GraftResult<()> {
        ensure!(outlet.node < self.nodes.len(), "Invalid outlet {:?}", outlet);
        ensure!(inlet.node < self.nodes.len(), "Invalid inlet {:?}", inlet);
        ensure!(
            outlet.slot < self.nodes[outlet.node].outputs.len(),
            "Node {} has no output #{}",
            self.nodes[outlet.node],
            outlet.slot
        );
        // input slots are wired in order
        ensure!(
            inlet.slot == self.nodes[inlet.node].inputs.len(),
            "Input slots of node {} must be wired in order, got #{}",
            self.nodes[inlet.node],
            inlet.slot
        );
        self.nodes[inlet.node].inputs.push(outlet);
        self.nodes[outlet.node].outputs[outlet.slot].successors.push(inlet);
        Ok(())
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_by_name(&self, name: &str) -> GraftResult<&Node> {
        let id: &usize =
            self.nodes_by_name.get(name).ok_or_else(|| anyhow::format_err!("Node \"{name}\" not found"))?;
        Ok(&self.nodes[*id])
    }

    pub fn outlet_fact(&self, outlet: OutletId) -> GraftResult<&InferenceFact> {
        self.nodes
            .get(outlet.node)
            .and_then(|n| n.outputs.get(outlet.slot))
            .map(|o| &o.fact)
            .ok_or_else(|| anyhow::format_err!("No such outlet: {outlet:?}"))
    }

    pub fn set_outlet_fact(&mut self, outlet: OutletId, fact: InferenceFact) -> GraftResult<()> {
        ensure!(
            outlet.node < self.nodes.len()
                && outlet.slot < self.nodes[outlet.node].outputs.len(),
            "No such outlet: {:?}",
            outlet
        );
        self.nodes[outlet.node].outputs[outlet.slot].fact = fact;
        Ok(())
    }

    /// A topological ordering of the nodes: every node comes after all of
    /// its input nodes.
    pub fn eval_order(&self) -> GraftResult<Vec<usize>> {
        let mut pending: Vec<usize> = self.nodes.iter().map(|n| n.inputs.len()).collect();
        let mut queue: VecDeque<usize> =
            self.nodes.iter().filter(|n| n.inputs.is_empty()).map(|n| n.id).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for outlet in &self.nodes[node].outputs {
                for succ in &outlet.successors {
                    pending[succ.node] -= 1;
                    if pending[succ.node] == 0 {
                        queue.push_back(succ.node);
                    }
                }
            }
        }
        if order.len() != self.nodes.len() {
            bail!("Graph contains a cycle");
        }
        Ok(order)
    }

    /// Runs the shape/value propagation pass over the whole graph.
    pub fn analyse(&mut self) -> GraftResult<()> {
        Analyser::new(self).analyse()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::internal::*;
    use crate::ops::identity::Identity;
    use crate::ops::source::Source;

    fn source_node(model: &mut InferenceModel, name: &str) -> usize {
        let op = Source::new(InferenceFact::default());
        model
            .add_node(name.to_string(), "Source".to_string(), Box::new(op), HashMap::new(), 1)
            .unwrap()
    }

    fn identity_node(model: &mut InferenceModel, name: &str) -> usize {
        model
            .add_node(name.to_string(), "Identity".to_string(), Box::new(Identity), HashMap::new(), 1)
            .unwrap()
    }

    #[test]
    fn eval_order_is_topological() {
        let mut model = InferenceModel::default();
        let a = source_node(&mut model, "a");
        let b = identity_node(&mut model, "b");
        let c = identity_node(&mut model, "c");
        model.add_edge(OutletId::new(c, 0), InletId::new(b, 0)).unwrap();
        model.add_edge(OutletId::new(a, 0), InletId::new(c, 0)).unwrap();
        let order = model.eval_order().unwrap();
        let pos = |id| order.iter().position(|&n| n == id).unwrap();
        assert!(pos(a) < pos(c));
        assert!(pos(c) < pos(b));
    }

    #[test]
    fn cycle_is_detected() {
        let mut model = InferenceModel::default();
        let a = identity_node(&mut model, "a");
        let b = identity_node(&mut model, "b");
        model.add_edge(OutletId::new(a, 0), InletId::new(b, 0)).unwrap();
        model.add_edge(OutletId::new(b, 0), InletId::new(a, 0)).unwrap();
        assert!(model.eval_order().is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut model = InferenceModel::default();
        source_node(&mut model, "a");
        let op = Source::new(InferenceFact::default());
        assert!(
            model
                .add_node("a".to_string(), "Source".to_string(), Box::new(op), HashMap::new(), 1)
                .is_err()
        );
    }
}
