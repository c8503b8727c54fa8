use std::borrow::BorrowMut;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use graft_data::prelude::*;

use crate::model::{Attr, InferenceModel, OutletId};
use crate::analyser::types::{GenericFact, InferenceFact};

pub mod helpers;
mod macros;
pub mod types;

/// The window an inference strategy gets on its node: the resolved input
/// facts, the writable output facts, and the node attributes copied over
/// from the serialized operation description.
///
/// Assembled by the analyser for exactly one `infer` invocation per node.
pub struct NodeView<'a> {
    pub name: &'a str,
    pub op_type: &'a str,
    pub attrs: &'a HashMap<String, Attr>,
    pub inputs: TVec<InferenceFact>,
    pub outputs: TVec<InferenceFact>,
}

impl NodeView<'_> {
    pub fn in_fact(&self, slot: usize) -> GraftResult<&InferenceFact> {
        self.inputs.get(slot).ok_or_else(|| {
            anyhow::format_err!("{} \"{}\" has no input #{}", self.op_type, self.name, slot)
        })
    }

    /// The concrete value of input `slot`, when statically known.
    pub fn in_value(&self, slot: usize) -> Option<&Arc<Tensor>> {
        match &self.inputs.get(slot)?.value {
            GenericFact::Only(t) => Some(t),
            GenericFact::Any => None,
        }
    }

    pub fn out_fact_mut(&mut self, slot: usize) -> GraftResult<&mut InferenceFact> {
        let (op_type, name) = (self.op_type, self.name);
        self.outputs.get_mut(slot).ok_or_else(|| {
            anyhow::format_err!("{op_type} \"{name}\" has no output #{slot}")
        })
    }

    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.get(name)
    }

    pub fn attr_ints(&self, name: &str) -> GraftResult<Option<TVec<i64>>> {
        match self.attrs.get(name) {
            None => Ok(None),
            Some(Attr::Ints(v)) => Ok(Some(v.clone())),
            Some(Attr::Int(i)) => Ok(Some(tvec!(*i))),
            Some(a) => anyhow::bail!(
                "{} \"{}\" attribute {} is {:?}, expected a list of ints",
                self.op_type,
                self.name,
                name,
                a
            ),
        }
    }
}

/// A graph analyser, along with its current state.
#[derive(new)]
pub struct Analyser<M: BorrowMut<InferenceModel>> {
    model: M,
}

impl<M: BorrowMut<InferenceModel>> Analyser<M> {
    /// Runs the entire analysis at once: every node visited exactly once, in
    /// topological order, after its inputs have been resolved.
    pub fn analyse(&mut self) -> GraftResult<()> {
        let order = self.model.borrow().eval_order()?;
        for node in order {
            self.analyse_node(node).with_context(|| {
                format!("Failed analyse for node {}", self.model.borrow().node(node))
            })?;
        }
        trace!("analyse done");
        Ok(())
    }

    fn analyse_node(&mut self, node_id: usize) -> GraftResult<()> {
        let outputs = {
            let model = self.model.borrow();
            let node = model.node(node_id);
            trace!("Starting step for {}", node);
            let inputs: TVec<InferenceFact> = node
                .inputs
                .iter()
                .map(|o| model.outlet_fact(*o).cloned())
                .collect::<GraftResult<_>>()?;
            if log_enabled!(log::Level::Trace) {
                for (ix, i) in inputs.iter().enumerate() {
                    trace!("  Input  #{ix}: {i:?}");
                }
            }
            let outputs: TVec<InferenceFact> =
                node.outputs.iter().map(|o| o.fact.clone()).collect();
            let mut view = NodeView {
                name: &node.name,
                op_type: &node.op_type,
                attrs: &node.attrs,
                inputs,
                outputs,
            };
            node.op.infer(&mut view)?;
            view.outputs
        };
        let model = self.model.borrow_mut();
        for (slot, fact) in outputs.into_iter().enumerate() {
            trace!("  Output #{slot}: {fact:?}");
            model.set_outlet_fact(OutletId::new(node_id, slot), fact)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::types::Factoid;
    use crate::internal::*;
    use crate::ops::array::Reshape;
    use crate::ops::konst::Const;
    use crate::ops::source::Source;

    fn reshape_attrs(dims: &[i64]) -> HashMap<String, Attr> {
        let mut attrs = HashMap::new();
        attrs.insert("dim".to_string(), Attr::Ints(dims.iter().copied().collect()));
        attrs
    }

    #[test]
    fn source_then_reshape_propagates_shape() {
        crate::setup_test_logger();
        let mut model = InferenceModel::default();
        let source = Source::new(InferenceFact::dt_shape(DatumType::F32, shapefactoid![2, 3, 4]));
        let x = model
            .add_node("x".to_string(), "Source".to_string(), Box::new(source), HashMap::new(), 1)
            .unwrap();
        let r = model
            .add_node(
                "r".to_string(),
                "Reshape".to_string(),
                Box::new(Reshape),
                reshape_attrs(&[0, -1]),
                1,
            )
            .unwrap();
        model.add_edge(OutletId::new(x, 0), InletId::new(r, 0)).unwrap();
        model.analyse().unwrap();
        let fact = model.outlet_fact(OutletId::new(r, 0)).unwrap();
        assert_eq!(fact.shape, shapefactoid![2, 12]);
        assert_eq!(fact.datum_type, typefact!(DatumType::F32));
        assert_eq!(fact.value, ValueFact::Any);
    }

    #[test]
    fn const_then_reshape_folds_value() {
        let mut model = InferenceModel::default();
        let konst = Const::new(tensor1(&[1i32, 2, 3, 4, 5, 6]).into_arc_tensor());
        let k = model
            .add_node("k".to_string(), "Const".to_string(), Box::new(konst), HashMap::new(), 1)
            .unwrap();
        let r = model
            .add_node(
                "r".to_string(),
                "Reshape".to_string(),
                Box::new(Reshape),
                reshape_attrs(&[2, 3]),
                1,
            )
            .unwrap();
        model.add_edge(OutletId::new(k, 0), InletId::new(r, 0)).unwrap();
        model.analyse().unwrap();
        let fact = model.outlet_fact(OutletId::new(r, 0)).unwrap();
        let value = fact.value.concretize().unwrap();
        assert_eq!(value.shape(), &[2, 3]);
        assert_eq!(value.as_slice::<i32>().unwrap(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn failed_node_is_named_in_error() {
        let mut model = InferenceModel::default();
        let source = Source::new(InferenceFact::dt_shape(DatumType::F32, shapefactoid![2, 3, 4]));
        let x = model
            .add_node("x".to_string(), "Source".to_string(), Box::new(source), HashMap::new(), 1)
            .unwrap();
        let r = model
            .add_node(
                "bad".to_string(),
                "Reshape".to_string(),
                Box::new(Reshape),
                reshape_attrs(&[-1, -1]),
                1,
            )
            .unwrap();
        model.add_edge(OutletId::new(x, 0), InletId::new(r, 0)).unwrap();
        let err = model.analyse().unwrap_err();
        assert!(format!("{err:?}").contains("bad"));
    }
}
