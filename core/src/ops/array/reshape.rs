use std::sync::Arc;

use anyhow::bail;

use graft_data::prelude::*;

use crate::analyser::NodeView;
use crate::analyser::helpers::single_output_infer;
use crate::analyser::types::{DimFact, Factoid, GenericFact, ShapeFactoid, ValueFact};
use crate::ops::InferenceOp;

/// Shape/value inference for reshape operations.
///
/// The target shape follows the usual conventions: an entry of `0` copies
/// the input dimension at the same index, a single `-1` entry is inferred so
/// the element counts match. When the input value is statically known, the
/// output value is the same flattened element sequence regrouped under the
/// resolved shape.
#[derive(Debug, Clone, new, Default)]
pub struct Reshape;

impl InferenceOp for Reshape {
    fn infer(&self, node: &mut NodeView) -> GraftResult<()> {
        single_output_infer(node, reshape_shape_infer, |node| {
            let Some(value) = node.in_value(0) else {
                return Ok(ValueFact::Any);
            };
            let Some(shape) = node.outputs[0].shape.concretize() else {
                debug!("Reshape \"{}\": output shape not fully known, no folding", node.name);
                return Ok(ValueFact::Any);
            };
            let reshaped = value.as_ref().clone().into_shape(&shape)?;
            Ok(GenericFact::Only(Arc::new(reshaped)))
        })?;
        let dt = node.in_fact(0)?.datum_type;
        node.outputs[0].datum_type = node.outputs[0].datum_type.unify(&dt)?;
        Ok(())
    }
}

/// Resolves the reshape target-shape argument against the input shape.
///
/// The argument comes from the second input's constant value when the node
/// has one, else from the node's `dim` attribute. Unknown input dimensions
/// are tolerated: a `0` entry copies whatever fact the input holds, and a
/// `-1` entry stays unknown until the surrounding dimensions are resolved.
pub fn reshape_shape_infer(node: &NodeView) -> GraftResult<ShapeFactoid> {
    let input_shape = &node.in_fact(0)?.shape;
    let Some(spec) = shape_spec(node)? else {
        debug!("Reshape \"{}\": target shape not yet known", node.name);
        return Ok(ShapeFactoid::default());
    };
    if spec.iter().filter(|&&d| d == -1).count() > 1 {
        bail!("Reshape \"{}\": at most one -1 allowed in target shape {:?}", node.name, spec);
    }

    let mut dims: TVec<DimFact> = tvec!();
    let mut infer_slot: Option<usize> = None;
    for (ix, &d) in spec.iter().enumerate() {
        match d {
            0 => match input_shape.dim(ix) {
                Some(d) => dims.push(d),
                None => bail!(
                    "Reshape \"{}\": target shape {:?} copies input dimension {}, but input \
                     shape is {:?}",
                    node.name,
                    spec,
                    ix,
                    input_shape
                ),
            },
            -1 => {
                infer_slot = Some(ix);
                dims.push(GenericFact::Any);
            }
            d if d > 0 => dims.push(GenericFact::Only(d as usize)),
            d => bail!(
                "Reshape \"{}\": invalid dimension {} in target shape {:?}",
                node.name,
                d,
                spec
            ),
        }
    }

    // resolve -1 and check element counts, when the input volume is known
    if let Some(input_dims) = input_shape.concretize() {
        let total: usize = input_dims.iter().product();
        let known: usize = dims.iter().filter_map(|d| d.concretize()).product();
        if let Some(slot) = infer_slot {
            if dims.iter().filter(|d| !d.is_concrete()).count() == 1 {
                if known == 0 || total % known != 0 {
                    bail!(
                        "Reshape \"{}\": can not infer -1 in {:?}: {} input elements do not \
                         divide by {}",
                        node.name,
                        spec,
                        total,
                        known
                    );
                }
                dims[slot] = GenericFact::Only(total / known);
            }
        } else if dims.iter().all(|d| d.is_concrete()) && known != total {
            bail!(
                "Reshape \"{}\": target shape {:?} holds {} elements, input {:?} holds {}",
                node.name,
                spec,
                known,
                input_dims,
                total
            );
        }
    }

    Ok(ShapeFactoid::closed(dims))
}

fn shape_spec(node: &NodeView) -> GraftResult<Option<TVec<i64>>> {
    if node.inputs.len() >= 2 {
        // frozen graphs carry the target shape as a second, constant input
        return match node.in_value(1) {
            Some(t) => t.to_i64s().map(Some),
            None => Ok(None),
        };
    }
    node.attr_ints("dim")
}
