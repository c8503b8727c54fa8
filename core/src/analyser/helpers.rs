use anyhow::ensure;

use graft_data::prelude::*;

use super::NodeView;
use super::types::{Factoid, ShapeFactoid, ValueFact};

/// Writes the single output fact of a node: shape first, then value.
///
/// The value function runs after the shape has landed, so it can read the
/// output shape it is folding into. Constant folding through reshape-like
/// operations relies on this ordering.
pub fn single_output_infer(
    node: &mut NodeView,
    shape_fn: impl Fn(&NodeView) -> GraftResult<ShapeFactoid>,
    value_fn: impl Fn(&NodeView) -> GraftResult<ValueFact>,
) -> GraftResult<()> {
    ensure!(
        node.outputs.len() == 1,
        "{} \"{}\" expected a single output, got {}",
        node.op_type,
        node.name,
        node.outputs.len()
    );
    ensure!(
        !node.inputs.is_empty(),
        "{} \"{}\" expected at least one input",
        node.op_type,
        node.name
    );

    let shape = shape_fn(node)?;
    node.outputs[0].shape = node.outputs[0].shape.unify(&shape)?;

    let value = value_fn(node)?;
    if let Some(t) = value.concretize() {
        node.outputs[0].datum_type = node.outputs[0].datum_type.unify(&t.datum_type().into())?;
        node.outputs[0].shape = node.outputs[0].shape.unify(&ShapeFactoid::from(t.shape()))?;
    }
    node.outputs[0].value = node.outputs[0].value.unify(&value)?;
    Ok(())
}

/// Forwards the single input's datum type and shape to the single output.
pub fn copy_shape_infer(node: &mut NodeView) -> GraftResult<()> {
    ensure!(
        node.outputs.len() == 1,
        "{} \"{}\" expected a single output, got {}",
        node.op_type,
        node.name,
        node.outputs.len()
    );
    let input = node.in_fact(0)?.clone();
    node.outputs[0].datum_type = node.outputs[0].datum_type.unify(&input.datum_type)?;
    node.outputs[0].shape = node.outputs[0].shape.unify(&input.shape)?;
    Ok(())
}
