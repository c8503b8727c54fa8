use graft_data::prelude::*;

use crate::analyser::NodeView;
use crate::analyser::helpers::copy_shape_infer;
use crate::ops::InferenceOp;

/// Forwards its single input unchanged.
#[derive(Debug, Clone, new, Default)]
pub struct Identity;

impl InferenceOp for Identity {
    fn infer(&self, node: &mut NodeView) -> GraftResult<()> {
        copy_shape_infer(node)
    }
}
