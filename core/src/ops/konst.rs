use std::sync::Arc;

use anyhow::ensure;

use graft_data::prelude::*;

use crate::analyser::NodeView;
use crate::analyser::types::{Factoid, InferenceFact};
use crate::ops::InferenceOp;

/// A constant: the output fact is the embedded tensor itself.
#[derive(Debug, Clone, new)]
pub struct Const(pub Arc<Tensor>);

impl InferenceOp for Const {
    fn infer(&self, node: &mut NodeView) -> GraftResult<()> {
        ensure!(
            node.outputs.len() == 1,
            "Const \"{}\" expected a single output, got {}",
            node.name,
            node.outputs.len()
        );
        let fact = InferenceFact::from(self.0.clone());
        node.outputs[0] = node.outputs[0].unify(&fact)?;
        Ok(())
    }
}
