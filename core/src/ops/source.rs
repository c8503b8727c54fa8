use anyhow::ensure;

use graft_data::prelude::*;

use crate::analyser::NodeView;
use crate::analyser::types::{Factoid, InferenceFact};
use crate::ops::InferenceOp;

/// A graph input. The fact is whatever the serialized description declared,
/// possibly with unknown dimensions.
#[derive(Debug, Clone, new, Default)]
pub struct Source {
    pub fact: InferenceFact,
}

impl InferenceOp for Source {
    fn infer(&self, node: &mut NodeView) -> GraftResult<()> {
        ensure!(
            node.outputs.len() == 1,
            "Source \"{}\" expected a single output, got {}",
            node.name,
            node.outputs.len()
        );
        node.outputs[0] = node.outputs[0].unify(&self.fact)?;
        Ok(())
    }
}
