use std::fmt;

use graft_data::GraftResult;

use crate::analyser::NodeView;

pub mod array;
pub mod identity;
pub mod konst;
pub mod source;

/// An inference strategy attached to a node.
///
/// The propagation pass invokes `infer` exactly once per node, after the
/// node's inputs have been resolved. The strategy writes the node's output
/// facts through the view; errors abort the conversion run.
pub trait InferenceOp: fmt::Debug + Send + Sync {
    fn infer(&self, node: &mut NodeView) -> GraftResult<()>;
}
