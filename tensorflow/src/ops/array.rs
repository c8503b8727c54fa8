use graft_core::internal::*;
use graft_core::ops::array::Reshape;

use crate::model::{ExtractedOp, ParsingContext, TfOpRegister};
use crate::tfpb::NodeDef;

pub fn register_all_ops(reg: &mut TfOpRegister) {
    reg.insert("Reshape", reshape);
}

/// Shape/type registration for the `Reshape` operation.
///
/// The serialized description is not inspected: everything the rule needs
/// (input facts, target-shape argument) is read from the resolved node when
/// the propagation pass invokes the strategy.
pub fn reshape(_ctx: &ParsingContext, _pb: &NodeDef) -> GraftResult<ExtractedOp> {
    Ok(ExtractedOp { op_type: "Reshape".into(), infer: Box::new(Reshape) })
}
