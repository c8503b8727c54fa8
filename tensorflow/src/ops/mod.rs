use anyhow::bail;

use graft_core::internal::*;
use graft_core::ops::identity::Identity;
use graft_core::ops::konst::Const;
use graft_core::ops::source::Source;

use crate::model::{ExtractedOp, ParsingContext, TfOpRegister};
use crate::tfpb::NodeDef;

pub mod array;

pub fn register_all_ops(reg: &mut TfOpRegister) {
    array::register_all_ops(reg);
    reg.insert("Const", konst);
    reg.insert("Identity", identity);
    reg.insert("Placeholder", placeholder);
}

fn konst(_ctx: &ParsingContext, node: &NodeDef) -> GraftResult<ExtractedOp> {
    let dt = node.get_attr_datum_type("dtype")?;
    let value = node.get_attr_tensor("value")?;

    if value.datum_type() != dt {
        bail!(
            "Const node \"{}\" carries a {:?} tensor, expected {:?}",
            node.name,
            value.datum_type(),
            dt
        );
    }

    Ok(ExtractedOp { op_type: "Const".into(), infer: Box::new(Const::new(value.into_arc_tensor())) })
}

fn placeholder(_ctx: &ParsingContext, node: &NodeDef) -> GraftResult<ExtractedOp> {
    let mut fact = InferenceFact::dt(node.get_attr_datum_type("dtype")?);
    if let Some(shape) = node.get_attr_shape_opt("shape")? {
        fact = fact.with_shape(shape);
    }
    Ok(ExtractedOp { op_type: "Source".into(), infer: Box::new(Source::new(fact)) })
}

fn identity(_ctx: &ParsingContext, _node: &NodeDef) -> GraftResult<ExtractedOp> {
    Ok(ExtractedOp { op_type: "Identity".into(), infer: Box::new(Identity) })
}
