//! # graft-core
//!
//! Graph model, partial tensor facts and the shape/value propagation pass.
//!
//! A frontend (see `graft-tensorflow`) turns a serialized graph into an
//! [`model::InferenceModel`]: nodes carrying an inference strategy, wired by
//! edges. The [`analyser::Analyser`] then walks the graph once in topological
//! order and invokes each node's strategy, which tags the node's output edges
//! with [`analyser::types::InferenceFact`]s: datum type, shape, and, when the
//! inputs are statically known, the constant-folded value.

#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate log;

pub mod analyser;
pub mod model;
pub mod ops;

pub use graft_data;
pub use graft_data::tvec;

pub mod prelude {
    pub use crate::analyser::Analyser;
    pub use crate::analyser::types::{
        DimFact, Factoid, GenericFact, InferenceFact, ShapeFactoid, TypeFact, ValueFact,
    };
    pub use crate::model::{Attr, InferenceModel, InletId, Node, OutletId};
    pub use crate::ops::InferenceOp;
    pub use graft_data::prelude::*;
}

pub mod internal {
    pub use crate::analyser::NodeView;
    pub use crate::analyser::helpers::{copy_shape_infer, single_output_infer};
    pub use crate::prelude::*;
    pub use crate::{dimfact, shapefactoid, tvec, typefact, valuefact};
    pub use anyhow::{Context as _, bail, ensure, format_err};
    pub use graft_data::internal::*;
}

#[cfg(test)]
#[allow(dead_code)]
fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("GRAFT_LOG").try_init();
}
