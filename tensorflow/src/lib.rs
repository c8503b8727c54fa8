//! # graft TensorFlow frontend
//!
//! Loads a frozen graph (rendered as JSON) and runs shape/value inference
//! over it.
//!
//! ```
//! use graft_tensorflow::prelude::*;
//!
//! let graph = r#"{ "node": [
//!   { "name": "x", "op": "Placeholder",
//!     "attr": { "dtype": { "type": "DT_FLOAT" }, "shape": { "shape": [2, 3, 4] } } },
//!   { "name": "reshaped", "op": "Reshape", "input": ["x"],
//!     "attr": { "dim": { "ints": [0, -1] } } }
//! ] }"#;
//!
//! let tf = tensorflow();
//! let mut model = tf.model_for_read(&mut graph.as_bytes()).unwrap();
//! model.analyse().unwrap();
//!
//! let node = model.node_by_name("reshaped").unwrap().id;
//! let fact = model.outlet_fact(OutletId::new(node, 0)).unwrap();
//! assert_eq!(fact.shape, shapefactoid![2, 12]);
//! ```

#[allow(unused_imports)]
#[macro_use]
extern crate log;

pub mod model;
pub mod ops;
pub mod tfpb;

pub use graft_core;
pub use model::Tensorflow;

pub fn tensorflow() -> Tensorflow {
    let mut ops = crate::model::TfOpRegister::default();
    ops::register_all_ops(&mut ops);
    Tensorflow { op_register: ops }
}

pub mod prelude {
    pub use crate::model::Tensorflow;
    pub use crate::tensorflow;
    pub use graft_core::prelude::*;
    pub use graft_core::{dimfact, shapefactoid, tvec, typefact, valuefact};
}

#[cfg(test)]
#[allow(dead_code)]
pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("GRAFT_LOG").try_init();
}
