mod reshape;

pub use reshape::{Reshape, reshape_shape_infer};
