#[macro_use]
mod macros;

/// A Smallvec instantiation with 4 embeddable values.
///
/// Used about everywhere in graft, for node inputs and outputs, or
/// tensor dimensions.
pub type TVec<T> = smallvec::SmallVec<[T; 4]>;

pub type GraftResult<T> = anyhow::Result<T>;

pub mod prelude {
    pub use crate::datum::{Datum, DatumType};
    pub use crate::tensor::litteral::*;
    pub use crate::tensor::{IntoArcTensor, Tensor};
    pub use crate::tvec;
    pub use crate::{GraftResult, TVec};
}

pub mod internal {
    pub use crate::prelude::*;
    pub use ndarray as graft_ndarray;
    pub use smallvec as graft_smallvec;
}

pub use anyhow;
pub use ndarray;

mod datum;
mod tensor;
