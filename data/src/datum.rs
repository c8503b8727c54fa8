use std::fmt;

use ndarray::ArrayD;

use crate::GraftResult;
use crate::tensor::Tensor;

/// The type of the values inside a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatumType {
    F32,
    F64,
    I32,
    I64,
}

impl DatumType {
    pub fn size_of(&self) -> usize {
        match self {
            DatumType::F32 | DatumType::I32 => 4,
            DatumType::F64 | DatumType::I64 => 8,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DatumType::I32 | DatumType::I64)
    }

    pub fn is_float(&self) -> bool {
        !self.is_integer()
    }
}

impl fmt::Display for DatumType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{self:?}")
    }
}

/// A Rust scalar type that tensors can be made of.
pub trait Datum: Copy + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    fn name() -> &'static str;
    fn datum_type() -> DatumType;
    fn into_tensor(arr: ArrayD<Self>) -> Tensor;
    fn view_from_tensor(t: &Tensor) -> GraftResult<&ArrayD<Self>>;
    fn array_from_tensor(t: Tensor) -> GraftResult<ArrayD<Self>>;
}

macro_rules! datum {
    ($t:ty, $v:ident) => {
        impl From<ArrayD<$t>> for Tensor {
            fn from(it: ArrayD<$t>) -> Tensor {
                Tensor::$v(it)
            }
        }

        impl Datum for $t {
            fn name() -> &'static str {
                stringify!($t)
            }

            fn datum_type() -> DatumType {
                DatumType::$v
            }

            fn into_tensor(arr: ArrayD<$t>) -> Tensor {
                Tensor::$v(arr)
            }

            fn view_from_tensor(t: &Tensor) -> GraftResult<&ArrayD<$t>> {
                match t {
                    Tensor::$v(it) => Ok(it),
                    _ => anyhow::bail!(
                        "Tensor datum type mismatch: expected {}, got {:?}",
                        stringify!($t),
                        t.datum_type()
                    ),
                }
            }

            fn array_from_tensor(t: Tensor) -> GraftResult<ArrayD<$t>> {
                match t {
                    Tensor::$v(it) => Ok(it),
                    _ => anyhow::bail!(
                        "Tensor datum type mismatch: expected {}, got {:?}",
                        stringify!($t),
                        t.datum_type()
                    ),
                }
            }
        }
    };
}

datum!(f32, F32);
datum!(f64, F64);
datum!(i32, I32);
datum!(i64, I64);
