use std::fmt;
use std::sync::Arc;

use anyhow::{bail, ensure};
use ndarray::{ArrayD, IxDyn};

use crate::datum::{Datum, DatumType};
use crate::{GraftResult, TVec};

/// A concrete multi-dimensional value. One array per supported datum type.
#[derive(Clone, PartialEq)]
pub enum Tensor {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
}

macro_rules! with_array {
    ($tensor:expr, |$arr:ident| $e:expr) => {
        match $tensor {
            Tensor::F32($arr) => $e,
            Tensor::F64($arr) => $e,
            Tensor::I32($arr) => $e,
            Tensor::I64($arr) => $e,
        }
    };
}

impl Tensor {
    pub fn datum_type(&self) -> DatumType {
        match self {
            Tensor::F32(_) => DatumType::F32,
            Tensor::F64(_) => DatumType::F64,
            Tensor::I32(_) => DatumType::I32,
            Tensor::I64(_) => DatumType::I64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, |a| a.shape())
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        with_array!(self, |a| a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reinterprets the tensor under `shape`: same flattened element
    /// sequence, new grouping into dimensions. Fails if the element counts
    /// do not match.
    pub fn into_shape(self, shape: &[usize]) -> GraftResult<Tensor> {
        ensure!(
            self.len() == shape.iter().product::<usize>(),
            "Reshaping a tensor of shape {:?} ({} elements) to {:?}",
            self.shape(),
            self.len(),
            shape
        );
        fn regroup<T: Datum>(arr: ArrayD<T>, shape: &[usize]) -> GraftResult<ArrayD<T>> {
            let data: Vec<T> = arr.iter().copied().collect();
            Ok(ArrayD::from_shape_vec(IxDyn(shape), data)?)
        }
        Ok(match self {
            Tensor::F32(a) => Tensor::F32(regroup(a, shape)?),
            Tensor::F64(a) => Tensor::F64(regroup(a, shape)?),
            Tensor::I32(a) => Tensor::I32(regroup(a, shape)?),
            Tensor::I64(a) => Tensor::I64(regroup(a, shape)?),
        })
    }

    pub fn to_array_view<T: Datum>(&self) -> GraftResult<&ArrayD<T>> {
        T::view_from_tensor(self)
    }

    pub fn into_array<T: Datum>(self) -> GraftResult<ArrayD<T>> {
        T::array_from_tensor(self)
    }

    pub fn as_slice<T: Datum>(&self) -> GraftResult<&[T]> {
        T::view_from_tensor(self)?
            .as_slice()
            .ok_or_else(|| anyhow::format_err!("Tensor data is not contiguous"))
    }

    /// Reads the tensor as a list of dimensions. Shape arguments come as
    /// i32 or i64 tensors depending on the framework that froze the graph.
    pub fn to_i64s(&self) -> GraftResult<TVec<i64>> {
        match self {
            Tensor::I32(a) => Ok(a.iter().map(|&x| x as i64).collect()),
            Tensor::I64(a) => Ok(a.iter().copied().collect()),
            _ => bail!("Expected an integer tensor, got {:?}", self.datum_type()),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let mut content: Vec<String> =
            with_array!(self, |a| a.iter().take(4).map(|x| format!("{x:?}")).collect());
        if self.len() > 4 {
            content.push("...".to_string());
        }
        write!(
            formatter,
            "{:?}x{} [{}]",
            self.shape(),
            self.datum_type(),
            content.join(", ")
        )
    }
}

pub trait IntoArcTensor {
    fn into_arc_tensor(self) -> Arc<Tensor>;
}

impl IntoArcTensor for Tensor {
    fn into_arc_tensor(self) -> Arc<Tensor> {
        Arc::new(self)
    }
}

impl IntoArcTensor for Arc<Tensor> {
    fn into_arc_tensor(self) -> Arc<Tensor> {
        self
    }
}

pub mod litteral {
    use ndarray::{arr0, arr1, arr2};

    use super::Tensor;
    use crate::datum::Datum;

    pub fn tensor0<T: Datum>(x: T) -> Tensor {
        T::into_tensor(arr0(x).into_dyn())
    }

    pub fn tensor1<T: Datum>(xs: &[T]) -> Tensor {
        T::into_tensor(arr1(xs).into_dyn())
    }

    pub fn tensor2<T: Datum, const N: usize>(xs: &[[T; N]]) -> Tensor {
        T::into_tensor(arr2(xs).into_dyn())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};

    use super::litteral::*;
    use super::*;

    fn arange(shape: &[usize]) -> Tensor {
        let len = shape.iter().product::<usize>();
        let data: Vec<i32> = (0..len as i32).collect();
        Tensor::I32(ArrayD::from_shape_vec(IxDyn(shape), data).unwrap())
    }

    #[test]
    fn reshape_preserves_flattened_order() {
        let t = arange(&[2, 3, 4]);
        let flat: Vec<i32> = t.as_slice::<i32>().unwrap().to_vec();
        let r = t.into_shape(&[4, 6]).unwrap();
        assert_eq!(r.shape(), &[4, 6]);
        assert_eq!(r.as_slice::<i32>().unwrap(), &*flat);
    }

    #[test]
    fn reshape_to_own_shape_is_identity() {
        let t = arange(&[3, 5]);
        assert_eq!(t.clone().into_shape(&[3, 5]).unwrap(), t);
    }

    #[test]
    fn reshape_element_count_mismatch() {
        assert!(arange(&[2, 3, 4]).into_shape(&[4, 7]).is_err());
    }

    #[test]
    fn reshape_to_scalar() {
        let t = tensor1(&[12i64]);
        let r = t.into_shape(&[]).unwrap();
        assert_eq!(r.rank(), 0);
        assert_eq!(r, tensor0(12i64));
    }

    #[test]
    fn dims_from_integer_tensors() {
        assert_eq!(tensor1(&[6i32, 4]).to_i64s().unwrap(), tvec!(6, 4));
        assert_eq!(tensor1(&[6i64, 4]).to_i64s().unwrap(), tvec!(6, 4));
        assert!(tensor1(&[1.0f32]).to_i64s().is_err());
    }

    #[test]
    fn datum_type_mismatch() {
        assert!(tensor1(&[1i32, 2]).as_slice::<f32>().is_err());
    }
}
