use std::fmt;
use std::iter::FromIterator;
use std::sync::Arc;

use anyhow::bail;

use graft_data::prelude::*;

/// Partial information about any value.
pub trait Factoid: fmt::Debug + Clone + PartialEq + Default {
    type Concrete: fmt::Debug;

    /// Tries to transform the fact into a concrete value.
    fn concretize(&self) -> Option<Self::Concrete>;

    /// Returns whether the value is fully determined.
    fn is_concrete(&self) -> bool {
        self.concretize().is_some()
    }

    /// Tries to unify the fact with another fact of the same type.
    fn unify(&self, other: &Self) -> GraftResult<Self>;

    /// Tries to unify the fact with another fact of the same type and update
    /// self.
    ///
    /// Returns true if it actually changed something.
    fn unify_with(&mut self, other: &Self) -> GraftResult<bool> {
        let new = self.unify(other)?;
        let mut changed = false;
        if &new != self {
            changed = true;
            *self = new;
        }
        Ok(changed)
    }
}

/// Partial information about a value of type T.
#[derive(Clone, PartialEq)]
pub enum GenericFact<T: fmt::Debug + Clone + PartialEq> {
    Only(T),
    Any,
}

impl<T: Copy + Clone + fmt::Debug + PartialEq> Copy for GenericFact<T> {}

impl<T: fmt::Debug + Clone + PartialEq> Factoid for GenericFact<T> {
    type Concrete = T;

    fn concretize(&self) -> Option<T> {
        match self {
            GenericFact::Any => None,
            GenericFact::Only(m) => Some(m.clone()),
        }
    }

    fn unify(&self, other: &Self) -> GraftResult<Self> {
        let fact = match (self, other) {
            (_, GenericFact::Any) => self.clone(),
            (GenericFact::Any, _) => other.clone(),
            _ if self == other => self.clone(),
            _ => bail!("Impossible to unify {:?} with {:?}.", self, other),
        };

        Ok(fact)
    }
}

impl<T: fmt::Debug + Clone + PartialEq> Default for GenericFact<T> {
    fn default() -> Self {
        GenericFact::Any
    }
}

impl<T: fmt::Debug + Clone + PartialEq> From<T> for GenericFact<T> {
    fn from(t: T) -> Self {
        GenericFact::Only(t)
    }
}

impl<T: fmt::Debug + Clone + PartialEq> fmt::Debug for GenericFact<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenericFact::Any => write!(formatter, "?"),
            GenericFact::Only(u) => write!(formatter, "{u:?}"),
        }
    }
}

/// Partial information about a type.
pub type TypeFact = GenericFact<DatumType>;

/// Partial information about a dimension.
pub type DimFact = GenericFact<usize>;

/// Partial information about a value.
pub type ValueFact = GenericFact<Arc<Tensor>>;

/// Partial information about a shape.
///
/// A basic example of a shape fact is `shapefactoid![1, 2]`, which matches
/// exactly the shape `[1, 2]`. We can use `_` in facts to denote unknown
/// dimensions (e.g. `shapefactoid![1, 2, _]` matches any shape `[1, 2, k]`
/// with `k` a non-negative integer). We can also use `..` at the end of a
/// fact to only specify its first dimensions, so `shapefactoid![1, 2; ..]`
/// matches any shape that starts with `[1, 2]`, while `shapefactoid![..]`
/// matches any shape at all.
#[derive(Clone, PartialEq)]
pub struct ShapeFactoid {
    pub(crate) open: bool,
    pub(crate) dims: TVec<DimFact>,
}

impl ShapeFactoid {
    /// Constructs an open shape fact.
    pub fn open(dims: TVec<DimFact>) -> ShapeFactoid {
        ShapeFactoid { open: true, dims }
    }

    /// Constructs a closed shape fact.
    pub fn closed(dims: TVec<DimFact>) -> ShapeFactoid {
        ShapeFactoid { open: false, dims }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn rank(&self) -> GenericFact<usize> {
        if self.open { GenericFact::Any } else { GenericFact::Only(self.dims.len()) }
    }

    /// The fact for dimension `i`, or None when the shape is known not to
    /// have one.
    pub fn dim(&self, i: usize) -> Option<DimFact> {
        if i < self.dims.len() {
            Some(self.dims[i].clone())
        } else if self.open {
            Some(GenericFact::Any)
        } else {
            None
        }
    }

    pub fn set_dim(&mut self, i: usize, d: usize) -> bool {
        let fact = GenericFact::Only(d);
        while self.dims.len() <= i {
            self.dims.push(GenericFact::Any);
        }
        if self.dims[i] == fact {
            return false;
        }
        self.dims[i] = fact;
        true
    }

    pub fn dims(&self) -> impl Iterator<Item = &DimFact> {
        self.dims.iter()
    }
}

impl Factoid for ShapeFactoid {
    type Concrete = TVec<usize>;

    /// Tries to transform the fact into a `TVec<usize>`, or returns None.
    fn concretize(&self) -> Option<TVec<usize>> {
        if self.open {
            return None;
        }
        let dims: TVec<usize> = self.dims.iter().filter_map(|d| d.concretize()).collect();
        if dims.len() < self.dims.len() { None } else { Some(dims) }
    }

    fn unify(&self, other: &Self) -> GraftResult<Self> {
        let rank = self.dims.len().max(other.dims.len());
        let mut dims: TVec<DimFact> = tvec!();
        for i in 0..rank {
            match (self.dim(i), other.dim(i)) {
                (Some(a), Some(b)) => dims.push(a.unify(&b)?),
                (Some(a), None) | (None, Some(a)) => {
                    bail!(
                        "Impossible to unify shapes {:?} and {:?}: {:?} does not fit.",
                        self,
                        other,
                        a
                    )
                }
                (None, None) => unreachable!(),
            }
        }
        Ok(ShapeFactoid { open: self.open && other.open, dims })
    }
}

impl Default for ShapeFactoid {
    /// Returns the most general shape fact possible.
    fn default() -> ShapeFactoid {
        ShapeFactoid::open(tvec![])
    }
}

impl From<&[usize]> for ShapeFactoid {
    fn from(shape: &[usize]) -> ShapeFactoid {
        ShapeFactoid::closed(shape.iter().map(|d| GenericFact::Only(*d)).collect())
    }
}

impl From<TVec<usize>> for ShapeFactoid {
    fn from(shape: TVec<usize>) -> ShapeFactoid {
        ShapeFactoid::from(&*shape)
    }
}

impl FromIterator<DimFact> for ShapeFactoid {
    fn from_iter<I: IntoIterator<Item = DimFact>>(iter: I) -> ShapeFactoid {
        ShapeFactoid::closed(iter.into_iter().collect())
    }
}

impl fmt::Debug for ShapeFactoid {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        for (ix, d) in self.dims.iter().enumerate() {
            if ix != 0 {
                write!(formatter, "x")?;
            }
            write!(formatter, "{d:?}")?;
        }
        if self.open {
            if self.dims.is_empty() {
                write!(formatter, "..")?;
            } else {
                write!(formatter, "x..")?;
            }
        }
        Ok(())
    }
}

/// Partial information about a tensor.
///
/// The task of the analyser is to tag every edge in the graph with
/// information about the tensors that flow through it - specifically their
/// datum_type, their shape and possibly their value. During the analysis,
/// however, we might only know some of that information (say, for instance,
/// that an edge only carries tensors of rank 4, but without knowing their
/// precise dimension).
///
/// This is where tensor facts come in: they hold partial information about
/// the datum_type, shape and value of tensors that might flow through an
/// edge of the graph.
#[derive(Clone, PartialEq, Default)]
pub struct InferenceFact {
    pub datum_type: TypeFact,
    pub shape: ShapeFactoid,
    pub value: ValueFact,
}

impl InferenceFact {
    /// Constructs the most general tensor fact possible.
    pub fn new() -> InferenceFact {
        InferenceFact::default()
    }

    pub fn any() -> InferenceFact {
        InferenceFact::default()
    }

    pub fn dt(dt: DatumType) -> InferenceFact {
        InferenceFact::default().with_datum_type(dt)
    }

    pub fn dt_shape<S: Into<ShapeFactoid>>(dt: DatumType, shape: S) -> InferenceFact {
        InferenceFact::dt(dt).with_shape(shape)
    }

    pub fn shape<S: Into<ShapeFactoid>>(shape: S) -> InferenceFact {
        InferenceFact::default().with_shape(shape)
    }

    pub fn with_datum_type(self, dt: DatumType) -> InferenceFact {
        InferenceFact { datum_type: dt.into(), ..self }
    }

    pub fn with_shape<S: Into<ShapeFactoid>>(self, shape: S) -> InferenceFact {
        InferenceFact { shape: shape.into(), ..self }
    }

    pub fn without_value(self) -> InferenceFact {
        InferenceFact { value: GenericFact::Any, ..self }
    }

    pub fn format_dt_shape(&self) -> String {
        format!(
            "{:?}x{}",
            self.shape,
            self.datum_type.concretize().map(|dt| format!("{dt:?}")).unwrap_or("?".to_string())
        )
    }
}

impl Factoid for InferenceFact {
    type Concrete = Arc<Tensor>;

    /// Tries to transform the fact into a concrete value.
    fn concretize(&self) -> Option<Self::Concrete> {
        self.value.concretize()
    }

    /// Tries to unify the fact with another fact of the same type.
    fn unify(&self, other: &Self) -> GraftResult<Self> {
        let tensor = InferenceFact {
            datum_type: self.datum_type.unify(&other.datum_type)?,
            shape: self.shape.unify(&other.shape)?,
            value: self.value.unify(&other.value)?,
        };

        trace!("Unifying {:?} with {:?} into {:?}.", self, other, tensor);

        Ok(tensor)
    }
}

impl<V: Into<Arc<Tensor>>> From<V> for InferenceFact {
    fn from(v: V) -> InferenceFact {
        let v: Arc<Tensor> = v.into();
        InferenceFact {
            datum_type: GenericFact::Only(v.datum_type()),
            shape: ShapeFactoid::from(v.shape()),
            value: GenericFact::Only(v),
        }
    }
}

impl fmt::Debug for InferenceFact {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        if let Some(t) = self.value.concretize() {
            write!(formatter, "{t:?}")
        } else {
            write!(formatter, "{}", self.format_dt_shape())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_data::prelude::*;

    #[test]
    fn unify_same_datum_type() {
        let dt = TypeFact::Only(DatumType::F32);
        assert_eq!(dt.unify(&dt).unwrap(), dt);
    }

    #[test]
    fn unify_different_datum_types_only() {
        let dt1 = TypeFact::Only(DatumType::F32);
        let dt2 = TypeFact::Only(DatumType::F64);
        assert!(dt1.unify(&dt2).is_err());
    }

    #[test]
    fn unify_different_datum_types_any_left() {
        let dt = TypeFact::Only(DatumType::F32);
        assert_eq!(TypeFact::Any.unify(&dt).unwrap(), dt);
    }

    #[test]
    fn unify_different_shapes_1() {
        let s1 = ShapeFactoid::closed(tvec![GenericFact::Only(1), GenericFact::Only(2)]);
        let s2 = ShapeFactoid::closed(tvec![GenericFact::Only(1)]);
        assert!(s1.unify(&s2).is_err());
    }

    #[test]
    fn unify_different_shapes_2() {
        let s1 = ShapeFactoid::closed(tvec![GenericFact::Only(1), GenericFact::Only(2)]);
        let s2 = ShapeFactoid::closed(tvec![GenericFact::Any, GenericFact::Only(2)]);
        assert_eq!(s1.unify(&s2).unwrap(), s1);
    }

    #[test]
    fn unify_open_with_closed() {
        let open = ShapeFactoid::open(tvec![GenericFact::Only(1)]);
        let closed = ShapeFactoid::closed(tvec![GenericFact::Only(1), GenericFact::Only(2)]);
        assert_eq!(open.unify(&closed).unwrap(), closed);
    }

    #[test]
    fn fact_from_tensor_is_concrete() {
        let fact = InferenceFact::from(tensor1(&[1i32, 2, 3]));
        assert_eq!(fact.datum_type, TypeFact::Only(DatumType::I32));
        assert_eq!(fact.shape.concretize().unwrap(), tvec![3]);
        assert!(fact.is_concrete());
    }
}
