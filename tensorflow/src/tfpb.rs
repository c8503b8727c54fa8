//! A JSON rendition of the frozen-graph format: the subset of GraphDef this
//! frontend understands.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use graft_core::internal::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDef {
    #[serde(default)]
    pub node: Vec<NodeDef>,
}

/// One serialized operation description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    pub op: String,
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub attr: HashMap<String, AttrValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    I(i64),
    Ints(Vec<i64>),
    F(f32),
    S(String),
    Type(String),
    Shape(Vec<i64>),
    Tensor(TensorProto),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TensorProto {
    pub dtype: String,
    #[serde(default)]
    pub shape: Vec<usize>,
    #[serde(default)]
    pub float_val: Vec<f32>,
    #[serde(default)]
    pub double_val: Vec<f64>,
    #[serde(default)]
    pub int_val: Vec<i32>,
    #[serde(default)]
    pub int64_val: Vec<i64>,
}

pub fn parse_datum_type(s: &str) -> GraftResult<DatumType> {
    match s {
        "DT_FLOAT" => Ok(DatumType::F32),
        "DT_DOUBLE" => Ok(DatumType::F64),
        "DT_INT32" => Ok(DatumType::I32),
        "DT_INT64" => Ok(DatumType::I64),
        _ => bail!("Unsupported datum type {}", s),
    }
}

impl TensorProto {
    pub fn to_tensor(&self) -> GraftResult<Tensor> {
        fn fill<T: Datum>(vals: &[T], shape: &[usize]) -> GraftResult<graft_ndarray::ArrayD<T>> {
            let len = shape.iter().product::<usize>();
            // a single value stands for a splat
            let data: Vec<T> = if vals.len() == 1 && len != 1 {
                vec![vals[0]; len]
            } else if vals.len() == len {
                vals.to_vec()
            } else {
                bail!("Tensor of shape {:?} carries {} values", shape, vals.len())
            };
            Ok(graft_ndarray::ArrayD::from_shape_vec(graft_ndarray::IxDyn(shape), data)?)
        }
        Ok(match parse_datum_type(&self.dtype)? {
            DatumType::F32 => Tensor::from(fill(&self.float_val, &self.shape)?),
            DatumType::F64 => Tensor::from(fill(&self.double_val, &self.shape)?),
            DatumType::I32 => Tensor::from(fill(&self.int_val, &self.shape)?),
            DatumType::I64 => Tensor::from(fill(&self.int64_val, &self.shape)?),
        })
    }
}

impl NodeDef {
    pub fn get_attr_opt(&self, name: &str) -> Option<&AttrValue> {
        self.attr.get(name)
    }

    pub fn get_attr(&self, name: &str) -> GraftResult<&AttrValue> {
        self.attr.get(name).ok_or_else(|| {
            anyhow::format_err!("Node \"{}\" expected attribute \"{}\"", self.name, name)
        })
    }

    pub fn get_attr_datum_type(&self, name: &str) -> GraftResult<DatumType> {
        match self.get_attr(name)? {
            AttrValue::Type(s) => parse_datum_type(s),
            a => bail!("Node \"{}\" attribute \"{}\" is {:?}, expected a type", self.name, name, a),
        }
    }

    /// An optional shape attribute; negative entries mark unknown dims.
    pub fn get_attr_shape_opt(&self, name: &str) -> GraftResult<Option<ShapeFactoid>> {
        match self.get_attr_opt(name) {
            None => Ok(None),
            Some(AttrValue::Shape(dims)) => Ok(Some(
                dims.iter()
                    .map(|&d| {
                        if d < 0 { GenericFact::Any } else { GenericFact::Only(d as usize) }
                    })
                    .collect(),
            )),
            Some(a) => {
                bail!("Node \"{}\" attribute \"{}\" is {:?}, expected a shape", self.name, name, a)
            }
        }
    }

    pub fn get_attr_tensor(&self, name: &str) -> GraftResult<Tensor> {
        match self.get_attr(name)? {
            AttrValue::Tensor(t) => t.to_tensor(),
            a => {
                bail!("Node \"{}\" attribute \"{}\" is {:?}, expected a tensor", self.name, name, a)
            }
        }
    }

    /// Translates the attribute map to the node attributes the inference
    /// strategies read later.
    pub fn core_attrs(&self) -> GraftResult<HashMap<String, Attr>> {
        let mut attrs = HashMap::new();
        for (name, value) in &self.attr {
            let attr = match value {
                AttrValue::I(i) => Attr::Int(*i),
                AttrValue::Ints(v) => Attr::Ints(v.iter().copied().collect()),
                AttrValue::F(f) => Attr::Float(*f),
                AttrValue::S(s) => Attr::Str(s.clone()),
                AttrValue::Type(s) => Attr::DatumType(parse_datum_type(s)?),
                AttrValue::Shape(v) => Attr::Ints(v.iter().copied().collect()),
                AttrValue::Tensor(t) => Attr::Tensor(Arc::new(t.to_tensor()?)),
            };
            attrs.insert(name.clone(), attr);
        }
        Ok(attrs)
    }
}
