use std::collections::HashMap;
use std::{fs, path};

use anyhow::{Context, bail};

use graft_core::internal::*;

use crate::tfpb::{GraphDef, NodeDef};

/// What an extractor hands back for one serialized operation: the canonical
/// internal type tag, and the inference strategy the propagation pass will
/// invoke once the node's inputs are resolved.
#[derive(Debug)]
pub struct ExtractedOp {
    pub op_type: String,
    pub infer: Box<dyn InferenceOp>,
}

/// Extractors all share one calling convention, whether or not they inspect
/// the serialized description.
pub type OpExtractor = fn(&ParsingContext, &NodeDef) -> GraftResult<ExtractedOp>;

pub struct ParsingContext<'a> {
    pub graph: &'a GraphDef,
}

#[derive(Default)]
pub struct TfOpRegister(pub HashMap<String, OpExtractor>);

impl TfOpRegister {
    pub fn insert(&mut self, s: &'static str, ext: OpExtractor) {
        self.0.insert(s.to_string(), ext);
    }
}

pub struct Tensorflow {
    pub op_register: TfOpRegister,
}

impl Tensorflow {
    /// Loads a frozen graph from a file.
    pub fn model_for_path(&self, p: impl AsRef<path::Path>) -> GraftResult<InferenceModel> {
        self.model_for_read(&mut fs::File::open(p)?)
    }

    /// Loads a frozen graph from a reader.
    pub fn model_for_read(&self, r: &mut dyn std::io::Read) -> GraftResult<InferenceModel> {
        let graph: GraphDef = serde_json::from_reader(r).context("Parsing graph definition")?;
        self.model_for_graphdef(&graph)
    }

    pub fn model_for_graphdef(&self, graph: &GraphDef) -> GraftResult<InferenceModel> {
        let mut model = InferenceModel::default();
        let ctx = ParsingContext { graph };
        for pbnode in &graph.node {
            let Some(extractor) = self.op_register.0.get(&pbnode.op) else {
                bail!(
                    "No extractor registered for operation {} (node \"{}\")",
                    pbnode.op,
                    pbnode.name
                );
            };
            let extracted = extractor(&ctx, pbnode)
                .with_context(|| format!("While building node \"{}\"", pbnode.name))?;
            trace!("Building node \"{}\" as {}", pbnode.name, extracted.op_type);
            let node_id = model.add_node(
                pbnode.name.clone(),
                extracted.op_type,
                extracted.infer,
                pbnode.core_attrs()?,
                1,
            )?;

            // Each input is "node:src_output", with ":0" omitted; "^node"
            // marks a control input carrying no tensor.
            let mut slot = 0;
            for i in &pbnode.input {
                if let Some(ctrl) = i.strip_prefix('^') {
                    debug!("Skipping control input {} of \"{}\"", ctrl, pbnode.name);
                    continue;
                }
                let (name, src_slot) = match i.split_once(':') {
                    Some((name, s)) => (name, s.parse::<usize>()?),
                    None => (i.as_str(), 0),
                };
                let prec = model.node_by_name(name)?.id;
                model.add_edge(OutletId::new(prec, src_slot), InletId::new(node_id, slot))?;
                slot += 1;
            }
        }
        Ok(model)
    }
}
