use graft_tensorflow::prelude::*;

fn analysed(graph: &str) -> InferenceModel {
    let tf = tensorflow();
    let mut model = tf.model_for_read(&mut graph.as_bytes()).unwrap();
    model.analyse().unwrap();
    model
}

fn output_fact<'m>(model: &'m InferenceModel, name: &str) -> &'m InferenceFact {
    let id = model.node_by_name(name).unwrap().id;
    model.outlet_fact(OutletId::new(id, 0)).unwrap()
}

#[test]
fn reshape_from_dim_attribute() {
    let model = analysed(
        r#"{ "node": [
            { "name": "x", "op": "Placeholder",
              "attr": { "dtype": { "type": "DT_FLOAT" }, "shape": { "shape": [2, 3, 4] } } },
            { "name": "r", "op": "Reshape", "input": ["x"],
              "attr": { "dim": { "ints": [0, -1] } } }
        ] }"#,
    );
    let fact = output_fact(&model, "r");
    assert_eq!(fact.shape, shapefactoid![2, 12]);
    assert_eq!(fact.datum_type, typefact!(DatumType::F32));
    assert_eq!(fact.value, ValueFact::Any);
}

#[test]
fn reshape_from_shape_input() {
    let model = analysed(
        r#"{ "node": [
            { "name": "x", "op": "Placeholder",
              "attr": { "dtype": { "type": "DT_FLOAT" }, "shape": { "shape": [2, 3, 4] } } },
            { "name": "shape", "op": "Const",
              "attr": { "dtype": { "type": "DT_INT32" },
                        "value": { "tensor": { "dtype": "DT_INT32", "shape": [2],
                                               "int_val": [6, 4] } } } },
            { "name": "r", "op": "Reshape", "input": ["x", "shape"] }
        ] }"#,
    );
    let fact = output_fact(&model, "r");
    assert_eq!(fact.shape, shapefactoid![6, 4]);
    assert_eq!(fact.value, ValueFact::Any);
}

#[test]
fn reshape_folds_constant_input() {
    let model = analysed(
        r#"{ "node": [
            { "name": "k", "op": "Const",
              "attr": { "dtype": { "type": "DT_INT32" },
                        "value": { "tensor": { "dtype": "DT_INT32", "shape": [6],
                                               "int_val": [1, 2, 3, 4, 5, 6] } } } },
            { "name": "r", "op": "Reshape", "input": ["k"],
              "attr": { "dim": { "ints": [2, 3] } } },
            { "name": "out", "op": "Identity", "input": ["r"] }
        ] }"#,
    );
    let fact = output_fact(&model, "r");
    let value = fact.value.concretize().unwrap();
    assert_eq!(value.shape(), &[2, 3]);
    assert_eq!(value.as_slice::<i32>().unwrap(), &[1, 2, 3, 4, 5, 6]);

    // Identity forwards dt and shape, not the folded value
    let fact = output_fact(&model, "out");
    assert_eq!(fact.shape, shapefactoid![2, 3]);
    assert_eq!(fact.datum_type, typefact!(DatumType::I32));
}

#[test]
fn reshape_with_unknown_placeholder_dim() {
    let model = analysed(
        r#"{ "node": [
            { "name": "x", "op": "Placeholder",
              "attr": { "dtype": { "type": "DT_FLOAT" }, "shape": { "shape": [-1, 3, 4] } } },
            { "name": "r", "op": "Reshape", "input": ["x"],
              "attr": { "dim": { "ints": [0, -1] } } }
        ] }"#,
    );
    let fact = output_fact(&model, "r");
    assert_eq!(fact.shape, shapefactoid![_, _]);
    assert_eq!(fact.value, ValueFact::Any);
}

#[test]
fn ambiguous_reshape_aborts_with_node_name() {
    let tf = tensorflow();
    let graph = r#"{ "node": [
        { "name": "x", "op": "Placeholder",
          "attr": { "dtype": { "type": "DT_FLOAT" }, "shape": { "shape": [2, 3, 4] } } },
        { "name": "broken", "op": "Reshape", "input": ["x"],
          "attr": { "dim": { "ints": [-1, -1] } } }
    ] }"#;
    let mut model = tf.model_for_read(&mut graph.as_bytes()).unwrap();
    let err = model.analyse().unwrap_err();
    assert!(format!("{err:?}").contains("broken"));
}

#[test]
fn unregistered_op_is_rejected() {
    let tf = tensorflow();
    let graph = r#"{ "node": [ { "name": "x", "op": "Frobnicate" } ] }"#;
    let err = tf.model_for_read(&mut graph.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("Frobnicate"));
}

#[test]
fn control_inputs_are_skipped() {
    let model = analysed(
        r#"{ "node": [
            { "name": "x", "op": "Placeholder",
              "attr": { "dtype": { "type": "DT_FLOAT" }, "shape": { "shape": [6] } } },
            { "name": "y", "op": "Placeholder",
              "attr": { "dtype": { "type": "DT_FLOAT" }, "shape": { "shape": [1] } } },
            { "name": "r", "op": "Reshape", "input": ["x", "^y"],
              "attr": { "dim": { "ints": [2, 3] } } }
        ] }"#,
    );
    let fact = output_fact(&model, "r");
    assert_eq!(fact.shape, shapefactoid![2, 3]);
}
