//! End-to-end compiles of small journeys, checking the produced pseudo-
//! nodes, normalized tree and graph edges together.

use crate::helpers::*;
use fieldwork_compiler::ast::Expression;
use fieldwork_compiler::ast::ResolvedCode;
use fieldwork_compiler::ast::Value;
use fieldwork_compiler::compile::compile;
use fieldwork_compiler::compile::CompileContext;
use fieldwork_compiler::EdgeKind;
use fieldwork_compiler::PseudoKind;
use fieldwork_forms::{Block, Branch, Expr, Function, Journey, Step, Transition, Validation};

#[test]
fn single_field_without_formatters() {
    let journey = Journey::new("Personal details").step(
        Step::new("/name").block(Block::field("text_input", "first_name")),
    );
    let compilation = compile(&journey, &CompileContext::for_step("/name")).unwrap();

    let post = post_id(&compilation, "first_name");
    let answer = answer_id(&compilation, "first_name");
    let field = field_id(&compilation, "first_name");
    let step = step_id(&compilation, "/name");
    let journey_id = compilation.root.id();

    // Raw post resolves the answer; the field hangs off the step, the step
    // off the journey.
    assert!(compilation.graph.has_edge(post, answer, EdgeKind::DataFlow));
    assert!(compilation
        .graph
        .has_edge(field, step, EdgeKind::Structural));
    assert!(compilation
        .graph
        .has_edge(step, journey_id, EdgeKind::Structural));

    // The field's value resolves through its own answer.
    let field_node = compilation.ast.get(field).unwrap();
    let value = field_node
        .as_block()
        .unwrap()
        .value
        .as_ref()
        .and_then(Value::as_node)
        .unwrap();
    assert!(value.as_reference().unwrap().is_self_value());
}

#[test]
fn field_with_formatter_and_default() {
    let journey = Journey::new("Contact details").step(
        Step::new("/email").block(
            Block::field("text_input", "email")
                .formatter(Function::transformer("trim"))
                .default_value(Expr::Conditional {
                    branches: vec![Branch::new(
                        Expr::test(Expr::data("user.email"), Function::condition("is_present")),
                        Expr::data("user.email"),
                    )],
                    otherwise: None,
                }),
        ),
    );
    let compilation = compile(&journey, &CompileContext::for_step("/email")).unwrap();

    let field = field_id(&compilation, "email");
    let block_node = compilation.ast.get(field).unwrap();
    let block = block_node.as_block().unwrap();

    // Formatters are gone; the pipeline reads the posted value.
    assert_eq!(block.formatters, None);
    let pipeline_node = block.format_pipeline.as_ref().unwrap();
    let Some(Expression::Pipeline(pipeline)) = pipeline_node.as_expression() else {
        panic!("expected a pipeline expression");
    };
    let input = pipeline.input.as_reference().unwrap();
    assert_eq!(input.source(), Some("post"));
    assert_eq!(input.key_str(), Some("email"));
    assert_eq!(pipeline.steps.len(), 1);

    // Pipeline and default feed the answer; raw post does not.
    let post = post_id(&compilation, "email");
    let answer = answer_id(&compilation, "email");
    let default = block
        .default_value
        .as_ref()
        .and_then(Value::as_node)
        .unwrap()
        .id();
    assert!(compilation
        .graph
        .has_edge(pipeline_node.id(), answer, EdgeKind::DataFlow));
    assert!(compilation
        .graph
        .has_edge(default, answer, EdgeKind::DataFlow));
    assert!(!compilation.graph.has_edge(post, answer, EdgeKind::DataFlow));
}

#[test]
fn field_under_two_load_transitions() {
    let journey = Journey::new("Accommodation")
        .on_load(Transition::new().effect(Function::effect("load_assessment")))
        .step(
            Step::new("/address")
                .on_load(Transition::new().effect(Function::effect("load_addresses")))
                .block(Block::field("text_input", "address")),
        );
    let compilation = compile(&journey, &CompileContext::for_step("/address")).unwrap();

    let field = field_id(&compilation, "address");
    let step = step_id(&compilation, "/address");
    let journey_id = compilation.root.id();
    let journey_transition = load_transition_ids(&compilation, journey_id)[0];
    let step_transition = load_transition_ids(&compilation, step)[0];

    // Document order: the journey's transition precedes the step's.
    let scope = compilation.scopes.scope_of(field).unwrap();
    assert_eq!(
        scope.on_load_chain,
        vec![journey_transition, step_transition],
    );

    let post = post_id(&compilation, "address");
    let answer = answer_id(&compilation, "address");
    assert!(compilation
        .graph
        .has_edge(journey_transition, answer, EdgeKind::EffectFlow));
    assert!(compilation
        .graph
        .has_edge(step_transition, answer, EdgeKind::EffectFlow));
    assert!(compilation.graph.has_edge(post, answer, EdgeKind::DataFlow));
}

#[test]
fn data_reference_under_a_loading_journey() {
    let journey = Journey::new("Profile")
        .on_load(Transition::new().effect(Function::effect("load_user")))
        .step(
            Step::new("/summary").block(
                Block::basic("summary_text").prop("content", Expr::data("user.email")),
            ),
        );
    let compilation = compile(&journey, &CompileContext::for_step("/summary")).unwrap();

    let data = data_id(&compilation, "user.email");
    let transition = load_transition_ids(&compilation, compilation.root.id())[0];
    assert!(compilation
        .graph
        .has_edge(transition, data, EdgeKind::EffectFlow));

    // The reference expression reads the loaded data.
    let reference = compilation
        .ast
        .iter()
        .find_map(|(id, node)| {
            let r = node.as_reference()?;
            (r.source() == Some("data")).then_some(id)
        })
        .unwrap();
    assert!(compilation
        .graph
        .has_edge(data, reference, EdgeKind::DataFlow));
}

#[test]
fn radio_item_reveal_block_hangs_off_the_radio() {
    let journey = Journey::new("Choices").step(
        Step::new("/choice").block(
            Block::field("radio_input", "choice").prop(
                "items",
                fieldwork_forms::Value::List(vec![
                    fieldwork_forms::Value::Record({
                        let mut map = fieldwork_forms::IndexMap::new();
                        map.insert("value".to_owned(), "yes".into());
                        map
                    }),
                    fieldwork_forms::Value::Record({
                        let mut map = fieldwork_forms::IndexMap::new();
                        map.insert("value".to_owned(), "other".into());
                        map.insert(
                            "block".to_owned(),
                            Block::field("text_input", "detail").into(),
                        );
                        map
                    }),
                ]),
            ),
        ),
    );
    let compilation = compile(&journey, &CompileContext::for_step("/choice")).unwrap();

    // The reveal field inside items[1].block is structurally a child of
    // the radio, not of the step, and still mints its pseudo-nodes.
    let radio = field_id(&compilation, "choice");
    let step = step_id(&compilation, "/choice");
    let detail = field_id(&compilation, "detail");
    let edges = compilation.graph.edges_between(detail, radio);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Structural);
    assert_eq!(edges[0].metadata.property_name.as_deref(), Some("items"));
    assert!(!compilation.graph.has_edge(detail, step, EdgeKind::Structural));

    let post = post_id(&compilation, "detail");
    let answer = answer_id(&compilation, "detail");
    assert!(compilation.graph.has_edge(post, answer, EdgeKind::DataFlow));
    assert!(compilation
        .pseudo
        .get(answer)
        .is_some_and(|pseudo| matches!(
            &pseudo.kind,
            PseudoKind::Answer { field_node_id: Some(id), .. } if *id == detail
        )));
}

#[test]
fn journeys_deserialized_from_json_compile_identically() -> anyhow::Result<()> {
    let json = r#"{
        "title": "Money",
        "path": "/money",
        "steps": [
            {
                "path": "/income",
                "blocks": [
                    {
                        "variant": "text_input",
                        "kind": "field",
                        "code": "income",
                        "formatters": [
                            { "kind": "transformer", "name": "strip_currency" }
                        ]
                    }
                ]
            }
        ]
    }"#;
    let deserialized: Journey = serde_json::from_str(json)?;
    let built = Journey::new("Money").path("/money").step(
        Step::new("/income").block(
            Block::field("text_input", "income")
                .formatter(Function::transformer("strip_currency")),
        ),
    );
    assert_eq!(deserialized, built);

    let ctx = CompileContext::for_step("/income");
    let from_json = compile(&deserialized, &ctx)?;
    let from_builders = compile(&built, &ctx)?;
    assert_eq!(from_json.root, from_builders.root);
    Ok(())
}

#[test]
fn validation_under_a_dynamic_code_is_stamped_with_a_clone() {
    let journey = Journey::new("Dynamic").step(
        Step::new("/dynamic").block(
            Block::field("text_input", Expr::answers("dynamic_code")).validation(
                Validation::new()
                    .when(Expr::test(Expr::self_value(), Function::condition("is_blank")))
                    .message("Required"),
            ),
        ),
    );
    let compilation = compile(&journey, &CompileContext::for_step("/dynamic")).unwrap();

    let (field_node_id, block) = compilation
        .ast
        .iter()
        .find_map(|(id, node)| node.as_block().map(|b| (id, b.clone())))
        .unwrap();
    let code_node = block.code.as_ref().and_then(Value::as_node).unwrap();
    let Some(Expression::Validation(validation)) = block.validate[0].as_expression() else {
        panic!("expected a validation expression");
    };
    let Some(ResolvedCode::Expression(clone)) = &validation.resolved_block_code else {
        panic!("expected a cloned expression code");
    };

    // Same path, detached identity, no node id on the clone itself.
    let Expression::Reference(cloned_reference) = &**clone else {
        panic!("expected a reference clone");
    };
    let original_reference = code_node.as_reference().unwrap();
    assert_eq!(cloned_reference.path, original_reference.path);
    assert_eq!(cloned_reference.source(), Some("answers"));
    assert_eq!(cloned_reference.key_str(), Some("dynamic_code"));

    // The field's pseudo-nodes key by the code expression node.
    let answer = pseudo_id(&compilation, |kind| {
        matches!(
            kind,
            PseudoKind::Answer {
                code: fieldwork_compiler::PseudoKey::Expr(id),
                ..
            } if *id == code_node.id()
        )
    });
    assert!(compilation
        .pseudo
        .get(answer)
        .is_some_and(|pseudo| matches!(
            &pseudo.kind,
            PseudoKind::Answer { field_node_id: Some(field), .. } if *field == field_node_id
        )));
}
