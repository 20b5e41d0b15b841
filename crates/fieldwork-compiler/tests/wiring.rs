//! Edge-level behaviour of the wiring passes.

use crate::helpers::*;
use fieldwork_compiler::compile::compile;
use fieldwork_compiler::compile::CompileContext;
use fieldwork_compiler::EdgeKind;
use fieldwork_compiler::PseudoKind;
use fieldwork_forms::{Block, Expr, Function, Journey, Step, Transition};

#[test]
fn pipeline_subtrees_get_no_structural_edges() {
    let journey = Journey::new("Piped").step(
        Step::new("/piped").block(
            Block::field("text_input", "code")
                .formatter(Function::transformer("trim"))
                .formatter(Function::transformer("uppercase")),
        ),
    );
    let compilation = compile(&journey, &CompileContext::new()).unwrap();

    let field = field_id(&compilation, "code");
    let pipeline = pipeline_id(&compilation, "code");

    // No structural edge into the block for the pipeline, and none among
    // the pipeline's own children.
    assert!(compilation.graph.edges_between(pipeline, field).is_empty());
    for (from, to, edge) in compilation.graph.edges() {
        if edge.kind != EdgeKind::Structural {
            continue;
        }
        assert_ne!(to, pipeline, "structural edge {from} -> {to} into the pipeline");
    }

    // The pipeline still feeds the answer.
    let answer = answer_id(&compilation, "code");
    assert!(compilation
        .graph
        .has_edge(pipeline, answer, EdgeKind::DataFlow));
}

#[test]
fn pipeline_input_reads_the_post_pseudo_node() {
    let journey = Journey::new("Piped").step(
        Step::new("/piped").block(
            Block::field("text_input", "email").formatter(Function::transformer("trim")),
        ),
    );
    let compilation = compile(&journey, &CompileContext::new()).unwrap();

    let post = post_id(&compilation, "email");
    let pipeline = pipeline_id(&compilation, "email");
    assert!(compilation
        .graph
        .has_edge(post, pipeline, EdgeKind::DataFlow));
}

#[test]
fn self_references_resolve_to_the_enclosing_field_answer() {
    let journey = Journey::new("Selfie")
        .step(Step::new("/selfie").block(Block::field("text_input", "me")));
    let compilation = compile(&journey, &CompileContext::new()).unwrap();

    let answer = answer_id(&compilation, "me");
    let value_reference = compilation
        .ast
        .iter()
        .find_map(|(id, node)| {
            let r = node.as_reference()?;
            r.is_self_value().then_some(id)
        })
        .unwrap();
    assert!(compilation
        .graph
        .has_edge(answer, value_reference, EdgeKind::DataFlow));
}

#[test]
fn query_and_params_references_mint_and_wire_pseudo_nodes() {
    let journey = Journey::new("Addressed").step(
        Step::new("/addressed").block(
            Block::basic("summary_text")
                .prop("subject", Expr::query("subject"))
                .prop("crn", Expr::params("crn")),
        ),
    );
    let compilation = compile(&journey, &CompileContext::new()).unwrap();

    let query = pseudo_id(&compilation, |kind| {
        matches!(kind, PseudoKind::Query { name } if name == "subject")
    });
    let params = pseudo_id(&compilation, |kind| {
        matches!(kind, PseudoKind::Params { name } if name == "crn")
    });

    let reference_reading = |pseudo| {
        compilation
            .ast
            .iter()
            .filter_map(|(id, node)| node.as_reference().map(|_| id))
            .any(|id| compilation.graph.has_edge(pseudo, id, EdgeKind::DataFlow))
    };
    assert!(reference_reading(query));
    assert!(reference_reading(params));
}

#[test]
fn cross_step_answer_references_wire_without_a_field() {
    let journey = Journey::new("Crossed")
        .on_load(Transition::new().effect(Function::effect("load_everything")))
        .step(Step::new("/first").block(Block::field("text_input", "local")))
        .step(
            Step::new("/second").block(
                Block::basic("summary_text").prop("remote", Expr::answers("far.away")),
            ),
        );
    let compilation = compile(&journey, &CompileContext::new()).unwrap();

    let remote = answer_id(&compilation, "far.away");
    assert!(compilation.pseudo.get(remote).is_some_and(|pseudo| matches!(
        pseudo.kind,
        PseudoKind::Answer {
            field_node_id: None,
            ..
        }
    )));
    // No field means no scope, so no lifecycle edges were fabricated.
    assert!(!compilation
        .graph
        .dependencies_of(remote)
        .any(|from| compilation.graph.has_edge(from, remote, EdgeKind::EffectFlow)));

    // The local field's answer still gets its lifecycle edge.
    let local = answer_id(&compilation, "local");
    let transition = load_transition_ids(&compilation, compilation.root.id())[0];
    assert!(compilation
        .graph
        .has_edge(transition, local, EdgeKind::EffectFlow));
}

#[test]
fn effects_order_loads_before_answers_are_observed() {
    let journey = Journey::new("Ordered")
        .on_load(Transition::new().effect(Function::effect("seed")))
        .step(Step::new("/ordered").block(Block::field("text_input", "seeded")));
    let compilation = compile(&journey, &CompileContext::new()).unwrap();

    let transition = load_transition_ids(&compilation, compilation.root.id())[0];
    let answer = answer_id(&compilation, "seeded");
    let edges = compilation.graph.edges_between(transition, answer);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::EffectFlow);
    assert!(edges[0].metadata.reason.is_some());
}

#[test]
fn structural_metadata_names_the_hosting_property() {
    let journey = Journey::new("Named")
        .on_load(Transition::new().effect(Function::effect("load")))
        .step(Step::new("/named").block(Block::basic("divider")));
    let compilation = compile(&journey, &CompileContext::new()).unwrap();

    let step = step_id(&compilation, "/named");
    let root = compilation.root.id();
    let step_edge = &compilation.graph.edges_between(step, root)[0];
    assert_eq!(step_edge.metadata.property_name.as_deref(), Some("steps"));

    let transition = load_transition_ids(&compilation, root)[0];
    let transition_edge = &compilation.graph.edges_between(transition, root)[0];
    assert_eq!(
        transition_edge.metadata.property_name.as_deref(),
        Some("on_load"),
    );
}
