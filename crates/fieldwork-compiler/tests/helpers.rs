//! Shared lookups over a compilation, used across the test modules.

#![allow(dead_code)] // not every test module uses every helper

use fieldwork_compiler::ast::Expression;
use fieldwork_compiler::Compilation;
use fieldwork_compiler::NodeId;
use fieldwork_compiler::PseudoKey;
use fieldwork_compiler::PseudoKind;

/// The id of the field block with the given literal code.
pub fn field_id(compilation: &Compilation, code: &str) -> NodeId {
    compilation
        .ast
        .iter()
        .find_map(|(id, node)| {
            let block = node.as_block()?;
            if block.is_field() && block.code.as_ref()?.as_str()? == code {
                Some(id)
            } else {
                None
            }
        })
        .unwrap_or_else(|| panic!("no field block with code {code}"))
}

/// The id of the step with the given path.
pub fn step_id(compilation: &Compilation, path: &str) -> NodeId {
    compilation
        .ast
        .iter()
        .find_map(|(id, node)| (node.as_step()?.path == path).then_some(id))
        .unwrap_or_else(|| panic!("no step with path {path}"))
}

pub fn post_id(compilation: &Compilation, code: &str) -> NodeId {
    pseudo_id(compilation, |kind| {
        matches!(kind, PseudoKind::Post { code: PseudoKey::Literal(c) } if c == code)
    })
}

pub fn answer_id(compilation: &Compilation, code: &str) -> NodeId {
    pseudo_id(compilation, |kind| {
        matches!(
            kind,
            PseudoKind::Answer { code: PseudoKey::Literal(c), .. } if c == code
        )
    })
}

pub fn data_id(compilation: &Compilation, key: &str) -> NodeId {
    pseudo_id(compilation, |kind| {
        matches!(kind, PseudoKind::Data { key: k } if k == key)
    })
}

pub fn pseudo_id(
    compilation: &Compilation,
    predicate: impl Fn(&PseudoKind) -> bool,
) -> NodeId {
    compilation
        .pseudo
        .iter()
        .find_map(|(id, pseudo)| predicate(&pseudo.kind).then_some(id))
        .expect("no matching pseudo-node")
}

/// The format pipeline node of the field with the given code.
pub fn pipeline_id(compilation: &Compilation, code: &str) -> NodeId {
    let field = field_id(compilation, code);
    let node = compilation.ast.get(field).expect("field is registered");
    node.as_block()
        .and_then(|block| block.format_pipeline.as_ref())
        .map(|pipeline| pipeline.id())
        .expect("field has a format pipeline")
}

/// The ids of a journey/step's load transitions, in declaration order.
pub fn load_transition_ids(compilation: &Compilation, scope: NodeId) -> Vec<NodeId> {
    let node = compilation.ast.get(scope).expect("scope is registered");
    let transitions = match (node.as_journey(), node.as_step()) {
        (Some(journey), _) => &journey.on_load,
        (_, Some(step)) => &step.on_load,
        _ => panic!("not a scope node"),
    };
    transitions
        .iter()
        .filter(|node| {
            matches!(
                node.as_expression(),
                Some(Expression::Transition(t)) if t.is_load()
            )
        })
        .map(|node| node.id())
        .collect()
}
