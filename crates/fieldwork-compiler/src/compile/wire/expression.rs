//! Expression wiring: which externally-provided values each expression
//! ultimately depends on.
//!
//! For every expression node, its reference descendants (the node itself
//! included, when it is a reference) are resolved to pseudo-nodes by
//! source and key, and each resolution adds a `DataFlow` edge from the
//! pseudo-node to the expression. `["answers", "@self"]` resolves through
//! the nearest enclosing field block's code; references that resolve to
//! nothing degrade silently.

use super::WireCtx;
use crate::ast::Reference;
use crate::ast::Value;
use crate::compile::graph::DependencyGraph;
use crate::compile::graph::EdgeKind;
use crate::compile::graph::EdgeMetadata;
use crate::compile::pseudo::code_key;
use crate::compile::pseudo::PseudoKey;
use crate::diagnostics::CompileDiagnostic;
use crate::diagnostics::CompileError;
use crate::id::NodeId;
use crate::traverse::traverse;
use crate::traverse::Flow;
use crate::traverse::TraverseCtx;
use crate::traverse::Visit;
use crate::Node;

pub(super) fn run(
    ctx: &WireCtx<'_>,
    graph: &mut DependencyGraph,
    diagnostics: &mut Vec<CompileDiagnostic>,
) -> Result<(), CompileError> {
    for (expr_id, node) in ctx.ast.iter() {
        // Function nodes are expressions for wiring purposes: their
        // arguments may read external values too.
        if node.as_expression().is_none() && node.as_function().is_none() {
            continue;
        }
        for (ref_id, reference) in reference_descendants(node) {
            let Some(source) = reference.source() else {
                continue;
            };
            let pseudo = match source {
                "post" => reference_key(&reference).and_then(|key| ctx.index.post(&key)),
                "answers" => answer_key(ctx, ref_id, &reference)
                    .and_then(|key| ctx.index.answer(&key)),
                "data" => reference.key_str().and_then(|key| ctx.index.data(key)),
                "query" => reference.key_str().and_then(|name| ctx.index.query(name)),
                "params" => reference.key_str().and_then(|name| ctx.index.params(name)),
                // Not an externally-provided source.
                _ => continue,
            };
            match pseudo {
                Some(pseudo_id) => {
                    graph.add_edge(
                        pseudo_id,
                        expr_id,
                        EdgeKind::DataFlow,
                        EdgeMetadata::reason("external value feeds the expression"),
                    )?;
                }
                None => diagnostics.push(CompileDiagnostic::MissingCollaborator {
                    node: ref_id,
                    missing: format!("{source} pseudo-node"),
                }),
            }
        }
    }
    Ok(())
}

/// Every reference at or below `node`, in traversal order.
fn reference_descendants(node: &Node) -> Vec<(NodeId, Reference)> {
    struct Collect {
        references: Vec<(NodeId, Reference)>,
    }
    impl Visit for Collect {
        fn enter(&mut self, node: &Node, _ctx: &TraverseCtx<'_>) -> Flow {
            if let Some(reference) = node.as_reference() {
                self.references.push((node.id(), reference.clone()));
            }
            Flow::Continue
        }
    }
    let mut collect = Collect {
        references: Vec::new(),
    };
    traverse(node, &mut collect);
    collect.references
}

fn reference_key(reference: &Reference) -> Option<PseudoKey> {
    match reference.key()? {
        Value::String(code) => Some(PseudoKey::Literal(code.clone())),
        Value::Node(node) => Some(PseudoKey::Expr(node.id())),
        _ => None,
    }
}

/// The answer key a reference resolves to; `@self` resolves through the
/// nearest enclosing field block with a code.
fn answer_key(ctx: &WireCtx<'_>, ref_id: NodeId, reference: &Reference) -> Option<PseudoKey> {
    if reference.key_str() == Some("@self") {
        for ancestor in ctx.meta.ancestors_of(ref_id) {
            if let Some(block) = ctx.ast.get(ancestor).and_then(|node| node.as_block()) {
                if block.is_field() {
                    if let Some(key) = code_key(block) {
                        return Some(key);
                    }
                }
            }
        }
        return None;
    }
    reference_key(reference)
}
