//! Answer wiring: where each stored answer's value comes from.
//!
//! Every answer has exactly one data source: the field's format pipeline
//! when it has one, otherwise the raw posted value. A default value adds a
//! fallback edge, and every load transition in the field's scope adds an
//! effect edge, since loading may seed the answer before anything is
//! posted.

use super::WireCtx;
use crate::ast::Value;
use crate::compile::graph::DependencyGraph;
use crate::compile::graph::EdgeKind;
use crate::compile::graph::EdgeMetadata;
use crate::compile::pseudo::PseudoKind;
use crate::diagnostics::CompileDiagnostic;
use crate::diagnostics::CompileError;

pub(super) fn run(
    ctx: &WireCtx<'_>,
    graph: &mut DependencyGraph,
    diagnostics: &mut Vec<CompileDiagnostic>,
) -> Result<(), CompileError> {
    for (answer_id, pseudo) in ctx.pseudo.iter() {
        let PseudoKind::Answer {
            code,
            field_node_id,
        } = &pseudo.kind
        else {
            continue;
        };
        let block = field_node_id
            .and_then(|field_id| ctx.ast.get(field_id))
            .and_then(|node| node.as_block());

        // Data source: pipeline and post are exclusive.
        if let Some(pipeline) = block.and_then(|b| b.format_pipeline.as_ref()) {
            graph.add_edge(
                pipeline.id(),
                answer_id,
                EdgeKind::DataFlow,
                EdgeMetadata::reason("formatted post value resolves the answer"),
            )?;
        } else if let Some(post_id) = ctx.index.post(code) {
            graph.add_edge(
                post_id,
                answer_id,
                EdgeKind::DataFlow,
                EdgeMetadata::reason("posted value resolves the answer"),
            )?;
        } else {
            diagnostics.push(CompileDiagnostic::MissingCollaborator {
                node: answer_id,
                missing: format!("post pseudo-node for `{code}`"),
            });
        }

        // Fallback when nothing was posted.
        if let Some(default) = block
            .and_then(|b| b.default_value.as_ref())
            .and_then(Value::as_node)
        {
            graph.add_edge(
                default.id(),
                answer_id,
                EdgeKind::DataFlow,
                EdgeMetadata::reason("default applies when no value was posted"),
            )?;
        }

        // Lifecycle: loading may seed this answer. A field without a
        // resolvable scope gets no lifecycle edges.
        if let Some(field_id) = field_node_id {
            if let Some(scope) = ctx.scopes.scope_of(*field_id) {
                for transition in scope.on_load_chain {
                    graph.add_edge(
                        transition,
                        answer_id,
                        EdgeKind::EffectFlow,
                        EdgeMetadata::reason("load effect may seed the answer"),
                    )?;
                }
            }
        }
    }
    Ok(())
}
