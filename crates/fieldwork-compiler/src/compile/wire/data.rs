//! Data wiring: load transitions that may populate a referenced data
//! source.

use super::WireCtx;
use crate::compile::graph::DependencyGraph;
use crate::compile::graph::EdgeKind;
use crate::compile::graph::EdgeMetadata;
use crate::diagnostics::CompileDiagnostic;
use crate::diagnostics::CompileError;

pub(super) fn run(
    ctx: &WireCtx<'_>,
    graph: &mut DependencyGraph,
    diagnostics: &mut Vec<CompileDiagnostic>,
) -> Result<(), CompileError> {
    for (ref_id, node) in ctx.ast.iter() {
        let Some(reference) = node.as_reference() else {
            continue;
        };
        if reference.source() != Some("data") {
            continue;
        }
        let Some(key) = reference.key_str() else {
            continue;
        };
        let Some(data_id) = ctx.index.data(key) else {
            diagnostics.push(CompileDiagnostic::MissingCollaborator {
                node: ref_id,
                missing: format!("data pseudo-node for `{key}`"),
            });
            continue;
        };
        // A reference without a resolvable scope is skipped.
        let Some(scope) = ctx.scopes.scope_of(ref_id) else {
            continue;
        };
        for transition in scope.on_load_chain {
            graph.add_edge(
                transition,
                data_id,
                EdgeKind::EffectFlow,
                EdgeMetadata::reason("load effect may populate the data source"),
            )?;
        }
    }
    Ok(())
}
