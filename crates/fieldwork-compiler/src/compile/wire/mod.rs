//! Wiring: the ordered passes that turn registries into a dependency
//! graph.
//!
//! Passes run in a fixed order (structural, answer, data, expression)
//! over the combined syntax-tree and pseudo registries. Wiring is
//! tolerant: a missing collaborator degrades to fewer edges and a
//! recorded diagnostic, and a scope that fails to resolve simply skips
//! its edges, never an error. Only a structural cycle (a programmer
//! error) aborts.

mod answer;
mod data;
mod expression;
mod structural;

use crate::compile::graph::DependencyGraph;
use crate::compile::pseudo::PseudoIndex;
use crate::compile::pseudo::PseudoNode;
use crate::compile::scope::ScopeIndex;
use crate::diagnostics::CompileDiagnostic;
use crate::diagnostics::CompileError;
use crate::registry::MetadataRegistry;
use crate::registry::NodeRegistry;
use crate::Node;

/// Everything the wiring passes read. All of it is frozen by the time
/// wiring begins.
pub(crate) struct WireCtx<'a> {
    pub ast: &'a NodeRegistry<Node>,
    pub pseudo: &'a NodeRegistry<PseudoNode>,
    pub index: &'a PseudoIndex,
    pub scopes: &'a ScopeIndex,
    pub meta: &'a MetadataRegistry,
}

pub(crate) fn run(
    ctx: &WireCtx<'_>,
    graph: &mut DependencyGraph,
    diagnostics: &mut Vec<CompileDiagnostic>,
) -> Result<(), CompileError> {
    for id in ctx.ast.ids() {
        graph.add_node(id);
    }
    for id in ctx.pseudo.ids() {
        graph.add_node(id);
    }
    structural::run(ctx, graph)?;
    answer::run(ctx, graph, diagnostics)?;
    data::run(ctx, graph, diagnostics)?;
    expression::run(ctx, graph, diagnostics)?;
    Ok(())
}
