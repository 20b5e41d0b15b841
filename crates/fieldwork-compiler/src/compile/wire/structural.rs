//! Structural wiring: one edge from each node to its immediate parent.
//!
//! Every registered node is taken as a wiring root in turn; its immediate
//! child nodes get a `Structural` edge back to it, annotated with the
//! property they hang off, and are then skipped: their own children are
//! wired when they are the root. `format_pipeline` subtrees get no
//! structural edges at all; their data flows through pseudo-nodes.

use super::WireCtx;
use crate::compile::graph::DependencyGraph;
use crate::compile::graph::EdgeKind;
use crate::compile::graph::EdgeMetadata;
use crate::diagnostics::CompileError;
use crate::id::NodeId;
use crate::registry::MetaKey;
use crate::registry::MetaValue;
use crate::traverse::traverse;
use crate::traverse::Flow;
use crate::traverse::TraverseCtx;
use crate::traverse::Visit;
use crate::Node;

pub(super) fn run(ctx: &WireCtx<'_>, graph: &mut DependencyGraph) -> Result<(), CompileError> {
    for (id, node) in ctx.ast.iter() {
        let in_pipeline = ctx
            .meta
            .get(id, MetaKey::InFormatPipeline)
            .and_then(MetaValue::as_bool)
            .unwrap_or(false);
        if in_pipeline {
            continue;
        }
        let mut wiring = Wiring {
            parent: id,
            graph: &mut *graph,
            error: None,
        };
        traverse(node, &mut wiring);
        if let Some(error) = wiring.error {
            return Err(error);
        }
    }
    Ok(())
}

struct Wiring<'a> {
    parent: NodeId,
    graph: &'a mut DependencyGraph,
    error: Option<CompileError>,
}

impl Visit for Wiring<'_> {
    fn enter(&mut self, node: &Node, ctx: &TraverseCtx<'_>) -> Flow {
        if ctx.ancestors.is_empty() {
            // The wiring root itself.
            return Flow::Continue;
        }
        let Some(property) = ctx.root_property() else {
            return Flow::Skip;
        };
        if property == "format_pipeline" {
            return Flow::Skip;
        }
        let result = self.graph.add_edge(
            node.id(),
            self.parent,
            EdgeKind::Structural,
            EdgeMetadata::property(property),
        );
        match result {
            Ok(()) => Flow::Skip,
            Err(error) => {
                self.error = Some(error);
                Flow::Stop
            }
        }
    }
}
