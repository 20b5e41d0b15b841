//! Registration sweep: populates the node registry and the structural
//! metadata every later pass leans on.

use crate::compile::CompileContext;
use crate::diagnostics::CompileError;
use crate::id::NodeId;
use crate::registry::MetadataRegistry;
use crate::registry::MetaKey;
use crate::registry::MetaValue;
use crate::registry::NodeRegistry;
use crate::traverse::traverse;
use crate::traverse::Flow;
use crate::traverse::TraverseCtx;
use crate::traverse::Visit;
use crate::Node;

/// Registers every node, records parent/depth, flags `format_pipeline`
/// subtrees, and marks the current step with its ancestor and descendant
/// sets. Returns the current step's id when the context selected one.
pub(crate) fn run(
    root: &Node,
    ctx: &CompileContext,
    ast: &mut NodeRegistry<Node>,
    meta: &mut MetadataRegistry,
) -> Result<Option<NodeId>, CompileError> {
    let mut registration = Registration {
        ast: &mut *ast,
        meta: &mut *meta,
        current_step_path: ctx.current_step.as_deref(),
        current_step: None,
        error: None,
    };
    traverse(root, &mut registration);
    let current_step = registration.current_step;
    if let Some(error) = registration.error {
        return Err(error);
    }

    if let Some(step_id) = current_step {
        meta.set(step_id, MetaKey::CurrentStep, MetaValue::Bool(true));
        for ancestor in meta.ancestors_of(step_id) {
            meta.set(ancestor, MetaKey::AncestorOfStep, MetaValue::Bool(true));
        }
        if let Some(step_node) = ast.get(step_id).cloned() {
            let mut marker = MarkDescendants { meta, step_id };
            traverse(&step_node, &mut marker);
        }
    }
    Ok(current_step)
}

struct Registration<'a> {
    ast: &'a mut NodeRegistry<Node>,
    meta: &'a mut MetadataRegistry,
    current_step_path: Option<&'a str>,
    current_step: Option<NodeId>,
    error: Option<CompileError>,
}

impl Visit for Registration<'_> {
    fn enter(&mut self, node: &Node, ctx: &TraverseCtx<'_>) -> Flow {
        if let Err(error) = self.ast.register(node.id(), node.clone()) {
            self.error = Some(error);
            return Flow::Stop;
        }
        match ctx.ancestors.last() {
            Some(parent) => {
                self.meta
                    .set(node.id(), MetaKey::Parent, MetaValue::Id(parent.id()));
            }
            None => self.meta.remove(node.id(), MetaKey::Parent),
        }
        self.meta.set(
            node.id(),
            MetaKey::Depth,
            MetaValue::Count(ctx.ancestors.len()),
        );
        if ctx.passes_through("format_pipeline") {
            self.meta
                .set(node.id(), MetaKey::InFormatPipeline, MetaValue::Bool(true));
        }
        if self.current_step.is_none() {
            if let Some(step) = node.as_step() {
                if Some(step.path.as_str()) == self.current_step_path {
                    self.current_step = Some(node.id());
                }
            }
        }
        Flow::Continue
    }
}

struct MarkDescendants<'a> {
    meta: &'a mut MetadataRegistry,
    step_id: NodeId,
}

impl Visit for MarkDescendants<'_> {
    fn enter(&mut self, node: &Node, ctx: &TraverseCtx<'_>) -> Flow {
        if node.id() == self.step_id {
            return Flow::Continue;
        }
        // Pipeline subtrees flow their data through pseudo-nodes; they are
        // not descendants for rendering purposes.
        if ctx.passes_through("format_pipeline") {
            return Flow::Skip;
        }
        self.meta
            .set(node.id(), MetaKey::DescendantOfStep, MetaValue::Bool(true));
        Flow::Continue
    }
}
