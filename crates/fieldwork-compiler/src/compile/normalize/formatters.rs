//! Pass 3: convert formatter lists into pipelines fed by the field's
//! posted value.
//!
//! The synthesized pipeline's input references `["post", <code>]`; an
//! expression-typed code is embedded as the same node, not stringified.
//! The `formatters` property is removed from every block.

use crate::ast::BlockKind;
use crate::ast::NodeFactory;
use crate::ast::NodeKind;
use crate::ast::Value;
use crate::diagnostics::CompileError;
use crate::traverse::display_path;
use crate::traverse::PathSegment;
use crate::Node;

pub(super) fn run(root: &mut Node, factory: &NodeFactory<'_>) -> Result<(), CompileError> {
    let mut path = Vec::new();
    visit(root, factory, &mut path)
}

fn visit(
    node: &mut Node,
    factory: &NodeFactory<'_>,
    path: &mut Vec<PathSegment>,
) -> Result<(), CompileError> {
    let id = node.id();
    let data = node.make_mut();
    if let NodeKind::Block(block) = &mut data.kind {
        if let Some(formatters) = block.formatters.take() {
            if !formatters.is_empty() && block.kind == BlockKind::Field {
                let code = block.code.clone().ok_or_else(|| CompileError::InvalidNode {
                    message: "missing code".into(),
                    node: id,
                    path: display_path(path),
                })?;
                let input = factory.reference(vec![Value::String("post".into()), code]);
                block.format_pipeline = Some(factory.pipeline(input, formatters));
            }
        }
    }
    data.try_for_each_child_mut(&mut |segments, child| {
        let base = path.len();
        path.extend_from_slice(segments);
        let result = visit(child, factory, path);
        path.truncate(base);
        result
    })
}
