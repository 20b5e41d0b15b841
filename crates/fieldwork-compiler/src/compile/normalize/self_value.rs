//! Pass 2: every coded field's value becomes a reference to its own
//! answer, overriding anything user-supplied.

use crate::ast::Block;
use crate::ast::BlockKind;
use crate::ast::NodeFactory;
use crate::ast::NodeKind;
use crate::ast::Reference;
use crate::ast::Value;
use crate::Node;
use std::convert::Infallible;

pub(super) fn run(root: &mut Node, factory: &NodeFactory<'_>) {
    visit(root, factory);
}

fn visit(node: &mut Node, factory: &NodeFactory<'_>) {
    let data = node.make_mut();
    if let NodeKind::Block(block) = &mut data.kind {
        if block.kind == BlockKind::Field && block.code.is_some() && !has_self_value(block) {
            block.value = Some(Value::Node(factory.self_value_reference()));
        }
    }
    let _ = data.try_for_each_child_mut::<Infallible>(&mut |_, child| {
        visit(child, factory);
        Ok(())
    });
}

fn has_self_value(block: &Block) -> bool {
    matches!(
        &block.value,
        Some(Value::Node(node))
            if node.as_reference().is_some_and(Reference::is_self_value)
    )
}
