//! Pass 4: stamp every validation with the code of its nearest enclosing
//! field block.
//!
//! Literal codes are copied; expression codes are deep-cloned with fresh
//! ids below the clone and no id on the clone itself. Validations outside
//! any coded field are left unstamped.

use crate::ast::deep_clone_expression;
use crate::ast::BlockKind;
use crate::ast::Expression;
use crate::ast::NodeFactory;
use crate::ast::NodeKind;
use crate::ast::ResolvedCode;
use crate::ast::Value;
use crate::Node;
use std::convert::Infallible;

pub(super) fn run(root: &mut Node, factory: &NodeFactory<'_>) {
    visit(root, factory, None);
}

fn visit(node: &mut Node, factory: &NodeFactory<'_>, enclosing_code: Option<&Value>) {
    let data = node.make_mut();
    let own_code = match &data.kind {
        NodeKind::Block(block) if block.kind == BlockKind::Field => block.code.clone(),
        _ => None,
    };
    if let NodeKind::Expression(Expression::Validation(validation)) = &mut data.kind {
        if validation.resolved_block_code.is_none() {
            if let Some(code) = enclosing_code {
                validation.resolved_block_code = resolve(code, factory);
            }
        }
    }
    let code_for_children = own_code.as_ref().or(enclosing_code);
    let _ = data.try_for_each_child_mut::<Infallible>(&mut |_, child| {
        visit(child, factory, code_for_children);
        Ok(())
    });
}

fn resolve(code: &Value, factory: &NodeFactory<'_>) -> Option<ResolvedCode> {
    match code {
        Value::String(code) => Some(ResolvedCode::Literal(code.clone())),
        Value::Node(node) => node
            .as_expression()
            .map(|expression| {
                ResolvedCode::Expression(Box::new(deep_clone_expression(
                    expression,
                    factory.ids(),
                )))
            }),
        _ => None,
    }
}
