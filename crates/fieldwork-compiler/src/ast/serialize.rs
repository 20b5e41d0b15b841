//! Compact tree rendering of syntax-tree nodes, for debugging and tests.

use super::*;
use crate::traverse::display_path;
use std::fmt;

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, self)?;
        write_children(f, self, 1)
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    let mut result = Ok(());
    node.for_each_child(&mut |path, child| {
        result = (|| {
            writeln!(f)?;
            for _ in 0..depth {
                write!(f, "  ")?;
            }
            write!(f, "{}: ", display_path(path))?;
            write_summary(f, child)?;
            write_children(f, child, depth + 1)
        })();
        result.is_ok()
    });
    result
}

fn write_summary(f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
    match &node.kind {
        NodeKind::Journey(journey) => {
            write!(f, "journey {}", node.id())?;
            if let Some(path) = &journey.path {
                write!(f, " path={path}")?;
            }
            Ok(())
        }
        NodeKind::Step(step) => write!(f, "step {} path={}", node.id(), step.path),
        NodeKind::Block(block) => {
            let kind = match block.kind {
                BlockKind::Basic => "basic",
                BlockKind::Field => "field",
                BlockKind::Composite => "composite",
            };
            write!(f, "block {} variant={} kind={kind}", node.id(), block.variant)?;
            if let Some(Value::String(code)) = &block.code {
                write!(f, " code={code}")?;
            }
            Ok(())
        }
        NodeKind::Expression(expression) => write_expression_summary(f, node, expression),
        NodeKind::Function(function) => {
            let kind = match function.kind {
                FunctionKind::Condition => "condition",
                FunctionKind::Transformer => "transformer",
                FunctionKind::Effect => "effect",
                FunctionKind::Generator => "generator",
            };
            write!(f, "function {} {kind} {}", node.id(), function.name)
        }
    }
}

fn write_expression_summary(
    f: &mut fmt::Formatter<'_>,
    node: &Node,
    expression: &Expression,
) -> fmt::Result {
    match expression {
        Expression::Reference(reference) => {
            write!(f, "reference {} [", node.id())?;
            for (index, segment) in reference.path.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                match segment {
                    Value::String(s) => write!(f, "{s}")?,
                    Value::Node(n) => write!(f, "({})", n.id())?,
                    other => write!(f, "{other:?}")?,
                }
            }
            write!(f, "]")
        }
        Expression::Pipeline(_) => write!(f, "pipeline {}", node.id()),
        Expression::Collection(_) => write!(f, "collection {}", node.id()),
        Expression::Conditional(_) => write!(f, "conditional {}", node.id()),
        Expression::Format(format) => {
            write!(f, "format {} template={:?}", node.id(), format.template)
        }
        Expression::Validation(validation) => {
            write!(f, "validation {}", node.id())?;
            match &validation.resolved_block_code {
                Some(ResolvedCode::Literal(code)) => write!(f, " block_code={code}"),
                Some(ResolvedCode::Expression(_)) => write!(f, " block_code=<expression>"),
                None => Ok(()),
            }
        }
        Expression::Test(test) => {
            if test.negated {
                write!(f, "test {} negated", node.id())
            } else {
                write!(f, "test {}", node.id())
            }
        }
        Expression::Transition(transition) => {
            let trigger = match transition.trigger {
                Trigger::Load => "load",
                Trigger::Submit => "submit",
                Trigger::Action => "action",
            };
            write!(f, "transition {} on={trigger}", node.id())
        }
    }
}
