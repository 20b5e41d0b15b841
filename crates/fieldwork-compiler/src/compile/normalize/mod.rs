//! Normalization: the ordered rewrite passes that bring an interned tree
//! into the form the later passes assume.
//!
//! Order matters, because later passes depend on earlier invariants:
//!
//! 1. [`attach_parents`] records every node's structural parent.
//! 2. [`self_value`] points every coded field's value at its own answer.
//! 3. [`formatters`] converts formatter lists into post-fed pipelines.
//! 4. [`validation_code`] stamps validations with their owning field's
//!    code.
//!
//! Running the pipeline a second time over an already-normalized tree is a
//! no-op.

mod attach_parents;
mod formatters;
mod self_value;
mod validation_code;

use crate::ast::NodeFactory;
use crate::diagnostics::CompileError;
use crate::registry::MetadataRegistry;
use crate::Node;

pub(crate) fn run(
    root: &mut Node,
    factory: &NodeFactory<'_>,
    meta: &mut MetadataRegistry,
) -> Result<(), CompileError> {
    attach_parents::run(root, meta);
    self_value::run(root, factory);
    formatters::run(root, factory)?;
    validation_code::run(root, factory);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BlockKind;
    use crate::ast::Expression;
    use crate::ast::NodeKind;
    use crate::ast::ResolvedCode;
    use crate::ast::Value;
    use crate::id::NodeIdGenerator;
    use crate::registry::MetadataRegistry;
    use fieldwork_forms::{Block, Expr, Function, Journey, Step, Validation};

    fn normalized(journey: &Journey) -> (Node, NodeIdGenerator) {
        let ids = NodeIdGenerator::new();
        let root = {
            let factory = NodeFactory::new(&ids);
            let mut root = factory.journey(journey);
            let mut meta = MetadataRegistry::new();
            run(&mut root, &factory, &mut meta).unwrap();
            root
        };
        (root, ids)
    }

    fn field_journey() -> Journey {
        Journey::new("j").step(
            Step::new("/details").block(
                Block::field("text_input", "email")
                    .formatter(Function::transformer("trim"))
                    .validation(Validation::new().message("Enter an email address")),
            ),
        )
    }

    fn first_block(root: &Node) -> Node {
        let journey = root.as_journey().unwrap();
        let step = journey.steps[0].as_step().unwrap();
        step.blocks[0].clone()
    }

    #[test]
    fn pipeline_replaces_formatters_and_value_points_at_self() {
        let (root, _ids) = normalized(&field_journey());
        let block_node = first_block(&root);
        let block = block_node.as_block().unwrap();

        assert_eq!(block.formatters, None);
        let pipeline = block.format_pipeline.as_ref().unwrap();
        let Some(Expression::Pipeline(pipeline)) = pipeline.as_expression() else {
            panic!("expected a pipeline expression");
        };
        let input = pipeline.input.as_reference().unwrap();
        assert_eq!(input.source(), Some("post"));
        assert_eq!(input.key_str(), Some("email"));
        assert_eq!(pipeline.steps.len(), 1);

        let value = block.value.as_ref().and_then(Value::as_node).unwrap();
        assert!(value.as_reference().unwrap().is_self_value());
    }

    #[test]
    fn validations_receive_their_owning_block_code() {
        let (root, _ids) = normalized(&field_journey());
        let block_node = first_block(&root);
        let block = block_node.as_block().unwrap();
        let Some(Expression::Validation(validation)) = block.validate[0].as_expression() else {
            panic!("expected a validation expression");
        };
        assert_eq!(
            validation.resolved_block_code,
            Some(ResolvedCode::Literal("email".into())),
        );
    }

    #[test]
    fn expression_codes_are_cloned_without_sharing() {
        let journey = Journey::new("j").step(
            Step::new("/details").block(
                Block::field("text_input", Expr::answers("dynamic_code"))
                    .validation(Validation::new().message("required")),
            ),
        );
        let (root, _ids) = normalized(&journey);
        let block_node = first_block(&root);
        let block = block_node.as_block().unwrap();
        let code_node = block.code.as_ref().and_then(Value::as_node).unwrap();

        let Some(Expression::Validation(validation)) = block.validate[0].as_expression() else {
            panic!("expected a validation expression");
        };
        let Some(ResolvedCode::Expression(clone)) = &validation.resolved_block_code else {
            panic!("expected a cloned expression code");
        };
        // Same shape as the original, but a detached copy.
        match (&**clone, code_node.as_expression().unwrap()) {
            (Expression::Reference(clone), Expression::Reference(original)) => {
                assert_eq!(clone.path, original.path);
            }
            _ => panic!("expected reference expressions"),
        }
    }

    #[test]
    fn formatters_without_a_code_are_fatal() {
        let mut block = Block::basic("text_input");
        block.kind = fieldwork_forms::BlockKind::Field;
        block.formatters.push(Function::transformer("trim"));
        let journey = Journey::new("j").step(Step::new("/broken").block(block));

        let ids = NodeIdGenerator::new();
        let factory = NodeFactory::new(&ids);
        let mut root = factory.journey(&journey);
        let mut meta = MetadataRegistry::new();
        let error = run(&mut root, &factory, &mut meta).unwrap_err();
        assert!(matches!(
            error,
            CompileError::InvalidNode { ref message, .. } if message == "missing code"
        ));
    }

    #[test]
    fn normalization_is_idempotent() {
        let ids = NodeIdGenerator::new();
        let factory = NodeFactory::new(&ids);
        let mut root = factory.journey(&field_journey());
        let mut meta = MetadataRegistry::new();
        run(&mut root, &factory, &mut meta).unwrap();
        let after_first = root.clone();
        run(&mut root, &factory, &mut meta).unwrap();
        assert_eq!(root, after_first);
    }

    #[test]
    fn non_field_blocks_are_untouched() {
        let journey =
            Journey::new("j").step(Step::new("/info").block(Block::basic("inset_text")));
        let (root, _ids) = normalized(&journey);
        let block_node = first_block(&root);
        let block = block_node.as_block().unwrap();
        assert_eq!(block.kind, BlockKind::Basic);
        assert_eq!(block.value, None);
        assert_eq!(block.format_pipeline, None);
        assert!(matches!(&block_node.kind, NodeKind::Block(_)));
    }
}
