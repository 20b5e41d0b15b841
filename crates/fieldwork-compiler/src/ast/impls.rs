use super::*;
use crate::id::IdSpace;
use crate::id::NodeIdGenerator;
use crate::traverse::PathSegment;

impl AstNode {
    pub fn as_journey(&self) -> Option<&Journey> {
        match &self.kind {
            NodeKind::Journey(journey) => Some(journey),
            _ => None,
        }
    }

    pub fn as_step(&self) -> Option<&Step> {
        match &self.kind {
            NodeKind::Step(step) => Some(step),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match &self.kind {
            NodeKind::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match &self.kind {
            NodeKind::Expression(expression) => Some(expression),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            NodeKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self.as_expression() {
            Some(Expression::Reference(reference)) => Some(reference),
            _ => None,
        }
    }

    /// Whether this is a block of kind `Field`.
    pub fn is_field_block(&self) -> bool {
        self.as_block().is_some_and(Block::is_field)
    }

    /// Whether this node opens a scope (journeys and steps do).
    pub fn is_scope(&self) -> bool {
        matches!(&self.kind, NodeKind::Journey(_) | NodeKind::Step(_))
    }

    /// Calls `f` for every immediate child node together with the property
    /// path leading to it from this node. `f` returns `false` to stop; the
    /// overall return mirrors that.
    pub(crate) fn for_each_child(&self, f: &mut dyn FnMut(&[PathSegment], &Node) -> bool) -> bool {
        self.kind.for_each_child(f)
    }

    /// Mutable counterpart of [`for_each_child`][Self::for_each_child],
    /// short-circuiting on the first error.
    pub(crate) fn try_for_each_child_mut<E>(
        &mut self,
        f: &mut dyn FnMut(&[PathSegment], &mut Node) -> Result<(), E>,
    ) -> Result<(), E> {
        self.kind.try_for_each_child_mut(f)
    }
}

impl Block {
    pub fn is_field(&self) -> bool {
        self.kind == BlockKind::Field
    }
}

impl Reference {
    /// The runtime source this reference reads from: its first path
    /// segment, when that segment is a string.
    pub fn source(&self) -> Option<&str> {
        self.path.first().and_then(Value::as_str)
    }

    /// The second path segment, addressing into the source.
    pub fn key(&self) -> Option<&Value> {
        self.path.get(1)
    }

    pub fn key_str(&self) -> Option<&str> {
        self.key().and_then(Value::as_str)
    }

    /// Whether this is the `["answers", "@self"]` reference a field's value
    /// is normalized to.
    pub fn is_self_value(&self) -> bool {
        self.source() == Some("answers") && self.key_str() == Some("@self")
    }
}

impl Transition {
    pub fn is_load(&self) -> bool {
        self.trigger == Trigger::Load
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl NodeKind {
    fn for_each_child(&self, f: &mut dyn FnMut(&[PathSegment], &Node) -> bool) -> bool {
        match self {
            NodeKind::Journey(journey) => {
                opt_value("title", &journey.title, f)
                    && nodes("on_load", &journey.on_load, f)
                    && nodes("on_submit", &journey.on_submit, f)
                    && nodes("journeys", &journey.journeys, f)
                    && nodes("steps", &journey.steps, f)
            }
            NodeKind::Step(step) => {
                opt_value("title", &step.title, f)
                    && nodes("on_load", &step.on_load, f)
                    && nodes("on_submit", &step.on_submit, f)
                    && nodes("on_action", &step.on_action, f)
                    && nodes("blocks", &step.blocks, f)
            }
            NodeKind::Block(block) => {
                opt_value("code", &block.code, f)
                    && opt_value("value", &block.value, f)
                    && opt_value("default_value", &block.default_value, f)
                    && block
                        .formatters
                        .as_ref()
                        .map_or(true, |list| nodes("formatters", list, f))
                    && opt_node("format_pipeline", &block.format_pipeline, f)
                    && nodes("validate", &block.validate, f)
                    && nodes("blocks", &block.blocks, f)
                    && props(&block.props, f)
            }
            NodeKind::Expression(expression) => expression_children(expression, f),
            NodeKind::Function(function) => values("arguments", &function.arguments, f),
        }
    }

    fn try_for_each_child_mut<E>(
        &mut self,
        f: &mut dyn FnMut(&[PathSegment], &mut Node) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            NodeKind::Journey(journey) => {
                opt_value_mut("title", &mut journey.title, f)?;
                nodes_mut("on_load", &mut journey.on_load, f)?;
                nodes_mut("on_submit", &mut journey.on_submit, f)?;
                nodes_mut("journeys", &mut journey.journeys, f)?;
                nodes_mut("steps", &mut journey.steps, f)
            }
            NodeKind::Step(step) => {
                opt_value_mut("title", &mut step.title, f)?;
                nodes_mut("on_load", &mut step.on_load, f)?;
                nodes_mut("on_submit", &mut step.on_submit, f)?;
                nodes_mut("on_action", &mut step.on_action, f)?;
                nodes_mut("blocks", &mut step.blocks, f)
            }
            NodeKind::Block(block) => {
                opt_value_mut("code", &mut block.code, f)?;
                opt_value_mut("value", &mut block.value, f)?;
                opt_value_mut("default_value", &mut block.default_value, f)?;
                if let Some(list) = &mut block.formatters {
                    nodes_mut("formatters", list, f)?;
                }
                if let Some(pipeline) = &mut block.format_pipeline {
                    f(&[PathSegment::name("format_pipeline")], pipeline)?;
                }
                nodes_mut("validate", &mut block.validate, f)?;
                nodes_mut("blocks", &mut block.blocks, f)?;
                for (key, value) in &mut block.props {
                    let mut prefix = vec![PathSegment::name(key.clone())];
                    value_children_mut(&mut prefix, value, f)?;
                }
                Ok(())
            }
            NodeKind::Expression(expression) => expression_children_mut(expression, f),
            NodeKind::Function(function) => {
                values_mut("arguments", &mut function.arguments, f)
            }
        }
    }
}

fn expression_children(
    expression: &Expression,
    f: &mut dyn FnMut(&[PathSegment], &Node) -> bool,
) -> bool {
    match expression {
        Expression::Reference(reference) => values("path", &reference.path, f),
        Expression::Pipeline(pipeline) => {
            f(&[PathSegment::name("input")], &pipeline.input) && nodes("steps", &pipeline.steps, f)
        }
        Expression::Collection(collection) => values("items", &collection.items, f),
        Expression::Conditional(conditional) => {
            for (index, branch) in conditional.branches.iter().enumerate() {
                if !f(
                    &[
                        PathSegment::name("branches"),
                        PathSegment::Index(index),
                        PathSegment::Key("when".into()),
                    ],
                    &branch.when,
                ) {
                    return false;
                }
                let mut prefix = vec![
                    PathSegment::name("branches"),
                    PathSegment::Index(index),
                    PathSegment::Key("then".into()),
                ];
                if !value_children(&mut prefix, &branch.then, f) {
                    return false;
                }
            }
            opt_value("otherwise", &conditional.otherwise, f)
        }
        Expression::Format(format) => values("args", &format.args, f),
        Expression::Validation(validation) => {
            opt_node("when", &validation.when, f) && opt_value("message", &validation.message, f)
        }
        Expression::Test(test) => {
            let mut prefix = vec![PathSegment::name("subject")];
            value_children(&mut prefix, &test.subject, f)
                && f(&[PathSegment::name("predicate")], &test.predicate)
        }
        Expression::Transition(transition) => nodes("effects", &transition.effects, f),
    }
}

fn expression_children_mut<E>(
    expression: &mut Expression,
    f: &mut dyn FnMut(&[PathSegment], &mut Node) -> Result<(), E>,
) -> Result<(), E> {
    match expression {
        Expression::Reference(reference) => values_mut("path", &mut reference.path, f),
        Expression::Pipeline(pipeline) => {
            f(&[PathSegment::name("input")], &mut pipeline.input)?;
            nodes_mut("steps", &mut pipeline.steps, f)
        }
        Expression::Collection(collection) => values_mut("items", &mut collection.items, f),
        Expression::Conditional(conditional) => {
            for (index, branch) in conditional.branches.iter_mut().enumerate() {
                f(
                    &[
                        PathSegment::name("branches"),
                        PathSegment::Index(index),
                        PathSegment::Key("when".into()),
                    ],
                    &mut branch.when,
                )?;
                let mut prefix = vec![
                    PathSegment::name("branches"),
                    PathSegment::Index(index),
                    PathSegment::Key("then".into()),
                ];
                value_children_mut(&mut prefix, &mut branch.then, f)?;
            }
            opt_value_mut("otherwise", &mut conditional.otherwise, f)
        }
        Expression::Format(format) => values_mut("args", &mut format.args, f),
        Expression::Validation(validation) => {
            if let Some(when) = &mut validation.when {
                f(&[PathSegment::name("when")], when)?;
            }
            opt_value_mut("message", &mut validation.message, f)
        }
        Expression::Test(test) => {
            let mut prefix = vec![PathSegment::name("subject")];
            value_children_mut(&mut prefix, &mut test.subject, f)?;
            f(&[PathSegment::name("predicate")], &mut test.predicate)
        }
        Expression::Transition(transition) => nodes_mut("effects", &mut transition.effects, f),
    }
}

fn opt_node(
    name: &'static str,
    node: &Option<Node>,
    f: &mut dyn FnMut(&[PathSegment], &Node) -> bool,
) -> bool {
    match node {
        Some(node) => f(&[PathSegment::name(name)], node),
        None => true,
    }
}

fn nodes(
    name: &'static str,
    list: &[Node],
    f: &mut dyn FnMut(&[PathSegment], &Node) -> bool,
) -> bool {
    for (index, node) in list.iter().enumerate() {
        if !f(&[PathSegment::name(name), PathSegment::Index(index)], node) {
            return false;
        }
    }
    true
}

fn nodes_mut<E>(
    name: &'static str,
    list: &mut [Node],
    f: &mut dyn FnMut(&[PathSegment], &mut Node) -> Result<(), E>,
) -> Result<(), E> {
    for (index, node) in list.iter_mut().enumerate() {
        f(&[PathSegment::name(name), PathSegment::Index(index)], node)?;
    }
    Ok(())
}

fn opt_value(
    name: &'static str,
    value: &Option<Value>,
    f: &mut dyn FnMut(&[PathSegment], &Node) -> bool,
) -> bool {
    match value {
        Some(value) => {
            let mut prefix = vec![PathSegment::name(name)];
            value_children(&mut prefix, value, f)
        }
        None => true,
    }
}

fn opt_value_mut<E>(
    name: &'static str,
    value: &mut Option<Value>,
    f: &mut dyn FnMut(&[PathSegment], &mut Node) -> Result<(), E>,
) -> Result<(), E> {
    match value {
        Some(value) => {
            let mut prefix = vec![PathSegment::name(name)];
            value_children_mut(&mut prefix, value, f)
        }
        None => Ok(()),
    }
}

fn values(
    name: &'static str,
    list: &[Value],
    f: &mut dyn FnMut(&[PathSegment], &Node) -> bool,
) -> bool {
    for (index, value) in list.iter().enumerate() {
        let mut prefix = vec![PathSegment::name(name), PathSegment::Index(index)];
        if !value_children(&mut prefix, value, f) {
            return false;
        }
    }
    true
}

fn values_mut<E>(
    name: &'static str,
    list: &mut [Value],
    f: &mut dyn FnMut(&[PathSegment], &mut Node) -> Result<(), E>,
) -> Result<(), E> {
    for (index, value) in list.iter_mut().enumerate() {
        let mut prefix = vec![PathSegment::name(name), PathSegment::Index(index)];
        value_children_mut(&mut prefix, value, f)?;
    }
    Ok(())
}

fn props(
    map: &IndexMap<String, Value>,
    f: &mut dyn FnMut(&[PathSegment], &Node) -> bool,
) -> bool {
    for (key, value) in map {
        let mut prefix = vec![PathSegment::name(key.clone())];
        if !value_children(&mut prefix, value, f) {
            return false;
        }
    }
    true
}

fn value_children(
    prefix: &mut Vec<PathSegment>,
    value: &Value,
    f: &mut dyn FnMut(&[PathSegment], &Node) -> bool,
) -> bool {
    match value {
        Value::Node(node) => f(prefix, node),
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                prefix.push(PathSegment::Index(index));
                let keep_going = value_children(prefix, item, f);
                prefix.pop();
                if !keep_going {
                    return false;
                }
            }
            true
        }
        Value::Record(map) => {
            for (key, item) in map {
                prefix.push(PathSegment::Key(key.clone()));
                let keep_going = value_children(prefix, item, f);
                prefix.pop();
                if !keep_going {
                    return false;
                }
            }
            true
        }
        _ => true,
    }
}

fn value_children_mut<E>(
    prefix: &mut Vec<PathSegment>,
    value: &mut Value,
    f: &mut dyn FnMut(&[PathSegment], &mut Node) -> Result<(), E>,
) -> Result<(), E> {
    match value {
        Value::Node(node) => f(prefix, node),
        Value::List(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                prefix.push(PathSegment::Index(index));
                let result = value_children_mut(prefix, item, f);
                prefix.pop();
                result?;
            }
            Ok(())
        }
        Value::Record(map) => {
            for (key, item) in map.iter_mut() {
                prefix.push(PathSegment::Key(key.clone()));
                let result = value_children_mut(prefix, item, f);
                prefix.pop();
                result?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Clones a subtree, assigning fresh ids to the clone and everything below
/// it. Used when a normalization pass needs its own copy of an expression.
pub(crate) fn deep_clone_with_fresh_ids(node: &Node, ids: &NodeIdGenerator) -> Node {
    let mut data = AstNode::clone(node);
    data.id = ids.next(IdSpace::CompileAst);
    let _ = data.try_for_each_child_mut::<std::convert::Infallible>(&mut |_, child| {
        *child = deep_clone_with_fresh_ids(child, ids);
        Ok(())
    });
    Node::new(data)
}

/// Clones an expression payload, re-identifying any nodes nested inside it.
/// The clone itself carries no id; it is detached metadata, not a tree
/// member.
pub(crate) fn deep_clone_expression(expression: &Expression, ids: &NodeIdGenerator) -> Expression {
    let mut clone = expression.clone();
    let _ = expression_children_mut::<std::convert::Infallible>(&mut clone, &mut |_, child| {
        *child = deep_clone_with_fresh_ids(child, ids);
        Ok(())
    });
    clone
}
