//! Interning of declarative form definitions into the syntax tree.

use super::*;
use crate::id::IdSpace;
use crate::id::NodeIdGenerator;
use fieldwork_forms as forms;

/// Converts `fieldwork-forms` definitions into id-bearing [`Node`] trees.
///
/// The factory draws ids from the compilation's [`NodeIdGenerator`], so a
/// definition interned twice through two factories over fresh generators
/// yields identical trees. Normalization passes use the same factory to
/// mint the nodes they synthesize.
pub struct NodeFactory<'a> {
    ids: &'a NodeIdGenerator,
}

impl<'a> NodeFactory<'a> {
    pub fn new(ids: &'a NodeIdGenerator) -> Self {
        NodeFactory { ids }
    }

    pub(crate) fn ids(&self) -> &'a NodeIdGenerator {
        self.ids
    }

    fn node(&self, kind: NodeKind) -> Node {
        Node::new(AstNode {
            id: self.ids.next(IdSpace::CompileAst),
            kind,
        })
    }

    pub fn journey(&self, def: &forms::Journey) -> Node {
        self.node(NodeKind::Journey(Journey {
            title: def.title.as_ref().map(|title| self.value(title)),
            path: def.path.clone(),
            on_load: self.transitions(&def.on_load, Trigger::Load),
            on_submit: self.transitions(&def.on_submit, Trigger::Submit),
            journeys: def.journeys.iter().map(|j| self.journey(j)).collect(),
            steps: def.steps.iter().map(|s| self.step(s)).collect(),
        }))
    }

    pub fn step(&self, def: &forms::Step) -> Node {
        self.node(NodeKind::Step(Step {
            path: def.path.clone(),
            title: def.title.as_ref().map(|title| self.value(title)),
            on_load: self.transitions(&def.on_load, Trigger::Load),
            on_submit: self.transitions(&def.on_submit, Trigger::Submit),
            on_action: self.transitions(&def.on_action, Trigger::Action),
            blocks: def.blocks.iter().map(|b| self.block(b)).collect(),
        }))
    }

    pub fn block(&self, def: &forms::Block) -> Node {
        let formatters = if def.formatters.is_empty() {
            None
        } else {
            Some(def.formatters.iter().map(|fun| self.function(fun)).collect())
        };
        self.node(NodeKind::Block(Block {
            variant: def.variant.clone(),
            kind: match def.kind {
                forms::BlockKind::Basic => BlockKind::Basic,
                forms::BlockKind::Field => BlockKind::Field,
                forms::BlockKind::Composite => BlockKind::Composite,
            },
            code: def.code.as_ref().map(|code| self.value(code)),
            value: def.value.as_ref().map(|value| self.value(value)),
            default_value: def.default_value.as_ref().map(|value| self.value(value)),
            formatters,
            format_pipeline: None,
            validate: def
                .validate
                .iter()
                .map(|validation| self.validation(validation))
                .collect(),
            blocks: def.blocks.iter().map(|b| self.block(b)).collect(),
            props: def
                .props
                .iter()
                .map(|(name, value)| (name.clone(), self.value(value)))
                .collect(),
        }))
    }

    pub fn expression(&self, def: &forms::Expr) -> Node {
        let expression = match def {
            forms::Expr::Reference { path } => Expression::Reference(Reference {
                path: path.iter().map(|segment| self.value(segment)).collect(),
            }),
            forms::Expr::Pipeline { input, steps } => Expression::Pipeline(Pipeline {
                input: self.expression(input),
                steps: steps.iter().map(|fun| self.function(fun)).collect(),
            }),
            forms::Expr::Collection { items } => Expression::Collection(Collection {
                items: items.iter().map(|item| self.value(item)).collect(),
            }),
            forms::Expr::Conditional {
                branches,
                otherwise,
            } => Expression::Conditional(Conditional {
                branches: branches
                    .iter()
                    .map(|branch| ConditionalBranch {
                        when: self.expression(&branch.when),
                        then: self.value(&branch.then),
                    })
                    .collect(),
                otherwise: otherwise.as_ref().map(|value| self.value(value)),
            }),
            forms::Expr::Format { template, args } => Expression::Format(Format {
                template: template.clone(),
                args: args.iter().map(|arg| self.value(arg)).collect(),
            }),
            forms::Expr::Validation(validation) => {
                return self.validation(validation);
            }
            forms::Expr::Test {
                subject,
                predicate,
                negated,
            } => Expression::Test(Test {
                subject: self.value(subject),
                predicate: self.function(predicate),
                negated: *negated,
            }),
            // A transition declared as a bare expression has no owning
            // lifecycle property; it defaults to the load trigger.
            forms::Expr::Transition(transition) => {
                return self.transition(transition, Trigger::Load);
            }
            forms::Expr::Function(function) => {
                return self.function(function);
            }
        };
        self.node(NodeKind::Expression(expression))
    }

    pub fn validation(&self, def: &forms::Validation) -> Node {
        self.node(NodeKind::Expression(Expression::Validation(Validation {
            when: def.when.as_deref().map(|when| self.expression(when)),
            message: def.message.as_ref().map(|message| self.value(message)),
            resolved_block_code: None,
        })))
    }

    pub fn transition(&self, def: &forms::Transition, trigger: Trigger) -> Node {
        self.node(NodeKind::Expression(Expression::Transition(Transition {
            trigger,
            effects: def.effects.iter().map(|fun| self.function(fun)).collect(),
        })))
    }

    pub fn function(&self, def: &forms::Function) -> Node {
        self.node(NodeKind::Function(Function {
            kind: match def.kind {
                forms::FunctionKind::Condition => FunctionKind::Condition,
                forms::FunctionKind::Transformer => FunctionKind::Transformer,
                forms::FunctionKind::Effect => FunctionKind::Effect,
                forms::FunctionKind::Generator => FunctionKind::Generator,
            },
            name: def.name.clone(),
            arguments: def.arguments.iter().map(|arg| self.value(arg)).collect(),
        }))
    }

    pub fn value(&self, def: &forms::Value) -> Value {
        match def {
            forms::Value::Null => Value::Null,
            forms::Value::Bool(b) => Value::Bool(*b),
            forms::Value::Int(i) => Value::Int(*i),
            forms::Value::Float(x) => Value::Float(*x),
            forms::Value::String(s) => Value::String(s.clone()),
            forms::Value::Expr(expr) => Value::Node(self.expression(expr)),
            forms::Value::Block(block) => Value::Node(self.block(block)),
            forms::Value::List(items) => {
                Value::List(items.iter().map(|item| self.value(item)).collect())
            }
            forms::Value::Record(map) => Value::Record(
                map.iter()
                    .map(|(key, value)| (key.clone(), self.value(value)))
                    .collect(),
            ),
        }
    }

    fn transitions(&self, defs: &[forms::Transition], trigger: Trigger) -> Vec<Node> {
        defs.iter().map(|def| self.transition(def, trigger)).collect()
    }

    /// A reference expression over an already-interned path.
    pub fn reference(&self, path: Vec<Value>) -> Node {
        self.node(NodeKind::Expression(Expression::Reference(Reference {
            path,
        })))
    }

    /// The `["answers", "@self"]` reference every field's value resolves
    /// through.
    pub fn self_value_reference(&self) -> Node {
        self.reference(vec![
            Value::String("answers".into()),
            Value::String("@self".into()),
        ])
    }

    /// A pipeline over already-interned input and steps.
    pub fn pipeline(&self, input: Node, steps: Vec<Node>) -> Node {
        self.node(NodeKind::Expression(Expression::Pipeline(Pipeline {
            input,
            steps,
        })))
    }
}
