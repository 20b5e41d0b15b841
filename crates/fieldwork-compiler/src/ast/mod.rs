//! Syntax tree for compiled form definitions.
//!
//! The compiler interns a `fieldwork-forms` definition into this tree: every
//! node gains a [`NodeId`] and the declarative shapes become tagged variants
//! with typed payloads. Structural nodes ([`Journey`], [`Step`], [`Block`])
//! carry the containment hierarchy; [`Expression`]s describe runtime
//! evaluation; [`Function`]s are opaque named calls resolved by the runtime.
//!
//! Nodes are wrapped in [`Node`], a reference-counted smart pointer, so the
//! registries can share subtrees with the tree itself without cloning them.
//! Mutation happens only inside the normalization passes, while each node is
//! still uniquely owned.

use crate::id::NodeId;
use crate::Node;
use indexmap::IndexMap;

mod from_def;
mod impls;
mod serialize;

pub use self::from_def::NodeFactory;
pub(crate) use self::impls::deep_clone_expression;

/// A syntax-tree node: an id plus the variant payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// The closed set of node families.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Journey(Journey),
    Step(Step),
    Block(Block),
    Expression(Expression),
    Function(Function),
}

/// A property value: a scalar, a child node, or an ordered container whose
/// leaves may themselves be nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Node(Node),
    List(Vec<Value>),
    Record(IndexMap<String, Value>),
}

/// The root structural container. Journeys own steps and may nest further
/// journeys; transitions declared here scope over everything below.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub title: Option<Value>,
    pub path: Option<String>,
    pub on_load: Vec<Node>,
    pub on_submit: Vec<Node>,
    pub journeys: Vec<Node>,
    pub steps: Vec<Node>,
}

/// One page of a journey, addressed by its URL path.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub path: String,
    pub title: Option<Value>,
    pub on_load: Vec<Node>,
    pub on_submit: Vec<Node>,
    pub on_action: Vec<Node>,
    pub blocks: Vec<Node>,
}

/// Distinguishes input-collecting blocks from purely presentational ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Basic,
    Field,
    Composite,
}

/// A UI-bearing node. `variant` names a component in the host's component
/// registry and is opaque to the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub variant: String,
    pub kind: BlockKind,
    /// The stable key a field's submitted and stored value is addressed by;
    /// a string scalar, or an embedded expression for dynamic codes.
    pub code: Option<Value>,
    /// After normalization, always a reference to `["answers", "@self"]`
    /// on field blocks.
    pub value: Option<Value>,
    pub default_value: Option<Value>,
    /// Present only before normalization; converted into `format_pipeline`.
    pub formatters: Option<Vec<Node>>,
    /// Synthesized pipeline feeding the posted value through the field's
    /// formatters. Wired through pseudo-nodes, not structurally.
    pub format_pipeline: Option<Node>,
    pub validate: Vec<Node>,
    pub blocks: Vec<Node>,
    /// Component-specific properties in declaration order.
    pub props: IndexMap<String, Value>,
}

/// Runtime-evaluated expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Reference(Reference),
    Pipeline(Pipeline),
    Collection(Collection),
    Conditional(Conditional),
    Format(Format),
    Validation(Validation),
    Test(Test),
    Transition(Transition),
}

/// Looks a value up from a named runtime source. The first path segment
/// names the source (`answers`, `post`, `data`, `query`, `params`); the
/// rest address into it. Segments are usually strings but may be embedded
/// expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub path: Vec<Value>,
}

/// Feeds `input` through an ordered sequence of transformer steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub input: Node,
    pub steps: Vec<Node>,
}

/// Builds an ordered collection from its item expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub items: Vec<Value>,
}

/// One arm of a [`Conditional`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    pub when: Node,
    pub then: Value,
}

/// Picks the first branch whose condition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub branches: Vec<ConditionalBranch>,
    pub otherwise: Option<Value>,
}

/// Interpolates `args` into a message template.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    pub template: String,
    pub args: Vec<Value>,
}

/// A validation rule attached to a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub when: Option<Node>,
    pub message: Option<Value>,
    /// The owning field block's code, attached during normalization.
    /// Literal codes are copied; expression codes are deep-cloned with the
    /// top-level id stripped.
    pub resolved_block_code: Option<ResolvedCode>,
}

/// The owning block's code as recorded on a validation node.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedCode {
    Literal(String),
    Expression(Box<Expression>),
}

/// Applies a condition function to a subject value.
#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    pub subject: Value,
    pub predicate: Node,
    pub negated: bool,
}

/// When a lifecycle transition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Load,
    Submit,
    Action,
}

/// A declared lifecycle effect attached to a journey or step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub trigger: Trigger,
    pub effects: Vec<Node>,
}

/// The role a function plays at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Condition,
    Transformer,
    Effect,
    Generator,
}

/// A named function call. Resolution of the name is the runtime's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub kind: FunctionKind,
    pub name: String,
    pub arguments: Vec<Value>,
}
