use crate::expr::Expr;
use crate::expr::Function;
use crate::expr::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

/// The root container of a form definition.
///
/// Journeys own steps and may nest further journeys; lifecycle transitions
/// declared here apply to everything the journey encloses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_load: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_submit: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub journeys: Vec<Journey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
}

impl Journey {
    pub fn new(title: impl Into<Value>) -> Self {
        Journey {
            title: Some(title.into()),
            ..Journey::default()
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn on_load(mut self, transition: Transition) -> Self {
        self.on_load.push(transition);
        self
    }

    pub fn on_submit(mut self, transition: Transition) -> Self {
        self.on_submit.push(transition);
        self
    }

    pub fn journey(mut self, journey: Journey) -> Self {
        self.journeys.push(journey);
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// A single page of a journey, addressed by its URL path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_load: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_submit: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_action: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

impl Step {
    pub fn new(path: impl Into<String>) -> Self {
        Step {
            path: path.into(),
            title: None,
            on_load: Vec::new(),
            on_submit: Vec::new(),
            on_action: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<Value>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn on_load(mut self, transition: Transition) -> Self {
        self.on_load.push(transition);
        self
    }

    pub fn on_submit(mut self, transition: Transition) -> Self {
        self.on_submit.push(transition);
        self
    }

    pub fn on_action(mut self, transition: Transition) -> Self {
        self.on_action.push(transition);
        self
    }

    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

/// Distinguishes blocks that collect input from those that only render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    #[default]
    Basic,
    Field,
    Composite,
}

/// A UI-bearing node. `variant` names a component in the host's component
/// registry; the compiler treats it as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub variant: String,
    #[serde(default)]
    pub kind: BlockKind,
    /// The stable key a field's submitted and stored value is addressed by.
    /// A string for most fields, or an expression for dynamically-coded ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formatters: Vec<Function>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validate: Vec<Validation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    /// Component-specific properties, preserved in declaration order.
    #[serde(flatten)]
    pub props: IndexMap<String, Value>,
}

impl Block {
    fn new(variant: impl Into<String>, kind: BlockKind) -> Self {
        Block {
            variant: variant.into(),
            kind,
            code: None,
            value: None,
            default_value: None,
            formatters: Vec::new(),
            validate: Vec::new(),
            blocks: Vec::new(),
            props: IndexMap::new(),
        }
    }

    pub fn basic(variant: impl Into<String>) -> Self {
        Block::new(variant, BlockKind::Basic)
    }

    pub fn field(variant: impl Into<String>, code: impl Into<Value>) -> Self {
        let mut block = Block::new(variant, BlockKind::Field);
        block.code = Some(code.into());
        block
    }

    pub fn composite(variant: impl Into<String>) -> Self {
        Block::new(variant, BlockKind::Composite)
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn formatter(mut self, formatter: Function) -> Self {
        self.formatters.push(formatter);
        self
    }

    pub fn validation(mut self, validation: Validation) -> Self {
        self.validate.push(validation);
        self
    }

    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }
}

/// A declared lifecycle effect. The trigger (load, submit, action) comes
/// from the property the transition is attached to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default)]
    pub effects: Vec<Function>,
}

impl Transition {
    pub fn new() -> Self {
        Transition::default()
    }

    pub fn effect(mut self, effect: Function) -> Self {
        self.effects.push(effect);
        self
    }
}

impl From<Vec<Function>> for Transition {
    fn from(effects: Vec<Function>) -> Self {
        Transition { effects }
    }
}

/// A validation rule. `when` holds the failing condition; `message` is shown
/// when it fires.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Box<Expr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl Validation {
    pub fn new() -> Self {
        Validation::default()
    }

    pub fn when(mut self, condition: Expr) -> Self {
        self.when = Some(Box::new(condition));
        self
    }

    pub fn message(mut self, message: impl Into<Value>) -> Self {
        self.message = Some(message.into());
        self
    }
}
