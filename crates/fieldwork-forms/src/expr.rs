use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

/// A property value in a form definition.
///
/// Values are either scalars, [`Expr`]essions evaluated at runtime, or
/// ordered containers of further values. Containers may nest arbitrarily;
/// a radio group's `items` list holding records that in turn hold a reveal
/// `block` is the canonical example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Expr(Box<Expr>),
    /// A nested block, e.g. a radio item's conditional reveal.
    Block(Box<super::Block>),
    List(Vec<Value>),
    Record(IndexMap<String, Value>),
}

impl Value {
    /// Returns the scalar string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Expr> for Value {
    fn from(value: Expr) -> Self {
        Value::Expr(Box::new(value))
    }
}

impl From<super::Block> for Value {
    fn from(value: super::Block) -> Self {
        Value::Block(Box::new(value))
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Expr(Box::new(Expr::Function(value)))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Record(value)
    }
}

/// A runtime-evaluated expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expr {
    /// Looks a value up from a named runtime source
    /// (`answers`, `post`, `data`, `query`, `params`).
    Reference { path: Vec<Value> },
    /// Feeds `input` through an ordered sequence of transformer steps.
    Pipeline {
        input: Box<Expr>,
        steps: Vec<Function>,
    },
    /// Builds an ordered collection from its item expressions.
    Collection { items: Vec<Value> },
    /// Picks the first branch whose condition holds.
    Conditional {
        branches: Vec<Branch>,
        otherwise: Option<Value>,
    },
    /// Interpolates `args` into a message template.
    Format { template: String, args: Vec<Value> },
    /// A validation rule attached to a block.
    Validation(super::Validation),
    /// Applies a condition function to a subject value.
    Test {
        subject: Value,
        predicate: Function,
        #[serde(default)]
        negated: bool,
    },
    /// A lifecycle transition; its trigger comes from the property it is
    /// attached to (`on_load`, `on_submit`, `on_action`).
    Transition(super::Transition),
    /// A bare function expression.
    Function(Function),
}

impl Expr {
    pub fn reference<I>(path: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Expr::Reference {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// A reference to a stored answer by field code.
    pub fn answers(code: impl Into<Value>) -> Expr {
        Expr::Reference {
            path: vec![Value::from("answers"), code.into()],
        }
    }

    /// A reference to the answer of the enclosing field.
    pub fn self_value() -> Expr {
        Expr::answers("@self")
    }

    /// A reference to a posted field value by field code.
    pub fn post(code: impl Into<Value>) -> Expr {
        Expr::Reference {
            path: vec![Value::from("post"), code.into()],
        }
    }

    /// A reference to a loaded data item by key.
    pub fn data(key: impl Into<Value>) -> Expr {
        Expr::Reference {
            path: vec![Value::from("data"), key.into()],
        }
    }

    /// A reference to a query-string parameter.
    pub fn query(name: impl Into<Value>) -> Expr {
        Expr::Reference {
            path: vec![Value::from("query"), name.into()],
        }
    }

    /// A reference to a URL path parameter.
    pub fn params(name: impl Into<Value>) -> Expr {
        Expr::Reference {
            path: vec![Value::from("params"), name.into()],
        }
    }

    pub fn pipeline(input: Expr, steps: Vec<Function>) -> Expr {
        Expr::Pipeline {
            input: Box::new(input),
            steps,
        }
    }

    pub fn format(template: impl Into<String>, args: Vec<Value>) -> Expr {
        Expr::Format {
            template: template.into(),
            args,
        }
    }

    pub fn test(subject: impl Into<Value>, predicate: Function) -> Expr {
        Expr::Test {
            subject: subject.into(),
            predicate,
            negated: false,
        }
    }
}

/// One arm of a [`Expr::Conditional`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub when: Box<Expr>,
    pub then: Value,
}

impl Branch {
    pub fn new(when: Expr, then: impl Into<Value>) -> Self {
        Branch {
            when: Box::new(when),
            then: then.into(),
        }
    }
}

/// The role a function plays at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionKind {
    /// Yields a boolean; used by conditionals, tests and validations.
    Condition,
    /// Maps an input value to an output value; used by pipelines.
    Transformer,
    /// Performs a side effect; used by lifecycle transitions.
    Effect,
    /// Produces a value from nothing; used for computed defaults.
    Generator,
}

/// A named function with its argument expressions.
///
/// The core does not resolve function names; the runtime's function registry
/// does. Here a function is just its kind, name and arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub kind: FunctionKind,
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl Function {
    pub fn new(kind: FunctionKind, name: impl Into<String>) -> Self {
        Function {
            kind,
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn condition(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Condition, name)
    }

    pub fn transformer(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Transformer, name)
    }

    pub fn effect(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Effect, name)
    }

    pub fn generator(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Generator, name)
    }

    /// Appends an argument.
    pub fn argument(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }
}
