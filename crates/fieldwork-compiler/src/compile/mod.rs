//! The compile pipeline: intern, normalize, register, discover, wire.
//!
//! [`compile`] runs the stages in a fixed order, each to completion before
//! the next begins. The whole pipeline is synchronous and deterministic:
//! the same definition and context always produce the same registries,
//! metadata and graph. A compilation owns all of its state; nothing is
//! shared between compiles.

pub mod graph;
pub mod pseudo;
pub mod scope;

mod normalize;
mod register;
mod wire;

use crate::ast::NodeFactory;
use crate::diagnostics::CompileDiagnostic;
use crate::diagnostics::CompileError;
use crate::id::NodeId;
use crate::id::NodeIdGenerator;
use crate::registry::MetadataRegistry;
use crate::registry::MetaKey;
use crate::registry::MetaValue;
use crate::registry::NodeRegistry;
use crate::Node;
use fieldwork_forms as forms;
use self::graph::DependencyGraph;
use self::pseudo::PseudoNode;
use self::scope::ScopeIndex;

/// Per-compile context supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    /// URL path of the step being compiled, when the host is rendering
    /// one. Matching is by a step's `path`, first match in document order.
    pub current_step: Option<String>,
}

impl CompileContext {
    pub fn new() -> Self {
        CompileContext::default()
    }

    pub fn for_step(path: impl Into<String>) -> Self {
        CompileContext {
            current_step: Some(path.into()),
        }
    }
}

/// Everything a compile produces. Read-only once returned; the downstream
/// evaluator looks nodes up by id and walks the graph.
#[derive(Debug)]
pub struct Compilation {
    /// The normalized tree root.
    pub root: Node,
    /// Every syntax-tree node by id.
    pub ast: NodeRegistry<Node>,
    /// Every discovered pseudo-node by id.
    pub pseudo: NodeRegistry<PseudoNode>,
    /// Cross-pass annotations: parents, depths, step flags.
    pub metadata: MetadataRegistry,
    /// Memoized scope lookups.
    pub scopes: ScopeIndex,
    /// The typed dependency graph.
    pub graph: DependencyGraph,
    /// Non-fatal conditions observed while wiring.
    pub diagnostics: Vec<CompileDiagnostic>,
}

impl Compilation {
    /// The step selected by the compile context, when one matched.
    pub fn current_step(&self) -> Option<NodeId> {
        self.metadata
            .nodes_with(MetaKey::CurrentStep, MetaValue::Bool(true))
            .first()
            .copied()
    }
}

/// Compiles a form definition into its annotated tree and dependency
/// graph.
pub fn compile(
    definition: &forms::Journey,
    ctx: &CompileContext,
) -> Result<Compilation, CompileError> {
    let ids = NodeIdGenerator::new();
    let factory = NodeFactory::new(&ids);
    let mut root = factory.journey(definition);

    let mut metadata = MetadataRegistry::new();
    normalize::run(&mut root, &factory, &mut metadata)?;

    let mut ast = NodeRegistry::new();
    register::run(&root, ctx, &mut ast, &mut metadata)?;

    let scopes = ScopeIndex::build(&ast, &metadata);

    let mut pseudo = NodeRegistry::new();
    let index = pseudo::discover(&root, &ids, &mut pseudo)?;

    let mut graph = DependencyGraph::new();
    let mut diagnostics = Vec::new();
    let wire_ctx = wire::WireCtx {
        ast: &ast,
        pseudo: &pseudo,
        index: &index,
        scopes: &scopes,
        meta: &metadata,
    };
    wire::run(&wire_ctx, &mut graph, &mut diagnostics)?;

    Ok(Compilation {
        root,
        ast,
        pseudo,
        metadata,
        scopes,
        graph,
        diagnostics,
    })
}
