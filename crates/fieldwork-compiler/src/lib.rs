//! A compiler from declarative form definitions to a typed dependency
//! graph.
//!
//! The pipeline interns a [`fieldwork_forms`] definition into an
//! id-bearing syntax tree ([`ast`]), rewrites it through a fixed sequence
//! of normalization passes, discovers the pseudo-nodes standing in for
//! runtime value sources (posted data, stored answers, loaded data, URL
//! parameters), and wires everything into a [`DependencyGraph`] of typed
//! edges. A separate evaluator executes the graph; this crate never
//! evaluates expressions, renders UI or touches HTTP.
//!
//! ```
//! use fieldwork_compiler::compile::{compile, CompileContext};
//! use fieldwork_forms::{Block, Journey, Step};
//!
//! let journey = Journey::new("Personal details").step(
//!     Step::new("/name").block(Block::field("text_input", "first_name")),
//! );
//! let compilation = compile(&journey, &CompileContext::for_step("/name"))?;
//! assert!(compilation.diagnostics.is_empty());
//! # Ok::<(), fieldwork_compiler::CompileError>(())
//! ```
//!
//! Compilation is single-threaded and deterministic: the same definition
//! and context produce byte-equivalent registries and graphs across runs.

pub mod ast;
pub mod compile;
pub mod traverse;

mod diagnostics;
mod id;
mod node;
mod registry;

pub use self::compile::compile;
pub use self::compile::graph::{DependencyGraph, Edge, EdgeKind, EdgeMetadata};
pub use self::compile::pseudo::{PseudoKey, PseudoKind, PseudoNode};
pub use self::compile::scope::{Scope, ScopeEntry, ScopeIndex, ScopeKind};
pub use self::compile::{CompileContext, Compilation};
pub use self::diagnostics::{CompileDiagnostic, CompileError};
pub use self::id::{IdSpace, NodeId, NodeIdGenerator};
pub use self::node::Node;
pub use self::registry::{MetaKey, MetadataRegistry, MetaValue, NodeRegistry};
