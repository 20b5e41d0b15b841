//! Errors and non-fatal diagnostics raised by the compile pipeline.
//!
//! Fatal conditions abort the compile and surface as [`CompileError`].
//! Wiring is tolerant: a missing collaborator degrades to fewer edges and
//! is recorded as a [`CompileDiagnostic`] on the compilation result. The
//! compiler never logs.

use crate::id::NodeId;
use std::fmt;

/// A fatal compile error. These indicate a malformed definition or a
/// programmer error, and surface at form registration time in the host
/// application.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A node violates a structural contract, e.g. a field with formatters
    /// but no code.
    #[error("invalid node {node} at {path}: {message}")]
    InvalidNode {
        message: String,
        node: NodeId,
        /// Property path from the definition root to the offending node.
        path: String,
    },

    /// The same id was registered twice with different contents.
    #[error("node id {id} registered twice with different contents")]
    DuplicateNodeId { id: NodeId },

    /// A structural edge would close a cycle in the containment tree.
    #[error("structural edge {from} -> {to} would close a cycle")]
    CycleInStructuralGraph { from: NodeId, to: NodeId },
}

/// A non-fatal condition observed during wiring. The edges that could be
/// added were added; nothing was fabricated for the missing part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileDiagnostic {
    /// A wiring pass looked for a collaborator (a pseudo-node, a field, a
    /// referenced key) that does not exist in this compile.
    MissingCollaborator {
        /// The node the wiring pass was working on.
        node: NodeId,
        /// What was looked for.
        missing: String,
    },
}

impl fmt::Display for CompileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileDiagnostic::MissingCollaborator { node, missing } => {
                write!(f, "{node}: no {missing} in this compile; edges skipped")
            }
        }
    }
}
