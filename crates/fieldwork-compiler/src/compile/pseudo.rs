//! Pseudo-nodes: compile-time stand-ins for runtime value sources.
//!
//! Pseudo-nodes are not syntax-tree nodes; they share only the id shape
//! (drawn from the `compile_pseudo` space) and live in their own registry.
//! Discovery scans field blocks and reference expressions, collapsing
//! duplicates by key.

use crate::ast::Block;
use crate::ast::Value;
use crate::diagnostics::CompileError;
use crate::id::IdSpace;
use crate::id::NodeId;
use crate::id::NodeIdGenerator;
use crate::registry::NodeRegistry;
use crate::traverse::traverse;
use crate::traverse::Flow;
use crate::traverse::TraverseCtx;
use crate::traverse::Visit;
use crate::Node;
use indexmap::IndexMap;
use std::fmt;

/// What a pseudo-node is keyed by: a literal field code or, for
/// dynamically-coded fields, the code expression's node id as seen at
/// discovery time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoKey {
    Literal(String),
    Expr(NodeId),
}

impl fmt::Display for PseudoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoKey::Literal(code) => write!(f, "{code}"),
            PseudoKey::Expr(id) => write!(f, "<{id}>"),
        }
    }
}

/// A compile-time stand-in for one runtime value source.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoNode {
    pub id: NodeId,
    pub kind: PseudoKind,
}

/// The value source a pseudo-node stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoKind {
    /// A field's raw posted value.
    Post { code: PseudoKey },
    /// A field's stored answer. `field_node_id` is set when the field is
    /// lexically reachable in this compile; cross-step answers leave it
    /// unset.
    Answer {
        code: PseudoKey,
        field_node_id: Option<NodeId>,
    },
    /// A loaded data item.
    Data { key: String },
    /// A query-string parameter.
    Query { name: String },
    /// A URL path parameter.
    Params { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Post(PseudoKey),
    Answer(PseudoKey),
    Data(String),
    Query(String),
    Params(String),
}

/// Key → id lookups over the discovered pseudo-nodes, used by the wiring
/// passes.
#[derive(Debug, Default)]
pub(crate) struct PseudoIndex {
    by_slot: IndexMap<Slot, NodeId>,
}

impl PseudoIndex {
    pub(crate) fn post(&self, code: &PseudoKey) -> Option<NodeId> {
        self.by_slot.get(&Slot::Post(code.clone())).copied()
    }

    pub(crate) fn answer(&self, code: &PseudoKey) -> Option<NodeId> {
        self.by_slot.get(&Slot::Answer(code.clone())).copied()
    }

    pub(crate) fn data(&self, key: &str) -> Option<NodeId> {
        self.by_slot.get(&Slot::Data(key.to_owned())).copied()
    }

    pub(crate) fn query(&self, name: &str) -> Option<NodeId> {
        self.by_slot.get(&Slot::Query(name.to_owned())).copied()
    }

    pub(crate) fn params(&self, name: &str) -> Option<NodeId> {
        self.by_slot.get(&Slot::Params(name.to_owned())).copied()
    }
}

/// The key a field block's pseudo-nodes use, when the block is keyable.
pub(crate) fn code_key(block: &Block) -> Option<PseudoKey> {
    match block.code.as_ref()? {
        Value::String(code) => Some(PseudoKey::Literal(code.clone())),
        Value::Node(node) => Some(PseudoKey::Expr(node.id())),
        _ => None,
    }
}

/// Scans the tree for pseudo-node sources and registers the collapsed set.
pub(crate) fn discover(
    root: &Node,
    ids: &NodeIdGenerator,
    registry: &mut NodeRegistry<PseudoNode>,
) -> Result<PseudoIndex, CompileError> {
    let mut discovery = Discovery {
        ids,
        index: PseudoIndex::default(),
        nodes: IndexMap::new(),
    };
    traverse(root, &mut discovery);
    let Discovery { index, nodes, .. } = discovery;
    for (id, node) in nodes {
        registry.register(id, node)?;
    }
    Ok(index)
}

struct Discovery<'a> {
    ids: &'a NodeIdGenerator,
    index: PseudoIndex,
    nodes: IndexMap<NodeId, PseudoNode>,
}

impl Discovery<'_> {
    fn upsert(&mut self, slot: Slot, kind: PseudoKind) -> NodeId {
        if let Some(&existing) = self.index.by_slot.get(&slot) {
            return existing;
        }
        let id = self.ids.next(IdSpace::CompilePseudo);
        self.index.by_slot.insert(slot, id);
        self.nodes.insert(id, PseudoNode { id, kind });
        id
    }

    fn field(&mut self, field_node_id: NodeId, code: PseudoKey) {
        self.upsert(
            Slot::Post(code.clone()),
            PseudoKind::Post { code: code.clone() },
        );
        let answer_id = self.upsert(
            Slot::Answer(code.clone()),
            PseudoKind::Answer {
                code,
                field_node_id: Some(field_node_id),
            },
        );
        // An answer first seen through a cross-step reference gains its
        // field once the field itself is discovered.
        if let Some(node) = self.nodes.get_mut(&answer_id) {
            if let PseudoKind::Answer {
                field_node_id: slot @ None,
                ..
            } = &mut node.kind
            {
                *slot = Some(field_node_id);
            }
        }
    }
}

impl Visit for Discovery<'_> {
    fn enter(&mut self, node: &Node, _ctx: &TraverseCtx<'_>) -> Flow {
        if let Some(block) = node.as_block() {
            if block.is_field() {
                if let Some(code) = code_key(block) {
                    self.field(node.id(), code);
                }
            }
        }
        if let Some(reference) = node.as_reference() {
            match reference.source() {
                Some("data") => {
                    if let Some(key) = reference.key_str() {
                        self.upsert(
                            Slot::Data(key.to_owned()),
                            PseudoKind::Data {
                                key: key.to_owned(),
                            },
                        );
                    }
                }
                Some("query") => {
                    if let Some(name) = reference.key_str() {
                        self.upsert(
                            Slot::Query(name.to_owned()),
                            PseudoKind::Query {
                                name: name.to_owned(),
                            },
                        );
                    }
                }
                Some("params") => {
                    if let Some(name) = reference.key_str() {
                        self.upsert(
                            Slot::Params(name.to_owned()),
                            PseudoKind::Params {
                                name: name.to_owned(),
                            },
                        );
                    }
                }
                Some("answers") => {
                    // `@self` is the owning field's own answer; the field
                    // mints that pseudo-node itself.
                    if let Some(key) = reference.key_str() {
                        if key != "@self" {
                            self.upsert(
                                Slot::Answer(PseudoKey::Literal(key.to_owned())),
                                PseudoKind::Answer {
                                    code: PseudoKey::Literal(key.to_owned()),
                                    field_node_id: None,
                                },
                            );
                        }
                    }
                }
                _ => {}
            }
        }
        Flow::Continue
    }
}
