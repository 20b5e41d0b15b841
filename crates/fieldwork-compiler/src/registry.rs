//! Id-keyed stores shared by the compile passes.
//!
//! Registries reference nodes by id; they never own node identity. Both the
//! node registry and the metadata registry iterate in insertion order, which
//! is what makes compiles deterministic.

use crate::diagnostics::CompileError;
use crate::id::NodeId;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Insertion-ordered store from [`NodeId`] to a node.
///
/// One instance holds syntax-tree nodes, another holds pseudo-nodes; the id
/// spaces keep them disjoint.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry<T> {
    nodes: IndexMap<NodeId, T>,
}

impl<T: PartialEq> NodeRegistry<T> {
    pub fn new() -> Self {
        NodeRegistry {
            nodes: IndexMap::new(),
        }
    }

    /// Records `node` under `id`. Re-registering an equal node is a no-op;
    /// a different node under the same id is fatal.
    pub fn register(&mut self, id: NodeId, node: T) -> Result<(), CompileError> {
        match self.nodes.entry(id) {
            Entry::Occupied(existing) => {
                if *existing.get() == node {
                    Ok(())
                } else {
                    Err(CompileError::DuplicateNodeId { id })
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(node);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(&id)
    }

    pub fn has(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Nodes matching a predicate, in registration order.
    pub fn filter<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = (NodeId, &'a T)>
    where
        P: FnMut(&T) -> bool + 'a,
    {
        self.nodes
            .iter()
            .filter(move |(_, node)| predicate(node))
            .map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The key of a metadata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    /// The immediate structural parent's id.
    Parent,
    /// Length of the ancestor chain.
    Depth,
    /// On the path from the root to the current step.
    AncestorOfStep,
    /// Reachable below the current step.
    DescendantOfStep,
    /// The step whose URL is being compiled.
    CurrentStep,
    /// Inside a synthesized `format_pipeline` subtree.
    InFormatPipeline,
}

/// The value of a metadata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaValue {
    Id(NodeId),
    Bool(bool),
    Count(usize),
}

impl MetaValue {
    pub fn as_id(self) -> Option<NodeId> {
        match self {
            MetaValue::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_count(self) -> Option<usize> {
        match self {
            MetaValue::Count(n) => Some(n),
            _ => None,
        }
    }
}

/// Sparse `(node, key) → value` store for cross-pass annotations.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entries: IndexMap<NodeId, IndexMap<MetaKey, MetaValue>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        MetadataRegistry::default()
    }

    pub fn set(&mut self, id: NodeId, key: MetaKey, value: MetaValue) {
        self.entries.entry(id).or_default().insert(key, value);
    }

    pub fn get(&self, id: NodeId, key: MetaKey) -> Option<MetaValue> {
        self.entries.get(&id)?.get(&key).copied()
    }

    pub fn get_or(&self, id: NodeId, key: MetaKey, default: MetaValue) -> MetaValue {
        self.get(id, key).unwrap_or(default)
    }

    pub fn has(&self, id: NodeId, key: MetaKey) -> bool {
        self.get(id, key).is_some()
    }

    pub fn remove(&mut self, id: NodeId, key: MetaKey) {
        if let Some(entries) = self.entries.get_mut(&id) {
            entries.shift_remove(&key);
        }
    }

    /// Ids whose entry under `key` equals `value`, in insertion order.
    pub fn nodes_with(&self, key: MetaKey, value: MetaValue) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(_, entries)| entries.get(&key) == Some(&value))
            .map(|(id, _)| *id)
            .collect()
    }

    /// The recorded structural parent of `id`.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id, MetaKey::Parent)?.as_id()
    }

    /// Walks the recorded parent chain starting from `id`'s parent,
    /// innermost first.
    pub fn ancestors_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            // A malformed parent table must not hang the compiler.
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }
}
