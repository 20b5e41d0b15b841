//! Per-node scope information: enclosing journeys/steps and their load
//! transitions.

use crate::ast::NodeKind;
use crate::id::NodeId;
use crate::registry::MetadataRegistry;
use crate::registry::NodeRegistry;
use crate::Node;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;

/// Which kind of node opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Journey,
    Step,
}

/// One enclosing scope of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    pub id: NodeId,
    pub kind: ScopeKind,
}

/// The scope information of a single node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scope {
    /// Enclosing journeys/steps, innermost first. A node that is itself a
    /// step or journey is the innermost entry of its own chain.
    pub chain: Vec<ScopeEntry>,
    /// Ids of the load transitions declared along the chain, in document
    /// order: an outer journey's transitions precede an inner step's.
    pub on_load_chain: Vec<NodeId>,
}

/// Lazily computed, memoized scope lookups.
///
/// Built once registration has frozen the tree; the snapshot it takes of
/// parent links and scope-opening nodes never changes afterwards, so the
/// memo table needs no invalidation.
#[derive(Debug)]
pub struct ScopeIndex {
    parents: HashMap<NodeId, NodeId>,
    scopes: HashMap<NodeId, (ScopeKind, Vec<NodeId>)>,
    known: HashSet<NodeId>,
    cache: RefCell<HashMap<NodeId, Scope>>,
}

impl ScopeIndex {
    pub(crate) fn build(ast: &NodeRegistry<Node>, meta: &MetadataRegistry) -> Self {
        let mut parents = HashMap::new();
        let mut scopes = HashMap::new();
        let mut known = HashSet::new();
        for (id, node) in ast.iter() {
            known.insert(id);
            if let Some(parent) = meta.parent_of(id) {
                parents.insert(id, parent);
            }
            match &node.kind {
                NodeKind::Journey(journey) => {
                    scopes.insert(id, (ScopeKind::Journey, load_transition_ids(&journey.on_load)));
                }
                NodeKind::Step(step) => {
                    scopes.insert(id, (ScopeKind::Step, load_transition_ids(&step.on_load)));
                }
                _ => {}
            }
        }
        ScopeIndex {
            parents,
            scopes,
            known,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The scope of `id`, or `None` when the node is unknown to this
    /// index or no step or journey encloses it. Trees rooted at a journey
    /// always resolve: the ancestor walk ends at the root journey, so
    /// `None` only arises for ids this index never saw.
    pub fn scope_of(&self, id: NodeId) -> Option<Scope> {
        if !self.known.contains(&id) {
            return None;
        }
        if let Some(scope) = self.cache.borrow().get(&id) {
            return if scope.chain.is_empty() {
                None
            } else {
                Some(scope.clone())
            };
        }

        let mut chain = Vec::new();
        let mut loads_by_entry = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if !visited.insert(node) {
                break;
            }
            if let Some((kind, loads)) = self.scopes.get(&node) {
                chain.push(ScopeEntry { id: node, kind: *kind });
                loads_by_entry.push(loads.clone());
            }
            current = self.parents.get(&node).copied();
        }
        let on_load_chain = loads_by_entry
            .iter()
            .rev()
            .flat_map(|loads| loads.iter().copied())
            .collect();
        let scope = Scope {
            chain,
            on_load_chain,
        };
        self.cache.borrow_mut().insert(id, scope.clone());
        if scope.chain.is_empty() {
            None
        } else {
            Some(scope)
        }
    }
}

fn load_transition_ids(transitions: &[Node]) -> Vec<NodeId> {
    transitions
        .iter()
        .filter(|node| {
            node.as_expression().is_some_and(|expression| {
                matches!(
                    expression,
                    crate::ast::Expression::Transition(t) if t.is_load()
                )
            })
        })
        .map(Node::id)
        .collect()
}
