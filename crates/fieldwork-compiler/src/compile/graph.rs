//! The typed dependency graph produced by the wiring passes.
//!
//! The graph owns no nodes: it is a pair of adjacency maps keyed by
//! [`NodeId`], with the nodes themselves living in the registries. Edges
//! run from producer to consumer; structural edges run from immediate
//! child to immediate parent and must stay acyclic.

use crate::diagnostics::CompileError;
use crate::id::NodeId;
use indexmap::IndexMap;
use indexmap::IndexSet;

/// Why a dependency exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Child belongs to parent in the syntax tree.
    Structural,
    /// The producer's value is needed by the consumer.
    DataFlow,
    /// The effect must complete before the consumer observes a value.
    EffectFlow,
}

/// Optional annotations carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdgeMetadata {
    /// For structural edges: the parent property the child hangs off.
    pub property_name: Option<String>,
    /// For flow edges: why the dependency exists.
    pub reason: Option<&'static str>,
}

impl EdgeMetadata {
    pub(crate) fn property(name: impl Into<String>) -> Self {
        EdgeMetadata {
            property_name: Some(name.into()),
            reason: None,
        }
    }

    pub(crate) fn reason(reason: &'static str) -> Self {
        EdgeMetadata {
            property_name: None,
            reason: Some(reason),
        }
    }
}

/// One typed edge between a pair of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub kind: EdgeKind,
    pub metadata: EdgeMetadata,
}

/// Directed multigraph of typed, id-keyed edges.
///
/// Between any ordered pair of nodes at most one edge of each [`EdgeKind`]
/// exists; a second add of the same kind is collapsed into the first.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexSet<NodeId>,
    edges: IndexMap<(NodeId, NodeId), Vec<Edge>>,
    outgoing: IndexMap<NodeId, IndexSet<NodeId>>,
    incoming: IndexMap<NodeId, IndexSet<NodeId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    pub fn add_node(&mut self, id: NodeId) {
        self.nodes.insert(id);
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Adds an edge from producer to consumer. Structural edges are checked
    /// against the existing structural edges: closing a cycle is fatal.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        metadata: EdgeMetadata,
    ) -> Result<(), CompileError> {
        if kind == EdgeKind::Structural && (from == to || self.structurally_reaches(to, from)) {
            return Err(CompileError::CycleInStructuralGraph { from, to });
        }
        self.add_node(from);
        self.add_node(to);
        let edges = self.edges.entry((from, to)).or_default();
        if edges.iter().any(|edge| edge.kind == kind) {
            return Ok(());
        }
        edges.push(Edge { kind, metadata });
        self.outgoing.entry(from).or_default().insert(to);
        self.incoming.entry(to).or_default().insert(from);
        Ok(())
    }

    /// The edges from `from` to `to`, in the order they were added.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> &[Edge] {
        self.edges
            .get(&(from, to))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        self.edges_between(from, to)
            .iter()
            .any(|edge| edge.kind == kind)
    }

    /// Nodes with at least one edge into `id`: what `id` depends on.
    pub fn dependencies_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Nodes `id` has at least one edge into: what depends on `id`.
    pub fn dependents_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Every edge in insertion order, as `(from, to, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &Edge)> {
        self.edges
            .iter()
            .flat_map(|(&(from, to), edges)| edges.iter().map(move |edge| (from, to, edge)))
    }

    /// The structural parent of `id`, when it has one.
    pub fn structural_parent(&self, id: NodeId) -> Option<NodeId> {
        self.dependents_of(id)
            .find(|&to| self.has_edge(id, to, EdgeKind::Structural))
    }

    /// Producers-first ordering over the subgraph of the given edge kinds.
    /// Returns `None` if that subgraph is cyclic.
    ///
    /// Downstream evaluators order structural and data-flow edges together
    /// and consult effect-flow edges separately.
    pub fn topological_order(&self, kinds: &[EdgeKind]) -> Option<Vec<NodeId>> {
        let mut in_degree: IndexMap<NodeId, usize> =
            self.nodes.iter().map(|&id| (id, 0)).collect();
        for ((_, to), edges) in &self.edges {
            let relevant = edges.iter().filter(|e| kinds.contains(&e.kind)).count();
            if relevant > 0 {
                if let Some(degree) = in_degree.get_mut(to) {
                    *degree += relevant;
                }
            }
        }
        let mut queue: Vec<NodeId> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut cursor = 0;
        while cursor < queue.len() {
            let id = queue[cursor];
            cursor += 1;
            order.push(id);
            for to in self.dependents_of(id) {
                let relevant = self
                    .edges_between(id, to)
                    .iter()
                    .filter(|e| kinds.contains(&e.kind))
                    .count();
                if relevant == 0 {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(&to) {
                    *degree -= relevant;
                    if *degree == 0 {
                        queue.push(to);
                    }
                }
            }
        }
        (order.len() == self.nodes.len()).then_some(order)
    }

    fn structurally_reaches(&self, start: NodeId, target: NodeId) -> bool {
        let mut stack = vec![start];
        let mut visited = IndexSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            for to in self.dependents_of(id) {
                if self.has_edge(id, to, EdgeKind::Structural) {
                    stack.push(to);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdSpace;
    use crate::id::NodeIdGenerator;

    fn ids(n: usize) -> Vec<NodeId> {
        let generator = NodeIdGenerator::new();
        (0..n).map(|_| generator.next(IdSpace::CompileAst)).collect()
    }

    #[test]
    fn duplicate_edges_of_one_kind_collapse() {
        let ids = ids(2);
        let mut graph = DependencyGraph::new();
        graph
            .add_edge(ids[0], ids[1], EdgeKind::DataFlow, EdgeMetadata::default())
            .unwrap();
        graph
            .add_edge(ids[0], ids[1], EdgeKind::DataFlow, EdgeMetadata::default())
            .unwrap();
        graph
            .add_edge(ids[0], ids[1], EdgeKind::EffectFlow, EdgeMetadata::default())
            .unwrap();
        assert_eq!(graph.edges_between(ids[0], ids[1]).len(), 2);
    }

    #[test]
    fn structural_cycles_are_fatal() {
        let ids = ids(3);
        let mut graph = DependencyGraph::new();
        graph
            .add_edge(ids[0], ids[1], EdgeKind::Structural, EdgeMetadata::default())
            .unwrap();
        graph
            .add_edge(ids[1], ids[2], EdgeKind::Structural, EdgeMetadata::default())
            .unwrap();
        let error = graph
            .add_edge(ids[2], ids[0], EdgeKind::Structural, EdgeMetadata::default())
            .unwrap_err();
        assert!(matches!(error, CompileError::CycleInStructuralGraph { .. }));
    }

    #[test]
    fn flow_edges_may_cycle_without_error() {
        let ids = ids(2);
        let mut graph = DependencyGraph::new();
        graph
            .add_edge(ids[0], ids[1], EdgeKind::DataFlow, EdgeMetadata::default())
            .unwrap();
        graph
            .add_edge(ids[1], ids[0], EdgeKind::DataFlow, EdgeMetadata::default())
            .unwrap();
        assert!(graph.topological_order(&[EdgeKind::DataFlow]).is_none());
        assert!(graph
            .topological_order(&[EdgeKind::Structural])
            .is_some());
    }

    #[test]
    fn topological_order_puts_producers_first() {
        let ids = ids(3);
        let mut graph = DependencyGraph::new();
        graph
            .add_edge(ids[1], ids[2], EdgeKind::DataFlow, EdgeMetadata::default())
            .unwrap();
        graph
            .add_edge(ids[0], ids[1], EdgeKind::DataFlow, EdgeMetadata::default())
            .unwrap();
        let order = graph.topological_order(&[EdgeKind::DataFlow]).unwrap();
        let position = |id: NodeId| order.iter().position(|&x| x == id).unwrap();
        assert!(position(ids[0]) < position(ids[1]));
        assert!(position(ids[1]) < position(ids[2]));
    }

    #[test]
    fn dependencies_and_dependents_are_symmetric() {
        let ids = ids(2);
        let mut graph = DependencyGraph::new();
        graph
            .add_edge(ids[0], ids[1], EdgeKind::EffectFlow, EdgeMetadata::default())
            .unwrap();
        assert_eq!(graph.dependencies_of(ids[1]).collect::<Vec<_>>(), vec![ids[0]]);
        assert_eq!(graph.dependents_of(ids[0]).collect::<Vec<_>>(), vec![ids[1]]);
    }
}
