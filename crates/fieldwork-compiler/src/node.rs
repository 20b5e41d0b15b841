use crate::ast::AstNode;
use crate::id::NodeId;
use std::fmt;

/// Smart pointer to a syntax-tree node.
///
/// Thread-safe and reference-counted; cloning is cheap and shares the
/// allocation. During normalization every node is uniquely owned, so
/// [`make_mut`][Node::make_mut] mutates in place; once registration has
/// shared nodes into the registries the tree is read-only and `make_mut`
/// would fork, which the compile pipeline never does.
pub struct Node(triomphe::Arc<AstNode>);

impl Node {
    pub fn new(node: AstNode) -> Self {
        Node(triomphe::Arc::new(node))
    }

    /// The id carried by the pointed-to node.
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// Returns whether two `Node`s point to the same memory allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        triomphe::Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a mutable reference to the node, cloning it if necessary.
    ///
    /// See [`Arc::make_mut`][std::sync::Arc::make_mut].
    pub fn make_mut(&mut self) -> &mut AstNode {
        triomphe::Arc::make_mut(&mut self.0)
    }

    /// Returns a mutable reference to the node if it is uniquely owned.
    pub fn get_mut(&mut self) -> Option<&mut AstNode> {
        triomphe::Arc::get_mut(&mut self.0)
    }
}

impl std::ops::Deref for Node {
    type Target = AstNode;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Node(self.0.clone())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
