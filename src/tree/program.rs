use super::node::Node;
use crate::error::GpError;
use crate::types::{Bindings, DataType, Value};
use std::fmt;

/// A candidate program: owns its whole node tree.
///
/// Nodes are addressed by pre-order index, root = 0. All index-based access is
/// bounds-checked against [`ProgramTree::length`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramTree {
    root: Node,
}

impl ProgramTree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn data_type(&self) -> DataType {
        self.root.data_type()
    }

    pub fn evaluate(&self, bindings: &Bindings) -> anyhow::Result<Value> {
        self.root.evaluate(bindings)
    }

    pub fn length(&self) -> usize {
        self.root.length()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn nth_node(&self, n: usize) -> Result<&Node, GpError> {
        let length = self.length();
        self.root
            .nth(n)
            .ok_or(GpError::InvalidNodeIndex { index: n, length })
    }

    pub fn nth_node_mut(&mut self, n: usize) -> Result<&mut Node, GpError> {
        let length = self.length();
        self.root
            .nth_mut(n)
            .ok_or(GpError::InvalidNodeIndex { index: n, length })
    }

    /// Replace the subtree at pre-order index `n`, returning the old subtree.
    ///
    /// The replacement must have the data type of the subtree it replaces, so
    /// every ancestor stays well-typed. Index 0 replaces the whole program.
    pub fn set_nth_node(&mut self, n: usize, node: Node) -> Result<Node, GpError> {
        let target = self.nth_node_mut(n)?;
        if target.data_type() != node.data_type() {
            return Err(GpError::TypeMismatch {
                expected: target.data_type(),
                actual: node.data_type(),
            });
        }
        Ok(std::mem::replace(target, node))
    }

    /// Nodes `depth` edges below the root, left to right; empty past the tree's depth
    pub fn nodes_at_depth(&self, depth: usize) -> Vec<&Node> {
        let mut out = Vec::new();
        self.root.collect_at_depth(depth, &mut out);
        out
    }

    /// Pre-order snapshot for repeated index lookups
    pub fn flatten(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.length());
        self.root.collect_preorder(&mut out);
        out
    }

    pub fn function_indices(&self) -> Vec<usize> {
        self.indices_where(Node::is_function)
    }

    pub fn terminal_indices(&self) -> Vec<usize> {
        self.indices_where(Node::is_terminal)
    }

    pub fn indices_where<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(&Node) -> bool,
    {
        self.flatten()
            .into_iter()
            .enumerate()
            .filter(|(_, node)| predicate(*node))
            .map(|(i, _)| i)
            .collect()
    }
}

impl From<Node> for ProgramTree {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for ProgramTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
