use crate::error::GpError;
use crate::functions::traits::Primitive;
use crate::types::{Bindings, DataType, Value};
use std::fmt;
use std::sync::Arc;

/// A node of a program tree: a primitive plus exactly `arity` children.
///
/// Construction checks arity and well-typedness, and fields are private, so
/// every `Node` in existence satisfies both. The data type is computed once;
/// operators only ever swap in subtrees of the same type, which keeps it valid.
#[derive(Debug, Clone)]
pub struct Node {
    primitive: Arc<dyn Primitive>,
    data_type: DataType,
    children: Vec<Node>,
}

impl Node {
    /// # Errors
    ///
    /// [`GpError::ArityMismatch`] when the child count differs from the
    /// primitive's arity, [`GpError::IllTyped`] when the primitive has no
    /// return type for the children's types.
    pub fn new(primitive: Arc<dyn Primitive>, children: Vec<Node>) -> Result<Self, GpError> {
        if children.len() != primitive.arity() {
            return Err(GpError::ArityMismatch {
                identifier: primitive.identifier().to_string(),
                expected: primitive.arity(),
                actual: children.len(),
            });
        }
        let child_types: Vec<DataType> = children.iter().map(|c| c.data_type).collect();
        let data_type = primitive
            .return_type(&child_types)
            .ok_or_else(|| GpError::IllTyped {
                identifier: primitive.identifier().to_string(),
                child_types,
            })?;
        Ok(Self {
            primitive,
            data_type,
            children,
        })
    }

    pub fn terminal(primitive: Arc<dyn Primitive>) -> Result<Self, GpError> {
        Self::new(primitive, Vec::new())
    }

    pub fn primitive(&self) -> &Arc<dyn Primitive> {
        &self.primitive
    }

    pub fn identifier(&self) -> &str {
        self.primitive.identifier()
    }

    pub fn arity(&self) -> usize {
        self.children.len()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_types(&self) -> Vec<DataType> {
        self.children.iter().map(|c| c.data_type).collect()
    }

    pub fn is_function(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree
    pub fn length(&self) -> usize {
        1 + self.children.iter().map(Node::length).sum::<usize>()
    }

    /// Longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Post-order evaluation
    pub fn evaluate(&self, bindings: &Bindings) -> anyhow::Result<Value> {
        let args = self
            .children
            .iter()
            .map(|c| c.evaluate(bindings))
            .collect::<anyhow::Result<Vec<_>>>()?;
        self.primitive.evaluate(&args, bindings)
    }

    /// Pre-order lookup, `0` is this node
    pub fn nth(&self, mut n: usize) -> Option<&Node> {
        if n == 0 {
            return Some(self);
        }
        n -= 1;
        for child in &self.children {
            let len = child.length();
            if n < len {
                return child.nth(n);
            }
            n -= len;
        }
        None
    }

    pub fn nth_mut(&mut self, mut n: usize) -> Option<&mut Node> {
        if n == 0 {
            return Some(self);
        }
        n -= 1;
        for child in &mut self.children {
            let len = child.length();
            if n < len {
                return child.nth_mut(n);
            }
            n -= len;
        }
        None
    }

    /// Swap the primitive of this node, keeping the children.
    ///
    /// The replacement must have the same arity and produce the same data type
    /// for the existing children.
    pub fn replace_primitive(&mut self, primitive: Arc<dyn Primitive>) -> Result<(), GpError> {
        if primitive.arity() != self.children.len() {
            return Err(GpError::ArityMismatch {
                identifier: primitive.identifier().to_string(),
                expected: primitive.arity(),
                actual: self.children.len(),
            });
        }
        let child_types = self.child_types();
        match primitive.return_type(&child_types) {
            Some(data_type) if data_type == self.data_type => {
                self.primitive = primitive;
                Ok(())
            }
            Some(actual) => Err(GpError::TypeMismatch {
                expected: self.data_type,
                actual,
            }),
            None => Err(GpError::IllTyped {
                identifier: primitive.identifier().to_string(),
                child_types,
            }),
        }
    }

    pub(crate) fn collect_preorder<'a>(&'a self, out: &mut Vec<&'a Node>) {
        out.push(self);
        for child in &self.children {
            child.collect_preorder(out);
        }
    }

    pub(crate) fn collect_at_depth<'a>(&'a self, depth: usize, out: &mut Vec<&'a Node>) {
        if depth == 0 {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_at_depth(depth - 1, out);
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
            && self.data_type == other.data_type
            && self.primitive.constant() == other.primitive.constant()
            && self.children == other.children
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())?;
        if self.children.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::{Add, And, Literal, Mul, Sub, Variable};

    fn var(name: &str) -> Node {
        Node::terminal(Arc::new(Variable::new(name, DataType::Double))).unwrap()
    }

    #[test]
    fn test_arity_checked() {
        let err = Node::new(Arc::new(Add), vec![var("x")]).unwrap_err();
        assert!(matches!(err, GpError::ArityMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_types_checked() {
        let err = Node::new(Arc::new(And), vec![var("x"), var("y")]).unwrap_err();
        assert!(matches!(err, GpError::IllTyped { .. }));
    }

    #[test]
    fn test_preorder_lookup() {
        // ADD(x MUL(y z))
        let mul = Node::new(Arc::new(Mul), vec![var("y"), var("z")]).unwrap();
        let tree = Node::new(Arc::new(Add), vec![var("x"), mul]).unwrap();
        let order: Vec<&str> = (0..tree.length())
            .map(|i| tree.nth(i).unwrap().identifier())
            .collect();
        assert_eq!(order, vec!["ADD", "x", "MUL", "y", "z"]);
        assert!(tree.nth(5).is_none());
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.to_string(), "ADD(x MUL(y z))");
    }

    #[test]
    fn test_replace_primitive_keeps_children() {
        let mut node = Node::new(Arc::new(Add), vec![var("x"), var("y")]).unwrap();
        node.replace_primitive(Arc::new(Sub)).unwrap();
        assert_eq!(node.to_string(), "SUB(x y)");
        assert!(node.replace_primitive(Arc::new(And)).is_err());
    }

    #[test]
    fn test_structural_equality() {
        let a = Node::new(Arc::new(Add), vec![var("x"), var("y")]).unwrap();
        let b = Node::new(Arc::new(Add), vec![var("x"), var("y")]).unwrap();
        let c = Node::new(Arc::new(Add), vec![var("y"), var("x")]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let one = Node::terminal(Arc::new(Literal::new(Value::Integer(1)))).unwrap();
        let one_double = Node::terminal(Arc::new(Literal::new(Value::Double(1.0)))).unwrap();
        assert_ne!(one, one_double);
    }
}
