use super::traits::Primitive;
use crate::error::GpError;
use crate::types::DataType;
use std::sync::Arc;

/// Ordered catalog of function and terminal prototypes for tree-based GP.
///
/// Built once at setup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SyntaxSet {
    primitives: Vec<Arc<dyn Primitive>>,
}

impl SyntaxSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_primitives(primitives: Vec<Arc<dyn Primitive>>) -> Self {
        Self { primitives }
    }

    pub fn register(&mut self, primitive: Arc<dyn Primitive>) -> &mut Self {
        self.primitives.push(primitive);
        self
    }

    /// Builder-style registration
    pub fn with(mut self, primitive: Arc<dyn Primitive>) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn all(&self) -> &[Arc<dyn Primitive>] {
        &self.primitives
    }

    pub fn functions(&self) -> Vec<Arc<dyn Primitive>> {
        self.primitives
            .iter()
            .filter(|p| p.arity() > 0)
            .cloned()
            .collect()
    }

    pub fn terminals(&self) -> Vec<Arc<dyn Primitive>> {
        self.primitives
            .iter()
            .filter(|p| p.arity() == 0)
            .cloned()
            .collect()
    }

    pub fn by_arity(&self, arity: usize) -> Vec<Arc<dyn Primitive>> {
        self.primitives
            .iter()
            .filter(|p| p.arity() == arity)
            .cloned()
            .collect()
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<dyn Primitive>> {
        self.primitives
            .iter()
            .find(|p| p.identifier() == identifier)
            .cloned()
    }

    /// Data types that terminals of this set can produce
    pub fn terminal_types(&self) -> Vec<DataType> {
        let mut types: Vec<DataType> = self
            .primitives
            .iter()
            .filter(|p| p.arity() == 0)
            .filter_map(|p| p.return_type(&[]))
            .collect();
        types.sort();
        types.dedup();
        types
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Check the set can build at least one tree
    pub fn validate(&self) -> Result<(), GpError> {
        if self.primitives.iter().all(|p| p.arity() > 0) {
            return Err(GpError::Configuration(
                "Syntax set contains no terminals".to_string(),
            ));
        }
        if self.terminal_types().is_empty() {
            return Err(GpError::Configuration(
                "No terminal in the syntax set has a defined return type".to_string(),
            ));
        }
        Ok(())
    }
}
