use crate::types::{Bindings, DataType, Value};
use anyhow::Result;
use rand::RngCore;
use std::fmt::Debug;
use std::sync::Arc;

/// A node kind that can appear in a program tree.
///
/// Functions have `arity() > 0`, terminals have `arity() == 0`. New kinds are
/// added by implementing this trait and registering a prototype in a
/// [`SyntaxSet`](super::registry::SyntaxSet).
pub trait Primitive: Debug + Send + Sync {
    /// Name used for rendering and structural equality
    fn identifier(&self) -> &str;

    /// Number of children
    fn arity(&self) -> usize;

    /// Return type for the given child types, or `None` if the combination is ill-typed.
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType>;

    /// Evaluate with already-evaluated child values
    fn evaluate(&self, args: &[Value], bindings: &Bindings) -> Result<Value>;

    /// Produce a fresh instance when this prototype is drawn into a tree.
    ///
    /// Ephemeral random constants override this to fix a new random value;
    /// every other kind is shared as-is.
    fn instantiate(&self, _rng: &mut dyn RngCore) -> Option<Arc<dyn Primitive>> {
        None
    }

    /// Constant payload, if any, compared by structural equality
    fn constant(&self) -> Option<Value> {
        None
    }
}

/// Draw a usable node from a prototype.
pub fn instantiate(prototype: &Arc<dyn Primitive>, rng: &mut dyn RngCore) -> Arc<dyn Primitive> {
    prototype
        .instantiate(rng)
        .unwrap_or_else(|| Arc::clone(prototype))
}
