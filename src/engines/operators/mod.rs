pub mod chromosome;
pub mod crossover;
pub mod mutation;

pub use crossover::{CrossoverEngine, CrossoverOutcome};
pub use mutation::{point_mutation, subtree_mutation, MutationEngine};
