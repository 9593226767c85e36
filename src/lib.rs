pub mod config;
pub mod engines;
pub mod error;
pub mod functions;
pub mod grammar;
pub mod tree;
pub mod types;

pub use engines::initialisation::{BuildMethod, GrammarBuilder, TreeBuilder};
pub use engines::mapping::{
    Chromosome, Codon, CodonGenerator, DepthFirstMapper, DerivationTree, Mapping, MappingFailure,
};
pub use engines::operators::{CrossoverEngine, MutationEngine};
pub use error::{GpError, Result};
pub use functions::registry::SyntaxSet;
pub use grammar::Grammar;
pub use tree::{Node, ProgramTree};
pub use types::{Bindings, DataType, Value};
