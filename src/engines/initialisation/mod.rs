pub mod grammar_builder;
pub mod ramped;
pub mod tree_builder;
pub mod type_table;

pub use grammar_builder::GrammarBuilder;
pub use ramped::ramped_half_and_half;
pub use tree_builder::{BuildMethod, TreeBuilder};
pub use type_table::TypeTable;
