mod error;
mod model;
mod parser;

pub use error::GrammarError;
pub use model::{Grammar, Production, Rule, RuleId, Symbol};
