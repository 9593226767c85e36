use thiserror::Error;

/// Errors produced while compiling grammar text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("reference to undefined rule <{0}>")]
    UndefinedRule(String),

    #[error("rule <{0}> is defined more than once")]
    DuplicateRule(String),

    #[error("rule <{0}> has no finite derivation")]
    NoFiniteDerivation(String),

    #[error("grammar contains no rules")]
    Empty,
}
