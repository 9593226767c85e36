use crate::grammar::GrammarError;
use crate::types::DataType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpError {
    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Node index {index} out of bounds for tree of length {length}")]
    InvalidNodeIndex { index: usize, length: usize },

    #[error("{identifier} expects {expected} children, got {actual}")]
    ArityMismatch {
        identifier: String,
        expected: usize,
        actual: usize,
    },

    #[error("{identifier} is undefined for child types {child_types:?}")]
    IllTyped {
        identifier: String,
        child_types: Vec<DataType>,
    },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DataType, actual: DataType },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GpError>;
