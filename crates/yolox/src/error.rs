use std::io;
use thiserror::Error;

/// Which lookup an [`YoloxError::IndexOutOfRange`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Proposal,
    Class,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Proposal => f.write_str("proposal"),
            IndexKind::Class => f.write_str("class"),
        }
    }
}

#[derive(Error, Debug)]
pub enum YoloxError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: expected {expected} values, got {actual}")]
    InvalidInput { expected: usize, actual: usize },

    #[error("Invalid tensor shape: {0:?}")]
    InvalidShape(Vec<usize>),

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        len: usize,
    },

    #[error("Resource load error: {0}")]
    ResourceLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, YoloxError>;
