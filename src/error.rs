use crate::problem::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Parse Error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Data Validation Error: {0}")]
    Validation(String),

    /// The initial table does not hold exactly M+N-1 occupied cells.
    #[error("Degenerate initial solution: expected {expected} occupied cells, found {found}")]
    Degenerate { expected: usize, found: usize },

    /// The occupied cells no longer form a spanning tree.
    #[error("Structural inconsistency at {position}: {reason}")]
    Structure { position: Position, reason: String },
}

impl TransportError {
    pub(crate) fn structure(position: Position, reason: impl Into<String>) -> Self {
        Self::Structure {
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type TpResult<T> = Result<T, TransportError>;
