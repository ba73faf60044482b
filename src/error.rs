//! Codec and session errors.
//!
//! Only structural and conflict failures ever reach the caller. Degenerate
//! numeric input is absorbed by the sampler and the constraint enforcer.

use thiserror::Error;

/// Codec result type
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Coarse classification for user-facing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete input. Nothing is applied.
    Structural,
    /// Duplicate scenario id whose rows disagree.
    Conflict,
}

/// Session file encode/decode errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("cannot export an empty session: add at least one scenario")]
    EmptySession,

    #[error("session file is empty: expected a header row")]
    EmptyInput,

    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("line {line}: scenario_id is blank")]
    BlankScenarioId { line: usize },

    #[error("line {line}, column {column}: {value:?} is not a number")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },

    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("scenario {scenario_id:?}: {column} is not a finite number")]
    NonFiniteValue { scenario_id: String, column: String },

    #[error(
        "scenario {scenario_id:?} is listed more than once with different values in: {}",
        .columns.join(", ")
    )]
    Conflict {
        scenario_id: String,
        columns: Vec<String>,
    },
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Conflict { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Structural,
        }
    }
}

/// Host-session lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("scenario not found: {0}")]
    UnknownScenario(String),

    #[error("scenario id already in use: {0}")]
    DuplicateScenarioId(String),

    #[error("{0:?} is a reserved column and cannot be an attribute")]
    ReservedAttribute(String),

    #[error("scenario id is blank")]
    BlankScenarioId,

    #[error("attribute name is blank")]
    BlankAttributeKey,
}
