//! Query error types

use thiserror::Error;

/// Match expression failed to lex, parse or resolve
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct CompileError {
    /// Human-readable reason
    pub message: String,
    /// Byte offset into the expression where the problem was detected
    pub offset: usize,
}

impl CompileError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Runtime error raised while evaluating a query against a value
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result alias for evaluation steps
pub type EvalResult<T> = std::result::Result<T, EvalError>;
