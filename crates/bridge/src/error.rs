//! memuc bridge errors

use crate::response::ParsedValue;
use crate::selector::SelectorError;

/// Errors surfaced by memuc operations
#[derive(Debug, thiserror::Error)]
pub enum MemucError {
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("memuc {operation} failed (exit code {exit_code}): {output}")]
    OperationFailed {
        operation: String,
        exit_code: i32,
        output: String,
    },
    #[error("memuc {operation} produced {value:?} instead of the declared result shape")]
    ShapeMismatch { operation: String, value: ParsedValue },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for memuc operations
pub type Result<T> = std::result::Result<T, MemucError>;

impl MemucError {
    pub(crate) fn failed(operation: &str, exit_code: i32, output: &str) -> Self {
        MemucError::OperationFailed {
            operation: operation.to_string(),
            exit_code,
            output: output.to_string(),
        }
    }

    /// Exit code of a failed memuc run
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            MemucError::OperationFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Whether the error was raised before memuc was invoked
    pub fn is_caller_error(&self) -> bool {
        matches!(self, MemucError::Selector(_) | MemucError::InvalidArgument(_))
    }
}
