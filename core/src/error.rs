use tabula_types::{DbType, Dialect};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabulaError {
    /// A null, empty or otherwise invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Positional access outside the valid range
    #[error("Index {index} is out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A row or column addressed by a name that does not exist
    #[error("No column or row named `{0}`")]
    KeyNotFound(String),

    /// The operation is not valid in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The dialect has no way to express the operation
    #[error("{operation} is not supported by the {dialect} dialect")]
    Unsupported {
        dialect: Dialect,
        operation: &'static str,
    },

    /// Missing or inconsistent entity metadata
    #[error("Schema error on `{entity}`: {message}")]
    Schema { entity: String, message: String },

    /// A recorded query that cannot form a statement
    #[error("Compilation error: {0}")]
    Compilation(String),

    /// A value that cannot be converted to the requested type
    #[error("Cannot convert {from} value to {to}")]
    Conversion { from: DbType, to: DbType },

    /// Error raised by an executor collaborator
    #[error("Execution error: {0}")]
    Execution(String),
}

/// Broad classification of [`TabulaError`] used by callers that only care
/// about who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Schema,
    Compilation,
    Conversion,
    Execution,
}

impl TabulaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TabulaError::InvalidArgument(_)
            | TabulaError::IndexOutOfRange { .. }
            | TabulaError::KeyNotFound(_)
            | TabulaError::InvalidOperation(_)
            | TabulaError::Unsupported { .. } => ErrorKind::Usage,
            TabulaError::Schema { .. } => ErrorKind::Schema,
            TabulaError::Compilation(_) => ErrorKind::Compilation,
            TabulaError::Conversion { .. } => ErrorKind::Conversion,
            TabulaError::Execution(_) => ErrorKind::Execution,
        }
    }

    pub(crate) fn schema(entity: impl Into<String>, message: impl Into<String>) -> Self {
        TabulaError::Schema {
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        TabulaError::IndexOutOfRange { index, len }
    }
}

/// Result type for tabula operations
pub type Result<T> = std::result::Result<T, TabulaError>;
