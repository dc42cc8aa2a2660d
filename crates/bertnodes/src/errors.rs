//! # Error Types

/// Errors from bertnodes operations.
#[derive(Debug, thiserror::Error)]
pub enum BertNodesError {
    /// A settings value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The input data can't be processed.
    #[error("invalid input: {0}")]
    Input(String),

    /// A configured column is missing from the input table.
    #[error("input table doesn't contain column: {0}")]
    MissingColumn(String),

    /// A required cell is null.
    #[error("missing value in column {column:?} at row {row}")]
    MissingValue {
        /// The column containing the null cell.
        column: String,

        /// The zero-based row of the null cell.
        row: usize,
    },

    /// A label is not part of the class dictionary.
    #[error("unknown class: {0:?}")]
    UnknownClass(String),

    /// The subword tokenizer failed.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// A persisted artifact attribute has the wrong shape.
    #[error("artifact attribute {name:?}: {message}")]
    Attribute {
        /// The attribute key.
        name: String,

        /// What went wrong.
        message: String,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Arrow error.
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error from an external component (model backends, downloads).
    #[error("{0}")]
    External(String),
}

impl BertNodesError {
    /// Wrap a [`tokenizers`] error.
    pub fn tokenizer(err: tokenizers::Error) -> Self {
        Self::Tokenizer(err.to_string())
    }

    /// Wrap an error from an external component.
    pub fn external<E: std::fmt::Display>(err: E) -> Self {
        Self::External(err.to_string())
    }
}

/// Result type for bertnodes operations.
pub type BNResult<T> = core::result::Result<T, BertNodesError>;
