//! Error types for filter compilation and evaluation.

use thiserror::Error;

/// Errors that can occur while compiling or evaluating a filter
#[derive(Error, Debug)]
pub enum FilterError {
    /// The operator cannot be handled by the component it reached
    #[error("Operator {operator} is not supported by the {context}")]
    UnsupportedOperator {
        operator: String,
        context: &'static str,
    },

    /// A clause value could not be turned into a query literal
    #[error("Malformed value '{value}': {reason}")]
    MalformedValue { value: String, reason: String },

    /// The filter mode cannot be executed by the requested strategy
    #[error("Unsupported filter mode: {0}")]
    UnsupportedMode(String),

    /// A stored filter definition could not be decoded or encoded
    #[error("Invalid filter definition: {0}")]
    InvalidDefinition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
