//! Error types shared by analysis, planning and execution.

use thiserror::Error;

/// Discriminator for [`QueryError`], used by callers to decide between
/// retrying on another engine, reporting to the user, or aborting execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxCheck,
    SemanticCheck,
    ExpressionEvaluation,
}

/// Errors that can occur while compiling or executing a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The analyzer refused a construct it does not support yet.
    /// Callers may retry the query under an alternate engine.
    #[error("{0}")]
    SyntaxCheck(String),

    /// Well-formed input that is invalid for the schema or semantics.
    #[error("{0}")]
    SemanticCheck(String),

    /// Failure raised while executing a physical plan.
    #[error("{0}")]
    ExpressionEvaluation(String),
}

impl QueryError {
    pub fn syntax(message: impl Into<String>) -> Self {
        QueryError::SyntaxCheck(message.into())
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        QueryError::SemanticCheck(message.into())
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        QueryError::ExpressionEvaluation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::SyntaxCheck(_) => ErrorKind::SyntaxCheck,
            QueryError::SemanticCheck(_) => ErrorKind::SemanticCheck,
            QueryError::ExpressionEvaluation(_) => ErrorKind::ExpressionEvaluation,
        }
    }

    /// Whether the query may succeed when retried on a different engine.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::SyntaxCheck
    }
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_bare_message() {
        let err = QueryError::semantic("Unsupported aggregation function foo");
        assert_eq!(err.to_string(), "Unsupported aggregation function foo");
        assert_eq!(err.kind(), ErrorKind::SemanticCheck);
    }

    #[test]
    fn test_only_syntax_errors_are_retryable() {
        assert!(QueryError::syntax("array").is_retryable());
        assert!(!QueryError::semantic("unresolved").is_retryable());
        assert!(!QueryError::evaluation("sum over string").is_retryable());
    }
}
