use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// `completed` クエリは "true" / "false" のみ受け付ける
    #[error("Invalid completed filter: {0:?} (expected \"true\" or \"false\")")]
    InvalidFilter(String),
}
