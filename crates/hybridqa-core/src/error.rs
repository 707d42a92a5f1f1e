use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a structured query. Returned as a value by executors, never
/// raised: the orchestration graph decides whether to repair or give up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Rejected by the textual mutation-keyword pre-check before execution.
    #[error("Error: Unsafe query detected (found `{keyword}`).")]
    Unsafe { keyword: String },

    /// Anything the engine reported while preparing or running the query.
    #[error("{0}")]
    Execution(String),
}

impl QueryError {
    pub fn is_unsafe(&self) -> bool {
        matches!(self, QueryError::Unsafe { .. })
    }
}
