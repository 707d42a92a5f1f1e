use thiserror::Error;

/// Failures that abort a single state-machine run.
///
/// Query errors are not in here: they are ordinary state, handled by the
/// repair loop.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("generation failed during {task}: {message}")]
    Generation { task: &'static str, message: String },

    #[error("retrieval failed: {0}")]
    Search(String),

    #[error("schema lookup failed: {0}")]
    Schema(String),

    #[error("final output written twice for question {0}")]
    OutputAlreadySet(String),

    #[error("graph finished without a final output for question {0}")]
    MissingOutput(String),
}
