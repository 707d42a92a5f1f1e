//! hybridqa-agent
//!
//! The question-answering state machine. A question flows through
//! Route → (Retrieve) → (Plan → Generate-Query ⇄ Execute-Query) → Synthesize;
//! [`Agent::answer`] wraps that graph in a shape-validation retry loop and
//! always yields a well-formed [`FinalOutput`](hybridqa_core::types::FinalOutput).
pub mod batch;
pub mod confidence;
pub mod driver;
pub mod error;
pub mod graph;
pub mod ollama;
pub mod plan;
pub mod routing;
pub mod sql_cleanup;
pub mod state;

pub use error::AgentError;
pub use graph::{next_stage, Agent, Next, Stage};
pub use state::{QueryOutcome, Retrieval, StateUpdate, TaskState};
