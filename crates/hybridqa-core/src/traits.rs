use crate::error::QueryError;
use crate::types::{Fields, GenerationTask, SearchHit};

/// Ranked lexical search over the document corpus.
pub trait TextSearch: Send + Sync {
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Read-only access to the tabular dataset.
pub trait QueryExecutor: Send + Sync {
    /// Compact description of the allow-listed tables and their columns.
    fn schema(&self) -> anyhow::Result<String>;
    /// Rendered rows, or the error the engine reported.
    fn execute(&self, sql: &str) -> Result<String, QueryError>;
    /// Citation names of the allow-listed tables mentioned by `sql`.
    fn cite_tables(&self, sql: &str) -> Vec<String>;
}

/// Text-generation backend. Output is untrusted and always post-processed.
pub trait Generator: Send + Sync {
    fn generate(&self, task: &GenerationTask<'_>) -> anyhow::Result<Fields>;
}
