//! Domain types shared by the index, the executor and the agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub type ChunkId = String;

/// Executor output for a query that ran cleanly but matched no rows.
pub const NO_RESULTS: &str = "No results found.";

/// A retrievable passage of a source document.
///
/// - `id`: `<doc_id>::chunk<chunk_index>`, unique within the corpus
/// - `doc_id`: file stem of the source document
/// - `chunk_index`: position among the non-empty chunks of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub chunk_index: usize,
    pub content: String,
}

impl CorpusChunk {
    pub fn new(doc_id: &str, chunk_index: usize, content: String) -> Self {
        Self {
            id: format!("{doc_id}::chunk{chunk_index}"),
            doc_id: doc_id.to_string(),
            chunk_index,
            content,
        }
    }
}

/// A ranked chunk returned by a text search. `score` is strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ChunkId,
    pub content: String,
    pub score: f32,
}

/// Which sub-tasks a question needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    DocLookup,
    StructuredQuery,
    Both,
}

impl Route {
    pub fn needs_retrieval(self) -> bool {
        matches!(self, Route::DocLookup | Route::Both)
    }

    pub fn needs_query(self) -> bool {
        matches!(self, Route::StructuredQuery | Route::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Route::DocLookup => "rag",
            Route::StructuredQuery => "sql",
            Route::Both => "hybrid",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the batch input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub question: String,
    pub format_hint: String,
}

/// The payload emitted for every submitted question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalOutput {
    pub id: String,
    pub final_answer: Value,
    pub sql: String,
    pub confidence: f64,
    pub explanation: String,
    pub citations: Vec<String>,
}

impl FinalOutput {
    /// Well-formed record for a question whose run failed outright.
    pub fn degraded(id: &str, explanation: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            final_answer: Value::String("Error".to_string()),
            sql: String::new(),
            confidence: 0.0,
            explanation: explanation.into(),
            citations: Vec::new(),
        }
    }
}

/// A unit of work for the text-generation backend.
///
/// Each variant names its inputs; [`GenerationTask::output_fields`] lists the
/// fields the backend is asked to fill. Whatever comes back is untrusted.
#[derive(Debug, Clone, Copy)]
pub enum GenerationTask<'a> {
    Route {
        question: &'a str,
    },
    Plan {
        question: &'a str,
        context: &'a str,
    },
    GenerateQuery {
        question: &'a str,
        plan: &'a str,
        db_schema: &'a str,
        previous_error: &'a str,
    },
    Synthesize {
        question: &'a str,
        context: &'a str,
        format_hint: &'a str,
    },
}

impl<'a> GenerationTask<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationTask::Route { .. } => "route",
            GenerationTask::Plan { .. } => "plan",
            GenerationTask::GenerateQuery { .. } => "generate_query",
            GenerationTask::Synthesize { .. } => "synthesize",
        }
    }

    pub fn inputs(&self) -> Vec<(&'static str, &'a str)> {
        match *self {
            GenerationTask::Route { question } => vec![("question", question)],
            GenerationTask::Plan { question, context } => {
                vec![("question", question), ("context", context)]
            }
            GenerationTask::GenerateQuery { question, plan, db_schema, previous_error } => vec![
                ("question", question),
                ("plan", plan),
                ("db_schema", db_schema),
                ("previous_error", previous_error),
            ],
            GenerationTask::Synthesize { question, context, format_hint } => vec![
                ("question", question),
                ("context", context),
                ("format_hint", format_hint),
            ],
        }
    }

    pub fn output_fields(&self) -> &'static [&'static str] {
        match self {
            GenerationTask::Route { .. } => &["classification"],
            GenerationTask::Plan { .. } => &["date_range", "filters", "column_logic"],
            GenerationTask::GenerateQuery { .. } => &["sql_query"],
            GenerationTask::Synthesize { .. } => &["final_answer", "explanation"],
        }
    }
}

/// Named text outputs of a generation task. Missing fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, String>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_format() {
        let c = CorpusChunk::new("product_policy", 3, "x".into());
        assert_eq!(c.id, "product_policy::chunk3");
    }

    #[test]
    fn degraded_record_shape() {
        let out = FinalOutput::degraded("q1", "boom");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["final_answer"], "Error");
        assert_eq!(json["sql"], "");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["citations"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn missing_fields_read_empty() {
        let f = Fields::new().with("sql_query", "SELECT 1;");
        assert_eq!(f.text("sql_query"), "SELECT 1;");
        assert_eq!(f.text("explanation"), "");
    }
}
