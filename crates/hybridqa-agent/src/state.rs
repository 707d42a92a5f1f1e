//! The record threaded through the graph, and the partial updates stages
//! return.
//!
//! Stages never touch `TaskState` directly. They read it and hand back a
//! [`StateUpdate`]; the dispatcher merges it with [`TaskState::apply`], which
//! is the only place that enforces the record's invariants.

use hybridqa_core::error::QueryError;
use hybridqa_core::types::{FinalOutput, QuestionRecord, Route, SearchHit};

use crate::error::AgentError;
use crate::plan::QueryPlan;

/// Everything the Retrieve stage learned. Context, citations and relevance
/// only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub context: String,
    pub citations: Vec<String>,
    pub max_score: f32,
}

impl Retrieval {
    pub fn from_hits(hits: &[SearchHit]) -> Self {
        Self {
            context: hits.iter().map(|h| h.content.as_str()).collect::<Vec<_>>().join("\n"),
            citations: hits.iter().map(|h| h.id.clone()).collect(),
            max_score: hits.iter().map(|h| h.score).fold(0.0, f32::max),
        }
    }
}

/// Result of one Execute-Query visit.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(String),
    Failed(QueryError),
}

#[derive(Debug, Clone)]
pub struct TaskState {
    pub id: String,
    pub question: String,
    pub format_hint: String,
    pub route: Option<Route>,
    pub retrieval: Option<Retrieval>,
    /// Retrieval from an earlier attempt at the same question, adopted by
    /// the Retrieve stage instead of searching again.
    pub cached_retrieval: Option<Retrieval>,
    pub plan: Option<QueryPlan>,
    pub sql_query: Option<String>,
    pub sql_result: Option<String>,
    pub last_error: Option<QueryError>,
    pub repair_count: u32,
    pub final_output: Option<FinalOutput>,
}

impl TaskState {
    pub fn new(record: &QuestionRecord) -> Self {
        Self {
            id: record.id.clone(),
            question: record.question.clone(),
            format_hint: record.format_hint.clone(),
            route: None,
            retrieval: None,
            cached_retrieval: None,
            plan: None,
            sql_query: None,
            sql_result: None,
            last_error: None,
            repair_count: 0,
            final_output: None,
        }
    }

    pub fn with_cached_retrieval(mut self, retrieval: Option<Retrieval>) -> Self {
        self.cached_retrieval = retrieval;
        self
    }

    pub fn context(&self) -> &str {
        self.retrieval.as_ref().map_or("", |r| r.context.as_str())
    }

    pub fn max_relevance(&self) -> f32 {
        self.retrieval.as_ref().map_or(0.0, |r| r.max_score)
    }

    pub fn apply(&mut self, update: StateUpdate) -> Result<(), AgentError> {
        if let Some(route) = update.route {
            self.route = Some(route);
        }
        if let Some(retrieval) = update.retrieval {
            self.retrieval = Some(retrieval);
        }
        if let Some(plan) = update.plan {
            self.plan = Some(plan);
        }
        if let Some(sql) = update.sql_query {
            self.sql_query = Some(sql);
        }
        match update.outcome {
            Some(QueryOutcome::Rows(rows)) => {
                self.sql_result = Some(rows);
                self.last_error = None;
            }
            Some(QueryOutcome::Failed(err)) => {
                self.sql_result = None;
                self.last_error = Some(err);
                self.repair_count += 1;
            }
            None => {}
        }
        if let Some(output) = update.final_output {
            if self.final_output.is_some() {
                return Err(AgentError::OutputAlreadySet(self.id.clone()));
            }
            self.final_output = Some(output);
        }
        Ok(())
    }
}

/// Partial state produced by a stage. Unset fields leave the state alone.
#[derive(Debug, Default)]
pub struct StateUpdate {
    pub route: Option<Route>,
    pub retrieval: Option<Retrieval>,
    pub plan: Option<QueryPlan>,
    pub sql_query: Option<String>,
    pub outcome: Option<QueryOutcome>,
    pub final_output: Option<FinalOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> TaskState {
        TaskState::new(&QuestionRecord {
            id: "q1".into(),
            question: "How many?".into(),
            format_hint: "int".into(),
        })
    }

    fn output() -> FinalOutput {
        FinalOutput {
            id: "q1".into(),
            final_answer: json!(1),
            sql: String::new(),
            confidence: 0.5,
            explanation: String::new(),
            citations: vec![],
        }
    }

    #[test]
    fn failed_outcome_counts_one_repair_each() {
        let mut s = state();
        for _ in 0..3 {
            let err = QueryError::Execution("no such column: x".into());
            s.apply(StateUpdate {
                outcome: Some(QueryOutcome::Failed(err)),
                ..Default::default()
            })
            .unwrap();
        }
        assert_eq!(s.repair_count, 3);
        assert!(s.sql_result.is_none());
    }

    #[test]
    fn success_clears_error_without_counting() {
        let mut s = state();
        s.apply(StateUpdate {
            outcome: Some(QueryOutcome::Failed(QueryError::Execution("boom".into()))),
            ..Default::default()
        })
        .unwrap();
        s.apply(StateUpdate {
            outcome: Some(QueryOutcome::Rows("| n |".into())),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(s.repair_count, 1);
        assert!(s.last_error.is_none());
        assert_eq!(s.sql_result.as_deref(), Some("| n |"));
    }

    #[test]
    fn final_output_is_written_once() {
        let mut s = state();
        s.apply(StateUpdate { final_output: Some(output()), ..Default::default() }).unwrap();
        let err = s.apply(StateUpdate { final_output: Some(output()), ..Default::default() });
        assert!(matches!(err, Err(AgentError::OutputAlreadySet(_))));
    }

    #[test]
    fn retrieval_from_hits() {
        let hits = vec![
            SearchHit { id: "a::chunk0".into(), content: "alpha".into(), score: 2.5 },
            SearchHit { id: "b::chunk1".into(), content: "beta".into(), score: 4.0 },
        ];
        let r = Retrieval::from_hits(&hits);
        assert_eq!(r.context, "alpha\nbeta");
        assert_eq!(r.citations, vec!["a::chunk0", "b::chunk1"]);
        assert_eq!(r.max_score, 4.0);
        assert_eq!(Retrieval::from_hits(&[]).max_score, 0.0);
    }
}
