//! The question-answering graph: stages, transitions and the dispatcher.
//!
//! ```text
//! Route ──► Retrieve ──► Plan ──► GenerateQuery ──► ExecuteQuery ──► Synthesize
//!   │           │                       ▲                │
//!   │           └──────► Synthesize     └── repair ──────┘
//!   └──► Plan
//! ```
//!
//! Each stage reads the [`TaskState`] and returns a [`StateUpdate`];
//! [`next_stage`] decides where to go from the merged state.
use std::sync::Arc;

use hybridqa_core::config::Settings;
use hybridqa_core::safety::check_read_only;
use hybridqa_core::shape::answer_value_from_text;
use hybridqa_core::traits::{Generator, QueryExecutor, TextSearch};
use hybridqa_core::types::{Fields, FinalOutput, GenerationTask, QuestionRecord, Route};
use tracing::{debug, warn};

use crate::confidence::ConfidencePolicy;
use crate::error::AgentError;
use crate::plan::{documentation_labels, QueryPlan};
use crate::routing::{parse_classification, route_override};
use crate::sql_cleanup::clean_generated_sql;
use crate::state::{QueryOutcome, Retrieval, StateUpdate, TaskState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Route,
    Retrieve,
    Plan,
    GenerateQuery,
    ExecuteQuery,
    Synthesize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Stage(Stage),
    End,
}

/// Transition out of `stage`, given the state after its update was merged.
pub fn next_stage(stage: Stage, state: &TaskState, repair_cap: u32) -> Next {
    let route = state.route.unwrap_or(Route::DocLookup);
    match stage {
        Stage::Route if route.needs_retrieval() => Next::Stage(Stage::Retrieve),
        Stage::Route => Next::Stage(Stage::Plan),
        Stage::Retrieve if route.needs_query() => Next::Stage(Stage::Plan),
        Stage::Retrieve => Next::Stage(Stage::Synthesize),
        Stage::Plan => Next::Stage(Stage::GenerateQuery),
        Stage::GenerateQuery => Next::Stage(Stage::ExecuteQuery),
        Stage::ExecuteQuery => match &state.last_error {
            Some(err) if !err.is_unsafe() && state.repair_count < repair_cap => {
                Next::Stage(Stage::GenerateQuery)
            }
            _ => Next::Stage(Stage::Synthesize),
        },
        Stage::Synthesize => Next::End,
    }
}

/// Hybrid question-answering agent. Cheap to share behind an `Arc`.
pub struct Agent {
    search: Arc<dyn TextSearch>,
    executor: Arc<dyn QueryExecutor>,
    generator: Arc<dyn Generator>,
    top_k: usize,
    repair_cap: u32,
    pub(crate) max_attempts: u32,
    confidence: ConfidencePolicy,
}

impl Agent {
    pub fn new(
        search: Arc<dyn TextSearch>,
        executor: Arc<dyn QueryExecutor>,
        generator: Arc<dyn Generator>,
        settings: &Settings,
    ) -> Self {
        Self {
            search,
            executor,
            generator,
            top_k: settings.retrieval.top_k,
            repair_cap: settings.agent.repair_cap,
            max_attempts: settings.agent.max_attempts.max(1),
            confidence: ConfidencePolicy::new(settings.confidence.clone()),
        }
    }

    /// One pass through the graph. `reuse` is a retrieval from an earlier
    /// attempt at the same question.
    pub fn run(
        &self,
        record: &QuestionRecord,
        reuse: Option<Retrieval>,
    ) -> Result<TaskState, AgentError> {
        let mut state = TaskState::new(record).with_cached_retrieval(reuse);
        let mut stage = Stage::Route;
        loop {
            let update = self.step(stage, &state)?;
            state.apply(update)?;
            match next_stage(stage, &state, self.repair_cap) {
                Next::Stage(next) => {
                    debug!(
                        id = %state.id,
                        from = ?stage,
                        to = ?next,
                        repairs = state.repair_count,
                        "transition"
                    );
                    stage = next;
                }
                Next::End => break,
            }
        }
        if state.final_output.is_none() {
            return Err(AgentError::MissingOutput(state.id));
        }
        Ok(state)
    }

    fn step(&self, stage: Stage, state: &TaskState) -> Result<StateUpdate, AgentError> {
        match stage {
            Stage::Route => self.route(state),
            Stage::Retrieve => self.retrieve(state),
            Stage::Plan => self.plan(state),
            Stage::GenerateQuery => self.generate_query(state),
            Stage::ExecuteQuery => Ok(self.execute_query(state)),
            Stage::Synthesize => self.synthesize(state),
        }
    }

    fn generate(&self, task: GenerationTask<'_>) -> Result<Fields, AgentError> {
        self.generator
            .generate(&task)
            .map_err(|e| AgentError::Generation { task: task.name(), message: format!("{e:#}") })
    }

    fn route(&self, state: &TaskState) -> Result<StateUpdate, AgentError> {
        let route = match route_override(&state.question) {
            Some(forced) => {
                debug!(id = %state.id, route = %forced, "route forced by rule");
                forced
            }
            None => {
                let fields = self.generate(GenerationTask::Route { question: &state.question })?;
                parse_classification(fields.text("classification"))
            }
        };
        Ok(StateUpdate { route: Some(route), ..Default::default() })
    }

    fn retrieve(&self, state: &TaskState) -> Result<StateUpdate, AgentError> {
        let retrieval = match &state.cached_retrieval {
            Some(cached) => cached.clone(),
            None => {
                let hits = self
                    .search
                    .search(&state.question, self.top_k)
                    .map_err(|e| AgentError::Search(format!("{e:#}")))?;
                Retrieval::from_hits(&hits)
            }
        };
        Ok(StateUpdate { retrieval: Some(retrieval), ..Default::default() })
    }

    fn plan(&self, state: &TaskState) -> Result<StateUpdate, AgentError> {
        let context = state.context();
        let fields = self.generate(GenerationTask::Plan { question: &state.question, context })?;
        let labels = documentation_labels(&state.question, context);
        let plan = QueryPlan::from_fields(&fields).sanitized(&labels);
        Ok(StateUpdate { plan: Some(plan), ..Default::default() })
    }

    fn generate_query(&self, state: &TaskState) -> Result<StateUpdate, AgentError> {
        let schema = self.executor.schema().map_err(|e| AgentError::Schema(format!("{e:#}")))?;
        let plan = state.plan.as_ref().map(QueryPlan::render).unwrap_or_default();
        let previous_error = state
            .last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let fields = self.generate(GenerationTask::GenerateQuery {
            question: &state.question,
            plan: &plan,
            db_schema: &schema,
            previous_error: &previous_error,
        })?;
        let sql = clean_generated_sql(fields.text("sql_query"));
        Ok(StateUpdate { sql_query: Some(sql), ..Default::default() })
    }

    fn execute_query(&self, state: &TaskState) -> StateUpdate {
        let sql = state.sql_query.as_deref().unwrap_or("");
        let result = check_read_only(sql).and_then(|()| self.executor.execute(sql));
        let outcome = match result {
            Ok(rows) => QueryOutcome::Rows(rows),
            Err(err) => {
                let attempt = state.repair_count + 1;
                warn!(id = %state.id, attempt, error = %err, "query failed");
                QueryOutcome::Failed(err)
            }
        };
        StateUpdate { outcome: Some(outcome), ..Default::default() }
    }

    fn synthesize(&self, state: &TaskState) -> Result<StateUpdate, AgentError> {
        let mut context = format!(
            "RAG Context: {}\nSQL Result: {}",
            state.context(),
            state.sql_result.as_deref().unwrap_or("None")
        );
        if let Some(err) = &state.last_error {
            context.push_str(&format!("\nSQL Error: {err}"));
        }
        let fields = self.generate(GenerationTask::Synthesize {
            question: &state.question,
            context: &context,
            format_hint: &state.format_hint,
        })?;

        let sql = state.sql_query.clone().unwrap_or_default();
        let mut citations: Vec<String> = Vec::new();
        let doc_cites = state.retrieval.iter().flat_map(|r| r.citations.iter().cloned());
        let table_cites = if sql.is_empty() { Vec::new() } else { self.executor.cite_tables(&sql) };
        for cite in doc_cites.chain(table_cites) {
            if !citations.contains(&cite) {
                citations.push(cite);
            }
        }

        let output = FinalOutput {
            id: state.id.clone(),
            final_answer: answer_value_from_text(fields.text("final_answer")),
            sql,
            confidence: self.confidence.score(state),
            explanation: fields.text("explanation").trim().to_string(),
            citations,
        };
        Ok(StateUpdate { final_output: Some(output), ..Default::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridqa_core::error::QueryError;

    fn state(route: Route) -> TaskState {
        let mut s = TaskState::new(&QuestionRecord {
            id: "q".into(),
            question: "q".into(),
            format_hint: "int".into(),
        });
        s.route = Some(route);
        s
    }

    #[test]
    fn routes_fan_out() {
        let cases = [
            (Stage::Route, Route::DocLookup, Next::Stage(Stage::Retrieve)),
            (Stage::Route, Route::Both, Next::Stage(Stage::Retrieve)),
            (Stage::Route, Route::StructuredQuery, Next::Stage(Stage::Plan)),
            (Stage::Retrieve, Route::DocLookup, Next::Stage(Stage::Synthesize)),
            (Stage::Retrieve, Route::Both, Next::Stage(Stage::Plan)),
            (Stage::Synthesize, Route::Both, Next::End),
        ];
        for (stage, route, expected) in cases {
            assert_eq!(next_stage(stage, &state(route), 2), expected, "{stage:?} / {route:?}");
        }
    }

    #[test]
    fn execution_errors_repair_until_cap() {
        let mut s = state(Route::StructuredQuery);
        s.last_error = Some(QueryError::Execution("no such column".into()));
        s.repair_count = 1;
        assert_eq!(next_stage(Stage::ExecuteQuery, &s, 2), Next::Stage(Stage::GenerateQuery));
        s.repair_count = 2;
        assert_eq!(next_stage(Stage::ExecuteQuery, &s, 2), Next::Stage(Stage::Synthesize));
    }

    #[test]
    fn unsafe_queries_skip_repair() {
        let mut s = state(Route::StructuredQuery);
        s.last_error = Some(QueryError::Unsafe { keyword: "DROP".into() });
        s.repair_count = 1;
        assert_eq!(next_stage(Stage::ExecuteQuery, &s, 2), Next::Stage(Stage::Synthesize));
    }

    #[test]
    fn success_goes_to_synthesis() {
        let mut s = state(Route::StructuredQuery);
        s.sql_result = Some("| n |".into());
        assert_eq!(next_stage(Stage::ExecuteQuery, &s, 2), Next::Stage(Stage::Synthesize));
    }
}
