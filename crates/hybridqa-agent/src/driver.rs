//! Outer validation loop around the graph.
use hybridqa_core::shape::validate_and_coerce;
use hybridqa_core::types::{FinalOutput, QuestionRecord};
use tracing::{info, warn};

use crate::error::AgentError;
use crate::graph::Agent;

impl Agent {
    /// Answer one question. Never fails: any [`AgentError`] becomes a
    /// degraded record carrying the error text.
    pub fn answer(&self, record: &QuestionRecord) -> FinalOutput {
        match self.answer_validated(record) {
            Ok(output) => output,
            Err(err) => {
                warn!(id = %record.id, error = %err, "question degraded");
                FinalOutput::degraded(&record.id, err.to_string())
            }
        }
    }

    /// Run the graph until the answer matches the format hint, at most
    /// `max_attempts` times. Each attempt starts with a fresh error and
    /// repair count but reuses the first attempt's retrieval. When no
    /// attempt validates, the last output is returned as-is.
    pub fn answer_validated(&self, record: &QuestionRecord) -> Result<FinalOutput, AgentError> {
        let mut retrieval = None;
        let mut last = None;
        for attempt in 1..=self.max_attempts {
            info!(id = %record.id, attempt, "answering");
            let state = self.run(record, retrieval.take())?;
            retrieval = state.retrieval;
            let mut output = state
                .final_output
                .ok_or_else(|| AgentError::MissingOutput(record.id.clone()))?;

            let (ok, coerced) = validate_and_coerce(&output.final_answer, &record.format_hint);
            if ok {
                output.final_answer = coerced;
                return Ok(output);
            }
            warn!(
                id = %record.id,
                attempt,
                hint = %record.format_hint,
                "answer does not match format hint"
            );
            last = Some(output);
        }
        last.ok_or_else(|| AgentError::MissingOutput(record.id.clone()))
    }
}
