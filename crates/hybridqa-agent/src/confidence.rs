use hybridqa_core::config::ConfidenceSettings;
use hybridqa_core::types::NO_RESULTS;

use crate::state::TaskState;

/// Heuristic confidence in a synthesized answer.
///
/// `base + query_bonus·[query succeeded] + retrieval_bonus·relevance
/// − repair_penalty·repairs`, clamped to [0, 1] and rounded to two places.
/// Relevance is the best retrieval score over `relevance_ceiling`, capped at 1.
#[derive(Debug, Clone)]
pub struct ConfidencePolicy {
    settings: ConfidenceSettings,
}

impl ConfidencePolicy {
    pub fn new(settings: ConfidenceSettings) -> Self {
        Self { settings }
    }

    pub fn score(&self, state: &TaskState) -> f64 {
        let s = &self.settings;
        let mut score = s.base;
        if query_succeeded(state) {
            score += s.query_bonus;
        }
        if s.relevance_ceiling > 0.0 {
            let relevance =
                (f64::from(state.max_relevance()) / s.relevance_ceiling).clamp(0.0, 1.0);
            score += s.retrieval_bonus * relevance;
        }
        score -= s.repair_penalty * f64::from(state.repair_count);
        (score.clamp(0.0, 1.0) * 100.0).round() / 100.0
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self::new(ConfidenceSettings::default())
    }
}

/// A query counts as successful only if it returned at least one row.
fn query_succeeded(state: &TaskState) -> bool {
    if state.last_error.is_some() {
        return false;
    }
    match state.sql_result.as_deref() {
        Some(rows) => {
            let rows = rows.trim();
            !rows.is_empty() && rows != NO_RESULTS && !rows.starts_with("Error")
        }
        None => false,
    }
}
