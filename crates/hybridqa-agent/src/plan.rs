//! Structured query plan and the label sanitiser applied to it.
//!
//! Campaign names and other document titles are business labels, not values
//! stored in any column, so a filter clause mentioning one would only ever
//! produce an empty result. Such clauses are dropped before the plan reaches
//! query generation; the date range they imply stays.

use std::ops::Range;
use std::sync::LazyLock;

use hybridqa_core::types::Fields;
use regex::Regex;

// An opening quote must not follow a word character, so apostrophes in
// contractions ("What's") never start a label.
static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[^\w'])'([^']{2,})'|"([^"]{2,})""#).expect("static regex")
});
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s*(.+?)\s*$").expect("static regex"));
static CLAUSE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[,;]|\band\b").expect("static regex"));
// Spans whose separators belong to the clause: `BETWEEN x AND y` and string literals.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbetween\s+(?:'[^']*'|\S+)\s+and\s+(?:'[^']*'|\S+)|'[^']*'")
        .expect("static regex")
});

const LABEL_MARKERS: &[&str] = &["marketing_calendar", "marketing calendar", "campaign"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub date_range: String,
    pub filters: String,
    pub column_logic: String,
}

impl QueryPlan {
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            date_range: fields.text("date_range").trim().to_string(),
            filters: fields.text("filters").trim().to_string(),
            column_logic: fields.text("column_logic").trim().to_string(),
        }
    }

    /// Drop every filter clause that names a documentation label.
    pub fn sanitized(mut self, labels: &[String]) -> Self {
        self.filters = without_labels(&self.filters, labels);
        self
    }

    /// Text form handed to query generation.
    pub fn render(&self) -> String {
        format!(
            "date_range: {}\nfilters: {}\ncolumn_logic: {}",
            self.date_range, self.filters, self.column_logic
        )
    }
}

/// Labels that must never become filters: quoted spans in the question and
/// header titles in the retrieved context. Lower-cased, deduplicated.
pub fn documentation_labels(question: &str, context: &str) -> Vec<String> {
    let quoted = QUOTED
        .captures_iter(question)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str());
    let headers = HEADER
        .captures_iter(context)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str());

    let mut labels: Vec<String> = Vec::new();
    for label in quoted.chain(headers) {
        let label = label.trim().to_lowercase();
        if !label.is_empty() && !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Clauses of `filters`, each paired with the separator that preceded it.
/// Separators inside a `BETWEEN .. AND ..` span or a string literal do not
/// split.
fn split_clauses(filters: &str) -> Vec<(&str, &str)> {
    let protected: Vec<Range<usize>> =
        PROTECTED.find_iter(filters).map(|m| m.range()).collect();
    let mut clauses = Vec::new();
    let mut start = 0;
    let mut sep = "";
    for m in CLAUSE_SPLIT.find_iter(filters) {
        if protected.iter().any(|r| r.contains(&m.start())) {
            continue;
        }
        clauses.push((sep, &filters[start..m.start()]));
        sep = m.as_str();
        start = m.end();
    }
    clauses.push((sep, &filters[start..]));
    clauses
}

fn names_label(clause: &str, labels: &[String]) -> bool {
    let lower = clause.to_lowercase();
    LABEL_MARKERS.iter().any(|m| lower.contains(m))
        || labels.iter().any(|l| lower.contains(l.as_str()))
}

/// Remove the clauses that name a label. Surviving clauses keep their text
/// and the separators between them.
pub fn without_labels(filters: &str, labels: &[String]) -> String {
    let mut out = String::new();
    for (sep, clause) in split_clauses(filters) {
        let clause = clause.trim();
        if clause.is_empty() || names_label(clause, labels) {
            continue;
        }
        if !out.is_empty() {
            if sep.starts_with([',', ';']) {
                out.push_str(sep);
                out.push(' ');
            } else {
                out.push(' ');
                out.push_str(sep);
                out.push(' ');
            }
        }
        out.push_str(clause);
    }
    if out.is_empty() {
        "None".to_string()
    } else {
        out
    }
}
