//! Textual read-only guard for generated SQL.
//!
//! This is a keyword scan, not a parser: it rejects any statement that
//! mentions a mutation keyword as a whole word, including inside string
//! literals, and it cannot prove a statement harmless. Executors should
//! still open their connections read-only.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::QueryError;

static MUTATION_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(drop|delete|insert|update|alter|create|truncate|attach|detach|vacuum|reindex)\b",
    )
    .expect("static regex")
});

pub fn check_read_only(sql: &str) -> Result<(), QueryError> {
    match MUTATION_KEYWORD.find(sql) {
        Some(m) => Err(QueryError::Unsafe { keyword: m.as_str().to_ascii_uppercase() }),
        None => Ok(()),
    }
}
