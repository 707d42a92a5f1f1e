//! Post-processing for generated query text. Models wrap SQL in fences,
//! append commentary after the statement, and leave `--` notes inline.
//!
//! This is textual clean-up, not parsing. Single-quoted literals are
//! tracked so a `;` or `--` inside one is left alone; double-quoted
//! identifiers and nested comments are not understood.

use std::sync::LazyLock;

use regex::Regex;

// A whole fence line, with or without a language tag (```sql, ```sqlite).
static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*```[\w-]*[ \t]*$").expect("static regex"));

/// Byte offset of the first `needle` outside a single-quoted literal,
/// scanning from the quote state `in_quote`. Also returns the quote state
/// at the match, or at the end of `text` when there is none.
fn find_unquoted(text: &str, needle: &str, mut in_quote: bool) -> (Option<usize>, bool) {
    for (i, c) in text.char_indices() {
        if c == '\'' {
            in_quote = !in_quote;
        } else if !in_quote && text[i..].starts_with(needle) {
            return (Some(i), in_quote);
        }
    }
    (None, in_quote)
}

/// Reduce generator output to a single bare statement.
pub fn clean_generated_sql(raw: &str) -> String {
    let mut text = FENCE_LINE.replace_all(raw, "").replace("```", "");

    if let (Some(pos), _) = find_unquoted(&text, ";", false) {
        if !text[pos + 1..].trim().is_empty() {
            text.truncate(pos + 1);
        }
    }

    let mut in_quote = false;
    let mut lines = Vec::new();
    for line in text.lines() {
        let (cut, state) = find_unquoted(line, "--", in_quote);
        in_quote = state;
        let kept = match cut {
            Some(at) => line[..at].trim_end(),
            None => line.trim_end(),
        };
        if !kept.trim().is_empty() {
            lines.push(kept);
        }
    }
    lines.join("\n").trim().to_string()
}
