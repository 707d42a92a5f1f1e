//! Fixed query expansion for retail vocabulary.
//!
//! Triggers are matched as substrings of the lower-cased original query.
//! Every matching entry appends its terms once, in table order. Appended
//! terms are never themselves checked for triggers.

pub struct Expansion {
    pub triggers: &'static [&'static str],
    pub terms: &'static str,
}

pub const QUERY_EXPANSIONS: &[Expansion] = &[
    Expansion { triggers: &["return", "policy"], terms: "returns policy days window" },
    Expansion { triggers: &["beverage"], terms: "beverages drinks unopened opened" },
    Expansion { triggers: &["aov", "average order value"], terms: "aov order value revenue" },
    Expansion { triggers: &["kpi"], terms: "kpi definition formula metric" },
    Expansion { triggers: &["summer", "winter"], terms: "marketing calendar campaign dates" },
    Expansion {
        triggers: &["category", "categories"],
        terms: "category categories product beverages dairy confections",
    },
];

pub fn expand_query(query: &str) -> String {
    let lowered = query.to_lowercase();
    let mut expanded = lowered.clone();
    for expansion in QUERY_EXPANSIONS {
        if expansion.triggers.iter().any(|t| lowered.contains(t)) {
            expanded.push(' ');
            expanded.push_str(expansion.terms);
        }
    }
    expanded
}
