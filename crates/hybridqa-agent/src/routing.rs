//! Route selection: classifier output, overridden by two fixed rules.
//!
//! The rules are plain substring checks over the lower-cased question:
//! - policy phrasing (`policy`, or `return` with `window`/`days`/`policy`)
//!   always goes to document lookup;
//! - a KPI term together with a named seasonal campaign always takes the
//!   combined route, since the campaign's dates live in the documents and the
//!   metric lives in the database.

use hybridqa_core::types::Route;

const KPI_TERMS: &[&str] = &[
    "aov",
    "average order value",
    "gross margin",
    "margin",
    "revenue",
    "kpi",
];
const CAMPAIGN_TERMS: &[&str] = &["summer", "winter", "campaign"];
const RETURN_QUALIFIERS: &[&str] = &["window", "days", "policy"];

pub fn is_policy_question(question: &str) -> bool {
    let q = question.to_lowercase();
    q.contains("policy")
        || (q.contains("return") && RETURN_QUALIFIERS.iter().any(|t| q.contains(t)))
}

pub fn is_campaign_kpi_question(question: &str) -> bool {
    let q = question.to_lowercase();
    KPI_TERMS.iter().any(|t| q.contains(t)) && CAMPAIGN_TERMS.iter().any(|t| q.contains(t))
}

/// The forced route for `question`, if either rule applies. Policy wins.
pub fn route_override(question: &str) -> Option<Route> {
    if is_policy_question(question) {
        Some(Route::DocLookup)
    } else if is_campaign_kpi_question(question) {
        Some(Route::Both)
    } else {
        None
    }
}

/// Map free-form classifier text to a route. Anything unrecognised falls
/// back to document lookup.
pub fn parse_classification(text: &str) -> Route {
    let t = text.to_lowercase();
    if t.contains("hybrid") || t.contains("both") {
        Route::Both
    } else if t.contains("sql") {
        Route::StructuredQuery
    } else {
        Route::DocLookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_questions_force_doc_lookup() {
        for q in [
            "What is the return window for opened beverages?",
            "According to the product policy, how many days for dairy?",
            "Return days for unopened Beverages",
        ] {
            assert_eq!(route_override(q), Some(Route::DocLookup), "{q}");
        }
    }

    #[test]
    fn kpi_with_campaign_forces_both() {
        assert_eq!(
            route_override(
                "Using the AOV definition, what was the AOV during 'Winter Classics 1997'?"
            ),
            Some(Route::Both)
        );
        assert_eq!(
            route_override("Total revenue from Beverages during Summer Beverages 1997"),
            Some(Route::Both)
        );
    }

    #[test]
    fn plain_questions_have_no_override() {
        assert_eq!(route_override("Total revenue from all orders"), None);
        assert_eq!(route_override("Top 3 products by revenue all-time"), None);
        assert_eq!(route_override("Which category sold most in summer?"), None);
    }

    #[test]
    fn classification_parsing() {
        assert_eq!(parse_classification("SQL"), Route::StructuredQuery);
        assert_eq!(parse_classification(" hybrid "), Route::Both);
        assert_eq!(parse_classification("hybrid (sql + rag)"), Route::Both);
        assert_eq!(parse_classification("rag"), Route::DocLookup);
        assert_eq!(parse_classification("I am not sure"), Route::DocLookup);
    }
}
