use std::fs;
use std::path::Path;

use hybridqa_core::traits::TextSearch;
use hybridqa_core::types::CorpusChunk;
use hybridqa_text::TextIndex;
use tempfile::TempDir;

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("product_policy.md"),
        "# Returns & Policy\n- Perishables (Produce, Dairy): 3-7 days.\n- Beverages unopened: 14 days; opened: no returns.\n- Non-perishables: 30 days.\n",
    )
    .unwrap();
    fs::write(
        dir.join("marketing_calendar.md"),
        "# Northwind Marketing Calendar (1997)\n\n## Summer Beverages 1997\n- Dates: 1997-06-01 to 1997-06-30\n- Notes: Focus on Beverages and Condiments.\n\n## Winter Classics 1997\n- Dates: 1997-12-01 to 1997-12-31\n- Notes: Focus on Dairy Products and Confections.\n",
    )
    .unwrap();
    fs::write(
        dir.join("kpi_definitions.md"),
        "# KPI Definitions\n\n## Average Order Value (AOV)\n- AOV = SUM(UnitPrice * Quantity * (1 - Discount)) / COUNT(DISTINCT OrderID)\n\n## Gross Margin\n- GM = SUM((UnitPrice - CostOfGoods) * Quantity * (1 - Discount))\n",
    )
    .unwrap();
}

#[test]
fn text_full_flow() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let index = TextIndex::build(tmp.path()).expect("build");
    assert!(!index.is_empty());

    let hits = index.search("What is the return window for opened beverages?", 3).expect("search");
    assert!(!hits.is_empty());
    assert!(hits.len() <= 3);
    assert!(hits[0].id.starts_with("product_policy::chunk"), "got {:?}", hits[0].id);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(hits.iter().all(|h| h.score > 0.0));

    let hits = index.search("Summer Beverages 1997 dates", 1).expect("search");
    assert_eq!(hits[0].id, "marketing_calendar::chunk1");
    assert!(hits[0].content.starts_with("## Summer Beverages 1997"));
}

#[test]
fn no_positive_score_returns_nothing() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let index = TextIndex::build(tmp.path()).unwrap();
    assert!(index.search("zzzz qqqq", 5).unwrap().is_empty());
    assert!(index.search("the of and", 5).unwrap().is_empty());
    assert!(index.search("policy", 0).unwrap().is_empty());
}

#[test]
fn empty_corpus_is_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let index = TextIndex::build(&tmp.path().join("missing")).expect("build");
    assert!(index.is_empty());
    let searcher: &dyn TextSearch = &index;
    assert!(searcher.search("return policy", 3).unwrap().is_empty());
}

#[test]
fn ties_keep_corpus_order() {
    let chunks = vec![
        CorpusChunk::new("a", 0, "chai tea".into()),
        CorpusChunk::new("b", 0, "chang beer".into()),
        CorpusChunk::new("c", 0, "chai tea".into()),
    ];
    let index = TextIndex::from_chunks(&chunks).unwrap();
    let hits = index.search("chai", 5).unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["a::chunk0", "c::chunk0"]);
    assert_eq!(hits[0].score, hits[1].score);
}
