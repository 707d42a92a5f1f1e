use std::collections::HashSet;

use hybridqa_core::data_processor::DataProcessor;
use proptest::prelude::*;

fn document() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        Just(String::new()),
        Just("## Section".to_string()),
        Just("# Title".to_string()),
        "- [a-z ]{1,12}",
        "[A-Za-z0-9 .,;]{0,24}",
        Just("   ".to_string()),
    ];
    prop::collection::vec(line, 0..24).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn chunking_is_deterministic(doc in document()) {
        let p = DataProcessor::new();
        prop_assert_eq!(p.chunk_document("doc", &doc), p.chunk_document("doc", &doc));
    }

    #[test]
    fn chunk_ids_are_unique_and_dense(doc in document()) {
        let chunks = DataProcessor::new().chunk_document("doc", &doc);
        let ids: HashSet<_> = chunks.iter().map(|c| c.id.clone()).collect();
        prop_assert_eq!(ids.len(), chunks.len());
        for (i, c) in chunks.iter().enumerate() {
            prop_assert_eq!(c.chunk_index, i);
            prop_assert!(!c.content.trim().is_empty());
        }
    }
}
