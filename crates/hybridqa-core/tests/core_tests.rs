use std::collections::HashSet;
use std::fs;
use std::io::Write;
use tempfile::TempDir;

use hybridqa_core::data_processor::DataProcessor;

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.md");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let processor = DataProcessor::new();
    let chunks = processor.process_directory(dir);

    assert_eq!(chunks.len(), 1, "one short line becomes one chunk");
    assert_eq!(chunks[0].content, "Short text");
    assert_eq!(chunks[0].id, "a::chunk0");
}

#[test]
fn process_directory_skips_unreadable_documents() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("good.md"), "alpha bravo").unwrap();
    fs::write(dir.join("bad.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
    fs::write(dir.join("ignored.csv"), "x,y").unwrap();

    let chunks = DataProcessor::new().process_directory(dir);

    let doc_ids: HashSet<_> = chunks.iter().map(|c| c.doc_id.clone()).collect();
    assert_eq!(doc_ids, HashSet::from(["good".to_string()]));
}

#[test]
fn process_directory_missing_or_empty_yields_nothing() {
    let tmp = TempDir::new().unwrap();
    let processor = DataProcessor::new();
    assert!(processor.process_directory(tmp.path()).is_empty());
    assert!(processor.process_directory(&tmp.path().join("nope")).is_empty());
}

#[test]
fn process_directory_is_ordered_by_path() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("b.md"), "bravo").unwrap();
    fs::write(dir.join("a.md"), "alpha").unwrap();

    let chunks = DataProcessor::with_extensions(["md"]).process_directory(dir);
    let ids: Vec<_> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a::chunk0", "b::chunk0"]);
}
