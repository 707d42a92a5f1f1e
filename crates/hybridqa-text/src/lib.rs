//! hybridqa-text
//!
//! Tantivy-backed BM25 search over the chunked document corpus. The index
//! lives in RAM: it is rebuilt from the corpus directory at startup and is
//! read-only afterwards, so one handle can be shared by every worker.
pub mod expansion;
pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use expansion::expand_query;
pub use index::TextIndex;
