//! Corpus loading and chunking.
//!
//! Each document is split by the first policy that applies:
//! 1. `## ` header lines start new sections (the header stays with its section);
//! 2. blank lines separate paragraphs;
//! 3. otherwise one chunk per line, with bullet lines carrying the most recent
//!    `#` header as a prefix.
//!
//! Blank segments are dropped before numbering, so chunk indices are dense.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::types::CorpusChunk;

const HEADER_MARKER: &str = "## ";

pub struct DataProcessor {
    extensions: Vec<String>,
}

impl Default for DataProcessor {
    fn default() -> Self {
        Self { extensions: vec!["md".to_string(), "txt".to_string()] }
    }
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { extensions: extensions.into_iter().map(Into::into).collect() }
    }

    /// Chunk every readable document under `docs_dir`. Unreadable files are
    /// skipped; a missing or empty directory yields no chunks.
    pub fn process_directory(&self, docs_dir: &Path) -> Vec<CorpusChunk> {
        let files = self.list_files(docs_dir);
        if files.is_empty() {
            warn!(dir = %docs_dir.display(), "no documents found");
            return Vec::new();
        }
        let mut all_chunks = Vec::new();
        for file_path in &files {
            let Some(doc_id) = Self::extract_doc_id(file_path) else {
                warn!(path = %file_path.display(), "skipping document without a usable name");
                continue;
            };
            match fs::read_to_string(file_path) {
                Ok(content) => all_chunks.extend(self.chunk_document(&doc_id, &content)),
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "skipping unreadable document")
                }
            }
        }
        info!(files = files.len(), chunks = all_chunks.len(), "corpus chunked");
        all_chunks
    }

    pub fn chunk_document(&self, doc_id: &str, content: &str) -> Vec<CorpusChunk> {
        let text = content.replace("\r\n", "\n");
        let segments = if text.lines().any(|l| l.starts_with(HEADER_MARKER)) {
            split_sections(&text)
        } else {
            let paragraphs = split_paragraphs(&text);
            if paragraphs.len() > 1 { paragraphs } else { split_lines(&text) }
        };
        segments
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, s)| CorpusChunk::new(doc_id, i, s.to_string()))
            .collect()
    }

    fn extract_doc_id(file_path: &Path) -> Option<String> {
        file_path.file_stem().map(|s| s.to_string_lossy().to_string())
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
            })
            .collect();
        files.sort();
        files
    }
}

fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.starts_with(HEADER_MARKER) && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    sections.push(current);
    sections
}

fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

fn split_lines(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut header = "";
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with('#') {
            header = line;
        } else if line.starts_with("- ") || line.starts_with("* ") {
            if header.is_empty() {
                chunks.push(line.to_string());
            } else {
                chunks.push(format!("{header}\n{line}"));
            }
        } else {
            chunks.push(line.to_string());
        }
    }
    chunks
}
