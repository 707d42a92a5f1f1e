use anyhow::Result;
use std::path::Path;
use tantivy::schema::Field;
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument};
use tracing::info;

use hybridqa_core::data_processor::DataProcessor;
use hybridqa_core::types::CorpusChunk;

use crate::tantivy_utils::{build_schema, register_tokenizer};

/// In-memory BM25 index over corpus chunks.
///
/// Each chunk is stored with its ordinal in the corpus so equal scores can be
/// ordered the way the chunks were produced.
pub struct TextIndex {
	pub(crate) index: Index,
	pub(crate) reader: IndexReader,
	pub(crate) id_field: Field,
	pub(crate) ord_field: Field,
	pub(crate) text_field: Field,
	pub(crate) chunk_count: usize,
}

impl TextIndex {
	/// Chunk every document under `docs_dir` and index the result.
	pub fn build(docs_dir: &Path) -> Result<Self> {
		let chunks = DataProcessor::new().process_directory(docs_dir);
		let index = Self::from_chunks(&chunks)?;
		info!(dir = %docs_dir.display(), chunks = index.chunk_count, "text index built");
		Ok(index)
	}

	pub fn from_chunks(chunks: &[CorpusChunk]) -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let id_field = schema.get_field("id")?;
		let ord_field = schema.get_field("ord")?;
		let text_field = schema.get_field("text")?;

		let mut index_writer: IndexWriter<TantivyDocument> = index.writer_with_num_threads(1, 50_000_000)?;
		for (ord, c) in chunks.iter().enumerate() {
			index_writer.add_document(doc!(
				id_field => c.id.clone(),
				ord_field => ord as u64,
				text_field => c.content.clone(),
			))?;
		}
		index_writer.commit()?;

		let reader = index.reader()?;
		Ok(Self { index, reader, id_field, ord_field, text_field, chunk_count: chunks.len() })
	}

	pub fn len(&self) -> usize { self.chunk_count }

	pub fn is_empty(&self) -> bool { self.chunk_count == 0 }
}
