use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{TantivyDocument, Term};

use hybridqa_core::traits::TextSearch;
use hybridqa_core::types::SearchHit;

use crate::expansion::expand_query;
use crate::index::TextIndex;

impl TextIndex {
	/// Top `k` chunks for `query` after expansion, best first.
	///
	/// Only positively scored chunks are returned; equal scores keep corpus
	/// order.
	pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
		if k == 0 || self.is_empty() { return Ok(Vec::new()); }
		let expanded = expand_query(query);
		let terms = self.query_terms(&expanded)?;
		if terms.is_empty() { return Ok(Vec::new()); }

		let clauses: Vec<(Occur, Box<dyn Query>)> = terms
			.into_iter()
			.map(|t| (Occur::Should, Box::new(TermQuery::new(t, IndexRecordOption::WithFreqs)) as Box<dyn Query>))
			.collect();
		let q = BooleanQuery::new(clauses);

		let searcher = self.reader.searcher();
		let top_docs = searcher.search(&q, &TopDocs::with_limit(self.chunk_count))?;
		let mut ranked = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			if score <= 0.0 { continue; }
			let doc: TantivyDocument = searcher.doc(addr)?;
			let id = doc.get_first(self.id_field).and_then(|v| v.as_str()).unwrap_or("").to_string();
			let ord = doc.get_first(self.ord_field).and_then(|v| v.as_u64()).unwrap_or(u64::MAX);
			let content = doc.get_first(self.text_field).and_then(|v| v.as_str()).unwrap_or("").to_string();
			ranked.push((ord, SearchHit { id, content, score }));
		}
		ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));
		ranked.truncate(k);
		Ok(ranked.into_iter().map(|(_, hit)| hit).collect())
	}

	fn query_terms(&self, text: &str) -> Result<Vec<Term>> {
		let mut analyzer = self.index.tokenizer_for_field(self.text_field)?;
		let mut stream = analyzer.token_stream(text);
		let mut terms = Vec::new();
		while stream.advance() {
			terms.push(Term::from_field_text(self.text_field, &stream.token().text));
		}
		Ok(terms)
	}
}

impl TextSearch for TextIndex {
	fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> { TextIndex::search(self, query, k) }
}
