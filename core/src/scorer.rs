//! TF-IDF and BM25 ranking over an [`InvertedIndex`].
//!
//! Both scorers walk the query terms left to right and, for each term, its
//! postings in ingestion order. A document's position among equal scores is
//! fixed by the first time that walk touches it.

use crate::error::Result;
use crate::index::InvertedIndex;
use crate::tokenizer::tokenize;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization strength; 0 disables it.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 2.0, b: 0.75 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Per-document score accumulator that remembers first-touch order.
#[derive(Default)]
struct ScoreBoard<'a> {
    slots: HashMap<&'a str, usize>,
    entries: Vec<(&'a str, f64)>,
}

impl<'a> ScoreBoard<'a> {
    fn add(&mut self, doc_id: &'a str, contrib: f64) {
        match self.slots.get(doc_id) {
            Some(&slot) => self.entries[slot].1 += contrib,
            None => {
                self.slots.insert(doc_id, self.entries.len());
                self.entries.push((doc_id, contrib));
            }
        }
    }

    /// Descending by score. `sort_by` is stable, so ties keep first-touch order.
    fn rank(mut self) -> Vec<ScoredDoc> {
        self.entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        self.entries
            .into_iter()
            .map(|(doc_id, score)| ScoredDoc { doc_id: doc_id.to_string(), score })
            .collect()
    }
}

impl InvertedIndex {
    /// `ln(num_docs / df)`, or 0 for a term that was never indexed.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freq(term);
        if df == 0 {
            return 0.0;
        }
        (self.num_docs() as f64 / df as f64).ln()
    }

    pub fn query_tfidf(&self, query: &str) -> Vec<ScoredDoc> {
        let mut board = ScoreBoard::default();
        for term in tokenize(query) {
            let idf = self.idf(term);
            for p in self.postings(term) {
                board.add(&p.doc_id, f64::from(p.tf) * idf);
            }
        }
        board.rank()
    }

    /// Okapi BM25. Fails with `EmptyIndex` when there is no average length to normalize by.
    pub fn query_bm25(&self, query: &str, params: Bm25Params) -> Result<Vec<ScoredDoc>> {
        let avg_len = self.avg_doc_len()?;
        let Bm25Params { k1, b } = params;
        let mut board = ScoreBoard::default();
        for term in tokenize(query) {
            let idf = self.idf(term);
            for p in self.postings(term) {
                let tf = f64::from(p.tf);
                let doc_len = f64::from(self.doc_len(&p.doc_id).unwrap_or_default());
                let norm = (k1 + 1.0) / (tf + k1 * (1.0 - b + b * (doc_len / avg_len)));
                board.add(&p.doc_id, tf * idf * norm);
            }
        }
        Ok(board.rank())
    }
}
