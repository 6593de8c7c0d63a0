use crate::error::{IndexError, Result};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32, // occurrences of the term in doc_id, always >= 1
}

/// Term -> postings mapping plus the document length table.
///
/// Postings lists keep ingestion order and the length table keeps the order
/// in which documents were first recorded. Both orders survive a save/load
/// round trip.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    postings: BTreeMap<String, Vec<Posting>>,
    doc_lengths: Vec<(DocId, u32)>,
    doc_slots: HashMap<DocId, usize>,
    total_len: u64,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Assemble an index from already validated tables.
    pub(crate) fn from_parts(postings: BTreeMap<String, Vec<Posting>>, doc_lengths: Vec<(DocId, u32)>) -> Self {
        let doc_slots = doc_lengths
            .iter()
            .enumerate()
            .map(|(slot, (doc_id, _))| (doc_id.clone(), slot))
            .collect();
        let total_len = doc_lengths.iter().map(|(_, len)| u64::from(*len)).sum();
        Self { postings, doc_lengths, doc_slots, total_len }
    }

    pub(crate) fn append_posting(&mut self, term: &str, doc_id: &str, tf: u32) {
        let posting = Posting { doc_id: doc_id.to_string(), tf };
        match self.postings.get_mut(term) {
            Some(list) => list.push(posting),
            None => {
                self.postings.insert(term.to_string(), vec![posting]);
            }
        }
    }

    pub(crate) fn set_length(&mut self, doc_id: &str, length: u32) {
        match self.doc_slots.get(doc_id) {
            Some(&slot) => {
                let old = std::mem::replace(&mut self.doc_lengths[slot].1, length);
                self.total_len = self.total_len - u64::from(old) + u64::from(length);
            }
            None => {
                self.doc_slots.insert(doc_id.to_string(), self.doc_lengths.len());
                self.doc_lengths.push((doc_id.to_string(), length));
                self.total_len += u64::from(length);
            }
        }
    }

    /// Postings for `term` in ingestion order; empty if the term was never seen.
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of documents containing `term`.
    pub fn doc_freq(&self, term: &str) -> usize { self.postings(term).len() }

    pub fn doc_len(&self, doc_id: &str) -> Option<u32> {
        self.doc_slots.get(doc_id).map(|&slot| self.doc_lengths[slot].1)
    }

    pub fn contains_doc(&self, doc_id: &str) -> bool { self.doc_slots.contains_key(doc_id) }

    pub fn num_docs(&self) -> usize { self.doc_lengths.len() }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.doc_lengths.is_empty() }

    /// Mean document length in tokens.
    pub fn avg_doc_len(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        Ok(self.total_len as f64 / self.num_docs() as f64)
    }

    /// Documents and their lengths in the order they were recorded.
    pub fn doc_lengths(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.doc_lengths.iter().map(|(doc_id, len)| (doc_id.as_str(), *len))
    }

    /// Terms in lexicographic order with their postings.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[Posting])> + '_ {
        self.postings.iter().map(|(term, list)| (term.as_str(), list.as_slice()))
    }

    pub fn clear(&mut self) { *self = Self::default(); }

    /// Deterministic dump: terms sorted, each postings list in insertion order.
    pub fn display(&self) -> String { self.to_string() }
}

impl fmt::Display for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "index contents:")?;
        let pad = self.postings.keys().map(|t| t.chars().count()).max().unwrap_or(0) + 2;
        for (term, list) in &self.postings {
            let rendered: Vec<String> = list.iter().map(|p| format!("({}, {})", p.doc_id, p.tf)).collect();
            writeln!(f, "{term:>pad$}: [{}]", rendered.join(", "))?;
        }
        Ok(())
    }
}
