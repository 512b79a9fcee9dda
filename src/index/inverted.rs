//! In-memory term accumulator used by the builder between flushes.
//!
//! Postings for a term are appended in docid order as documents stream in,
//! so no sort is needed before a partial container is written — the
//! builder only ever sees documents in increasing docid order within a
//! single partial.

use std::collections::HashMap;

use crate::index::posting::Posting;

#[derive(Default)]
pub struct InvertedIndex {
    terms: HashMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex { terms: HashMap::new() }
    }

    pub fn add_term(&mut self, term: String, docid: u64, tf: u32, important: bool) {
        self.terms
            .entry(term)
            .or_default()
            .push(Posting::new(docid, tf, important));
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Drains the accumulator, yielding `(term, postings)` pairs in
    /// ascending term order so partition writers see a stable sequence.
    pub fn drain_sorted(&mut self) -> Vec<(String, Vec<Posting>)> {
        let mut out: Vec<(String, Vec<Posting>)> = self.terms.drain().collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }
}
