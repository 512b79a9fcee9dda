use serde::Serialize;

/// Reporting-only counters accumulated during a single builder run. Unlike
/// the on-disk state, these reset on restart by design.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub documents_seen: u64,
    pub documents_pruned_empty: u64,
    pub documents_pruned_duplicate_url: u64,
    pub documents_pruned_exact_hash: u64,
    pub documents_pruned_similar_hash: u64,
    pub documents_indexed: u64,
    pub partials_flushed: u64,
}

impl BuildStats {
    pub fn total_pruned(&self) -> u64 {
        self.documents_pruned_empty
            + self.documents_pruned_duplicate_url
            + self.documents_pruned_exact_hash
            + self.documents_pruned_similar_hash
    }
}

/// Counters for a completed merge pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeStats {
    pub max_docid: u64,
    pub unique_term_count: u32,
    pub buckets_written: u32,
}
