/// A persisted document record plus the transient fields the reader/builder
/// attach at load time.
#[derive(Debug, Clone)]
pub struct Document {
    /// 1-based, monotonically assigned by crawl order. Gaps represent pruned documents.
    pub docid: u64,
    pub total_tokens: u32,
    pub pr_quality: f32,
    pub hub_quality: f32,
    pub auth_quality: f32,
    pub url: String,
    /// True iff this docid was reconstructed as a placeholder for a gap in the
    /// document table. Placeholders are excluded from link sets.
    pub empty: bool,
    /// Defragmented absolute outlink URLs. Only populated in the builder; discarded
    /// once the document is appended to the doc-links file.
    pub links: Vec<String>,
}

impl Document {
    pub fn new(docid: u64, url: String, total_tokens: u32) -> Self {
        Document {
            docid,
            total_tokens,
            pr_quality: 1.0,
            hub_quality: 1.0,
            auth_quality: 1.0,
            url,
            empty: false,
            links: Vec::new(),
        }
    }

    pub fn placeholder(docid: u64) -> Self {
        Document {
            docid,
            total_tokens: 0,
            pr_quality: 1.0,
            hub_quality: 1.0,
            auth_quality: 1.0,
            url: String::new(),
            empty: true,
            links: Vec::new(),
        }
    }
}
