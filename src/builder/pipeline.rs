//! The SPIMI-style per-document builder pipeline: resume skip, dedup
//! (URL, exact hash, SimHash near-duplicate), tokenize+stem, posting
//! accumulation, and periodic `write_partial` flush.

use std::collections::{HashMap, HashSet};

use crate::builder::collaborators::{ExtractedPage, HtmlExtractor, PageLoader, Stemmer, Tokenizer};
use crate::codec::hash::{exact_hash, similar_hash, RecentFingerprints};
use crate::core::config::BuilderConfig;
use crate::core::error::Result;
use crate::core::stats::BuildStats;
use crate::core::types::Document;
use crate::index::inverted::InvertedIndex;
use crate::index::partial::{check_partial, mark_partial, new_partial, write_partial, PartialStatus};
use crate::storage::layout::Layout;

fn defragment(url: &str) -> String {
    url.split('#').next().unwrap_or(url).to_string()
}

fn resolve_url(base: &str, href: &str) -> String {
    let href = defragment(href);
    if href.contains("://") {
        return href;
    }
    match base.rfind('/') {
        Some(idx) if base[idx + 1..].contains('.') || idx + 1 == base.len() => {
            format!("{}{}", &base[..idx + 1], href)
        }
        _ => format!("{base}/{href}"),
    }
}

pub struct Builder<E, T, S> {
    extractor: E,
    tokenizer: T,
    stemmer: S,
    config: BuilderConfig,
    layout: Layout,
    index: InvertedIndex,
    pending_docs: Vec<Document>,
    seen_exact_hashes: HashSet<[u8; 8]>,
    seen_urls: HashSet<String>,
    recent_fingerprints: RecentFingerprints,
    stats: BuildStats,
    docid: u64,
    resume_docid: u64,
    since_flush: usize,
}

impl<E: HtmlExtractor, T: Tokenizer, S: Stemmer> Builder<E, T, S> {
    pub fn new(layout: Layout, config: BuilderConfig, extractor: E, tokenizer: T, stemmer: S) -> Result<Self> {
        layout.ensure_dirs()?;
        let part_path = layout.part();
        let resume_docid = if part_path.exists() {
            match check_partial(&part_path)? {
                (PartialStatus::VersionMismatch, _) => {
                    new_partial(&part_path)?;
                    0
                }
                (_, header) => header.last_docid,
            }
        } else {
            new_partial(&part_path)?;
            0
        };

        let dedup_window = config.dedup_window;
        Ok(Builder {
            extractor,
            tokenizer,
            stemmer,
            config,
            layout,
            index: InvertedIndex::new(),
            pending_docs: Vec::new(),
            seen_exact_hashes: HashSet::new(),
            seen_urls: HashSet::new(),
            recent_fingerprints: RecentFingerprints::new(dedup_window),
            stats: BuildStats::default(),
            docid: 0,
            resume_docid,
            since_flush: 0,
        })
    }

    pub fn run(&mut self, loader: &mut dyn PageLoader) -> Result<BuildStats> {
        while let Some((raw_content, url)) = loader.next_page() {
            self.docid += 1;
            let docid = self.docid;
            self.stats.documents_seen += 1;

            if docid <= self.resume_docid {
                continue;
            }

            if raw_content.is_empty() {
                self.stats.documents_pruned_empty += 1;
                continue;
            }

            let url = defragment(&url);
            if !self.seen_urls.insert(url.clone()) {
                continue;
            }

            let fingerprint = exact_hash(&raw_content);
            if !self.seen_exact_hashes.insert(fingerprint) {
                self.stats.documents_pruned_exact_hash += 1;
                continue;
            }

            let ExtractedPage { text, important_fragments, outlinks } = self.extractor.extract(&raw_content)?;
            let resolved_outlinks: Vec<String> = outlinks.iter().map(|h| resolve_url(&url, h)).collect();

            let important_tokens: HashSet<String> = important_fragments
                .iter()
                .flat_map(|frag| self.tokenizer.tokenize(frag))
                .map(|tok| self.stemmer.stem(&tok))
                .collect();

            let mut token_counts: HashMap<String, u32> = HashMap::new();
            for token in self.tokenizer.tokenize(&text) {
                let stemmed = self.stemmer.stem(&token);
                *token_counts.entry(stemmed).or_insert(0) += 1;
            }

            let fingerprint_str = similar_hash(&token_counts);
            if self.recent_fingerprints.find_similar(&fingerprint_str) {
                self.stats.documents_pruned_similar_hash += 1;
                continue;
            }
            self.recent_fingerprints.push(fingerprint_str);

            for (token, count) in &token_counts {
                let important = important_tokens.contains(token);
                self.index.add_term(token.clone(), docid, *count, important);
            }

            let mut doc = Document::new(docid, url, token_counts.len() as u32);
            doc.links = resolved_outlinks;
            self.pending_docs.push(doc);
            self.stats.documents_indexed += 1;
            self.since_flush += 1;

            if self.since_flush >= self.config.flush_period && !self.pending_docs.is_empty() {
                self.flush()?;
            }
        }

        if !self.index.is_empty() || !self.pending_docs.is_empty() {
            self.flush()?;
        }
        mark_partial(&self.layout.part())?;

        Ok(self.stats.clone())
    }

    fn flush(&mut self) -> Result<()> {
        write_partial(
            &self.layout.part(),
            &self.layout.docinfo(),
            &self.layout.doclinks(),
            &mut self.index,
            &mut self.pending_docs,
            self.docid,
        )?;
        self.stats.partials_flushed += 1;
        self.since_flush = 0;
        Ok(())
    }
}
