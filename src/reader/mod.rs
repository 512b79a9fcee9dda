//! Opens a built index directory and answers `get_postings`, `get_document`,
//! and `get_linked_docids` queries against it.
//!
//! `IndexReader` is an explicit owned handle rather than process-global
//! state: every piece of loaded state (seek maps, docinfo array, URL index,
//! posting cache) lives on the struct, and `initialize`/`initialize_doclinks`
//! are idempotent via an internal flag rather than module-scope statics.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::num::NonZeroUsize;
use std::path::Path;

use lru::LruCache;

use crate::codec::binary::{read_str, read_u32};
use crate::core::config::ReaderConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Document;
use crate::index::posting::{Posting, POSTING_SIZE};
use crate::merge::mergeinfo::{read_mergeinfo, MergeInfo};
use crate::storage::doc_table::{build_url_index, read_doc_table};
use crate::storage::doclinks::read_doclinks;
use crate::storage::layout::{bucket_for, Layout};

pub struct IndexReader {
    layout: Layout,
    config: ReaderConfig,
    merge_info: Option<MergeInfo>,
    docs: Vec<Document>,
    url_to_docid: HashMap<String, u64>,
    doclinks: Vec<Vec<u64>>,
    bucket_files: HashMap<u32, File>,
    seek_maps: HashMap<u32, HashMap<String, u32>>,
    cache: LruCache<String, Vec<Posting>>,
    initialized: bool,
    doclinks_initialized: bool,
}

impl IndexReader {
    pub fn new(layout: Layout, config: ReaderConfig) -> Self {
        let capacity = NonZeroUsize::new(config.posting_cache_capacity.max(1)).unwrap();
        IndexReader {
            layout,
            config,
            merge_info: None,
            docs: Vec::new(),
            url_to_docid: HashMap::new(),
            doclinks: Vec::new(),
            bucket_files: HashMap::new(),
            seek_maps: HashMap::new(),
            cache: LruCache::new(capacity),
            initialized: false,
            doclinks_initialized: false,
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let merge_info = read_mergeinfo(&self.layout.mergeinfo())?;
        let docs = read_doc_table(&self.layout.docinfo(), merge_info.max_docid)?;
        let url_to_docid = build_url_index(&docs);

        let mut bucket_files = HashMap::new();
        let mut seek_maps = HashMap::new();
        let buckets_dir = self.layout.buckets_dir();
        if buckets_dir.exists() {
            for entry in std::fs::read_dir(&buckets_dir)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let name = file_name.to_string_lossy();
                let Some(stem) = name.strip_suffix(".bucket") else { continue };
                let Ok(bucket_id) = stem.parse::<u32>() else { continue };

                let bucket_file = File::open(self.layout.bucket_file(bucket_id))?;
                let seek_map = Self::load_seek_map(&self.layout.seek_file(bucket_id))?;
                bucket_files.insert(bucket_id, bucket_file);
                seek_maps.insert(bucket_id, seek_map);
            }
        }

        self.merge_info = Some(merge_info);
        self.docs = docs;
        self.url_to_docid = url_to_docid;
        self.bucket_files = bucket_files;
        self.seek_maps = seek_maps;
        self.initialized = true;
        Ok(())
    }

    fn load_seek_map(path: &Path) -> Result<HashMap<String, u32>> {
        let mut map = HashMap::new();
        if !path.exists() {
            return Ok(map);
        }
        let mut f = File::open(path)?;
        loop {
            let term = match read_str(&mut f) {
                Ok(t) => t,
                Err(_) => break,
            };
            let offset = read_u32(&mut f)?;
            map.insert(term, offset);
        }
        Ok(map)
    }

    pub fn initialize_doclinks(&mut self) -> Result<()> {
        if self.doclinks_initialized {
            return Ok(());
        }
        if !self.initialized {
            self.initialize()?;
        }
        self.doclinks = read_doclinks(&self.layout.doclinks(), &self.url_to_docid, &self.docs)?;
        self.doclinks_initialized = true;
        Ok(())
    }

    pub fn get_document(&self, docid: u64) -> Option<&Document> {
        if docid == 0 {
            return None;
        }
        self.docs.get((docid - 1) as usize)
    }

    pub fn get_linked_docids(&self, docid: u64) -> &[u64] {
        if docid == 0 {
            return &[];
        }
        self.doclinks
            .get((docid - 1) as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    pub fn non_empty_document_count(&self) -> usize {
        self.docs.iter().filter(|d| !d.empty).count()
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn merge_info(&self) -> Option<MergeInfo> {
        self.merge_info
    }

    pub fn get_postings(&mut self, term: &str) -> Result<Vec<Posting>> {
        if let Some(cached) = self.cache.get(term) {
            return Ok(cached.clone());
        }

        let bucket = bucket_for(term);
        let offset = match self.seek_maps.get(&bucket).and_then(|m| m.get(term)) {
            Some(&offset) => offset,
            None => return Ok(Vec::new()),
        };

        let file = self
            .bucket_files
            .get_mut(&bucket)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, "bucket file not open"))?;
        file.seek(SeekFrom::Start(offset as u64))?;
        let n = read_u32(file)?;
        let mut postings = Vec::with_capacity(n as usize);
        let mut buf = [0u8; POSTING_SIZE];
        for _ in 0..n {
            file.read_exact(&mut buf)
                .map_err(|_| Error::corrupt("short read of posting in bucket"))?;
            postings.push(Posting::decode(&buf)?);
        }

        self.cache.put(term.to_string(), postings.clone());
        Ok(postings)
    }

    pub fn cache_capacity(&self) -> usize {
        self.config.posting_cache_capacity
    }
}
