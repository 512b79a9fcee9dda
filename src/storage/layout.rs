//! Filesystem layout for an index directory: `.part`, `.docinfo`,
//! `.doclinks`, `.mergeinfo`, and the `buckets/` directory of
//! `<n>.bucket`/`<n>.seek` pairs.

use std::path::{Path, PathBuf};

/// Non-ASCII first bytes all route to this sentinel bucket.
pub const MISC_BUCKET: u32 = 128;

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn part(&self) -> PathBuf {
        self.root.join(".part")
    }

    pub fn docinfo(&self) -> PathBuf {
        self.root.join(".docinfo")
    }

    pub fn doclinks(&self) -> PathBuf {
        self.root.join(".doclinks")
    }

    pub fn mergeinfo(&self) -> PathBuf {
        self.root.join(".mergeinfo")
    }

    pub fn buckets_dir(&self) -> PathBuf {
        self.root.join("buckets")
    }

    pub fn bucket_file(&self, bucket: u32) -> PathBuf {
        self.buckets_dir().join(format!("{bucket}.bucket"))
    }

    pub fn seek_file(&self, bucket: u32) -> PathBuf {
        self.buckets_dir().join(format!("{bucket}.seek"))
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.buckets_dir())
    }
}

/// Routes a term to its bucket id: the ASCII code point of the first byte,
/// or `MISC_BUCKET` for any non-ASCII leading byte.
pub fn bucket_for(term: &str) -> u32 {
    match term.as_bytes().first() {
        Some(&b) if b < 128 => b as u32,
        _ => MISC_BUCKET,
    }
}
