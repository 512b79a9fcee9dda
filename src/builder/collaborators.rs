//! External collaborator interfaces the builder depends on: a page loader,
//! an HTML-to-text extractor, a tokenizer, a stemmer, and a stopword
//! oracle. Each is a trait so a real crawler/extractor can be wired in;
//! a default concrete implementation of each is provided here so the
//! builder runs end-to-end against plain-text fixtures without one.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_stemmers::{Algorithm, Stemmer as RustStemmerImpl};
use unicode_segmentation::UnicodeSegmentation;

use crate::core::error::Result;

/// Supplies `(raw_content, url)` pairs in a deterministic order.
pub trait PageLoader {
    fn next_page(&mut self) -> Option<(Vec<u8>, String)>;
}

/// Extracted page content: plain text, fragments pulled from tagged
/// elements (title/heading/bold/mark), and outgoing link hrefs.
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    pub text: String,
    pub important_fragments: Vec<String>,
    pub outlinks: Vec<String>,
}

pub trait HtmlExtractor {
    fn extract(&self, raw_content: &[u8]) -> Result<ExtractedPage>;
}

pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

pub trait Stemmer {
    fn stem(&self, token: &str) -> String;
}

pub trait StopwordOracle {
    fn is_stopword(&self, token: &str) -> bool;
}

/// Walks a directory tree in sorted order, treating each regular file as a
/// page whose URL is its path relative to the root, prefixed `file://`.
pub struct FsPageLoader {
    queue: Vec<PathBuf>,
    root: PathBuf,
}

impl FsPageLoader {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        let mut queue = Vec::new();
        collect_files(&root, &mut queue)?;
        queue.sort();
        queue.reverse();
        Ok(FsPageLoader { queue, root })
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

impl PageLoader for FsPageLoader {
    fn next_page(&mut self) -> Option<(Vec<u8>, String)> {
        while let Some(path) = self.queue.pop() {
            if let Ok(content) = fs::read(&path) {
                let rel = path.strip_prefix(&self.root).unwrap_or(&path);
                let url = format!("file://{}", rel.to_string_lossy());
                return Some((content, url));
            }
        }
        None
    }
}

/// A page loader backed by an in-memory vector, used by tests and the
/// integration scenarios that exercise the pipeline without a filesystem.
pub struct InMemoryPageLoader {
    pages: std::collections::VecDeque<(Vec<u8>, String)>,
}

impl InMemoryPageLoader {
    pub fn new(pages: Vec<(Vec<u8>, String)>) -> Self {
        InMemoryPageLoader { pages: pages.into() }
    }
}

impl PageLoader for InMemoryPageLoader {
    fn next_page(&mut self) -> Option<(Vec<u8>, String)> {
        self.pages.pop_front()
    }
}

/// Treats raw content as already-plain UTF-8 text with no tagged fragments
/// and no outlinks. A real corpus supplies its own `HtmlExtractor`; this
/// default exists so the builder is runnable standalone.
pub struct PlainTextExtractor;

impl HtmlExtractor for PlainTextExtractor {
    fn extract(&self, raw_content: &[u8]) -> Result<ExtractedPage> {
        Ok(ExtractedPage {
            text: String::from_utf8_lossy(raw_content).into_owned(),
            important_fragments: Vec::new(),
            outlinks: Vec::new(),
        })
    }
}

/// Lowercase Unicode word tokenizer.
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(|w| w.to_lowercase()).collect()
    }
}

/// Porter stemmer (English) via `rust-stemmers`.
pub struct PorterStemmer {
    inner: RustStemmerImpl,
}

impl Default for PorterStemmer {
    fn default() -> Self {
        PorterStemmer { inner: RustStemmerImpl::create(Algorithm::English) }
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}

/// Stopword set loaded from a newline-delimited file.
#[derive(Debug, Clone, Default)]
pub struct FileStopwords {
    words: HashSet<String>,
}

impl FileStopwords {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let words = content.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();
        Ok(FileStopwords { words })
    }

    pub fn from_words<I: IntoIterator<Item = String>>(words: I) -> Self {
        FileStopwords { words: words.into_iter().collect() }
    }
}

impl StopwordOracle for FileStopwords {
    fn is_stopword(&self, token: &str) -> bool {
        self.words.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_tokenizer_lowercases_and_splits() {
        let tokens = WordTokenizer.tokenize("Hello, World!");
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn porter_stemmer_reduces_suffixes() {
        let stemmer = PorterStemmer::default();
        assert_eq!(stemmer.stem("running"), "run");
    }

    #[test]
    fn file_stopwords_checks_membership() {
        let sw = FileStopwords::from_words(["the".to_string(), "a".to_string()]);
        assert!(sw.is_stopword("the"));
        assert!(!sw.is_stopword("rust"));
    }

    #[test]
    fn in_memory_loader_yields_pages_in_order() {
        let mut loader = InMemoryPageLoader::new(vec![
            (b"a".to_vec(), "u1".to_string()),
            (b"b".to_vec(), "u2".to_string()),
        ]);
        assert_eq!(loader.next_page(), Some((b"a".to_vec(), "u1".to_string())));
        assert_eq!(loader.next_page(), Some((b"b".to_vec(), "u2".to_string())));
        assert_eq!(loader.next_page(), None);
    }
}
